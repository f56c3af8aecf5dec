//! # VBUS to MQTT Bridge
//!
//! The bridge turns one inbound hex message into zero or more outbound
//! publications:
//!
//! 1. strip whitespace and hex-decode the ASCII message,
//! 2. reject payloads shorter than [`PAYLOAD_MIN_LEN`](crate::constants::PAYLOAD_MIN_LEN),
//! 3. decode every field of the table,
//! 4. publish each reading as a one-decimal string to `<prefix>/<field name>`.
//!
//! Malformed and undersized messages are logged at warn level and dropped;
//! nothing is published for them. A reading that decodes to not-a-number is
//! skipped on its own while the rest of the message is still published.
//!
//! [`Bridge::handle_message`] is the pure part of this pipeline. The receive
//! loop in [`Bridge::run`] works against the [`MessageSource`] and
//! [`Publisher`] traits, implemented by [`mqtt::MqttTransport`] for a live
//! broker and by [`memory::MemoryTransport`] in tests.

pub mod memory;
pub mod mqtt;
pub mod stats;

use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, info, warn};

use crate::constants::VBUS_SOURCE_ADDRESS;
use crate::error::VBusError;
use crate::logging::log_payload_hex;
use crate::payload::{DecodedReading, FieldSpec, Payload, FIELD_TABLE};

pub use memory::MemoryTransport;
pub use mqtt::MqttTransport;
pub use stats::BridgeStats;

/// Bridge state: waiting for a message, or decoding one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Idle,
    Processing,
}

/// A raw message as received from the inbound topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Bytes,
}

impl InboundMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        InboundMessage {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

/// One outbound message: a topic and its formatted value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    pub topic: String,
    pub payload: String,
}

/// Fire-and-forget sink for outbound publications.
///
/// Implementations must not wait for acknowledgement and must not retry.
pub trait Publisher {
    fn publish(&mut self, publication: &Publication) -> Result<(), VBusError>;
}

/// Source of inbound messages for the receive loop.
#[async_trait]
pub trait MessageSource {
    /// Waits for the next inbound message. `Ok(None)` ends the loop.
    async fn next_message(&mut self) -> Result<Option<InboundMessage>, VBusError>;
}

/// Decodes inbound payloads and forwards the readings to a publisher.
#[derive(Debug)]
pub struct Bridge {
    output_prefix: String,
    fields: &'static [FieldSpec],
    state: BridgeState,
    stats: BridgeStats,
}

impl Bridge {
    /// Creates a bridge publishing the standard field table under `output_prefix`.
    pub fn new(output_prefix: impl Into<String>) -> Self {
        let output_prefix: String = output_prefix.into();
        Bridge {
            output_prefix: output_prefix.trim_end_matches('/').to_string(),
            fields: &FIELD_TABLE,
            state: BridgeState::Idle,
            stats: BridgeStats::default(),
        }
    }

    /// Replaces the field table, e.g. after re-calibration.
    pub fn with_fields(mut self, fields: &'static [FieldSpec]) -> Self {
        self.fields = fields;
        self
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    pub fn stats(&self) -> &BridgeStats {
        &self.stats
    }

    /// Outbound topic for a field name
    pub fn topic_for(&self, field_name: &str) -> String {
        format!("{}/{}", self.output_prefix, field_name)
    }

    /// Validates and decodes one raw message into its publications, in field
    /// table order. Readings that decode to not-a-number are left out.
    pub fn handle_message(&self, raw: &[u8]) -> Result<Vec<Publication>, VBusError> {
        let readings = self.decode(raw)?;
        Ok(readings
            .iter()
            .filter_map(|reading| self.publication(reading))
            .collect())
    }

    /// Runs one message through the pipeline and hands the results to
    /// `publisher`. Returns the number of readings published.
    ///
    /// Every per-message failure is logged and absorbed here.
    pub fn process<P: Publisher + ?Sized>(&mut self, raw: &[u8], publisher: &mut P) -> usize {
        self.state = BridgeState::Processing;
        self.stats.received += 1;

        let published = match self.decode(raw) {
            Ok(readings) => {
                self.stats.decoded += 1;
                self.publish_readings(&readings, publisher)
            }
            Err(e) => {
                self.stats.discarded += 1;
                warn!("Discarding inbound message: {e}");
                0
            }
        };

        self.state = BridgeState::Idle;
        published
    }

    /// Receives and processes messages until the source is exhausted.
    ///
    /// Messages are handled one at a time in arrival order. Only an error from
    /// the source itself ends the loop early.
    pub async fn run<T>(&mut self, transport: &mut T) -> Result<(), VBusError>
    where
        T: MessageSource + Publisher + Send,
    {
        info!(
            "Bridge running for VBUS source 0x{:04X}, publishing under '{}'",
            VBUS_SOURCE_ADDRESS, self.output_prefix
        );
        while let Some(message) = transport.next_message().await? {
            debug!("Message on '{}' ({} bytes)", message.topic, message.payload.len());
            self.process(&message.payload, transport);
        }
        info!("Inbound source closed: {}", self.stats);
        Ok(())
    }

    fn decode(&self, raw: &[u8]) -> Result<Vec<DecodedReading>, VBusError> {
        let payload = Payload::from_message(raw)?;
        log_payload_hex("Payload", payload.as_bytes());
        Ok(payload.readings_for(self.fields))
    }

    fn publication(&self, reading: &DecodedReading) -> Option<Publication> {
        reading.formatted().map(|payload| Publication {
            topic: self.topic_for(reading.name),
            payload,
        })
    }

    fn publish_readings<P: Publisher + ?Sized>(
        &mut self,
        readings: &[DecodedReading],
        publisher: &mut P,
    ) -> usize {
        let mut accepted = Vec::new();
        for reading in readings {
            let Some(publication) = self.publication(reading) else {
                self.stats.skipped_readings += 1;
                warn!("Skipping {}: value is not a number", reading.name);
                continue;
            };

            match publisher.publish(&publication) {
                Ok(()) => {
                    self.stats.published += 1;
                    accepted.push(format!("{}={}", reading.name, publication.payload));
                }
                Err(e) => {
                    self.stats.publish_failures += 1;
                    warn!("Failed to publish {}: {e}", publication.topic);
                }
            }
        }

        if !accepted.is_empty() {
            debug!("Published {}", accepted.join(", "));
        }
        accepted.len()
    }
}
