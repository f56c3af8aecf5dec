//! MQTT transport using rumqttc.
//!
//! One [`MqttTransport`] owns the broker session for the life of the process:
//! the `AsyncClient` used for subscribe/publish and the `EventLoop` that
//! drives the connection. The bridge loop polls the event loop directly, so
//! everything runs on a single task.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info, warn};
use rumqttc::{AsyncClient, Event, EventLoop, Outgoing, Packet, QoS};

use super::{InboundMessage, MessageSource, Publication, Publisher};
use crate::config::BridgeConfig;
use crate::error::VBusError;

/// Capacity of the client request channel
const REQUEST_CHANNEL_CAPACITY: usize = 10;

/// Pause before polling again after a connection error
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Upper bound on flushing DISCONNECT at shutdown
const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Live broker session
pub struct MqttTransport {
    client: AsyncClient,
    eventloop: EventLoop,
    raw_topic: String,
}

impl MqttTransport {
    /// Connects to the broker and subscribes to the inbound topic.
    ///
    /// Polls until the broker acknowledges the connection. Any failure before
    /// that point is returned to the caller, which treats it as fatal.
    pub async fn connect(config: &BridgeConfig) -> Result<Self, VBusError> {
        config.validate()?;

        let (client, eventloop) = AsyncClient::new(config.mqtt_options(), REQUEST_CHANNEL_CAPACITY);
        let mut transport = MqttTransport {
            client,
            eventloop,
            raw_topic: config.raw_topic.clone(),
        };

        loop {
            match transport.eventloop.poll().await? {
                Event::Incoming(Packet::ConnAck(ack)) => {
                    info!("Connected to MQTT broker {} ({:?})", config.endpoint(), ack.code);
                    transport.subscribe()?;
                    return Ok(transport);
                }
                event => debug!("MQTT event before ConnAck: {event:?}"),
            }
        }
    }

    /// Queues the inbound subscription. Called after every ConnAck, since a
    /// clean session drops subscriptions on reconnect.
    fn subscribe(&self) -> Result<(), VBusError> {
        self.client.try_subscribe(&self.raw_topic, QoS::AtMostOnce)?;
        info!("Subscribed to '{}'", self.raw_topic);
        Ok(())
    }

    /// Sends DISCONNECT to the broker.
    ///
    /// The request only leaves the client once the event loop is polled, so
    /// this polls until the packet has been written or [`DISCONNECT_TIMEOUT`]
    /// expires.
    pub async fn disconnect(&mut self) -> Result<(), VBusError> {
        self.client.try_disconnect()?;

        tokio::time::timeout(DISCONNECT_TIMEOUT, flush_disconnect(&mut self.eventloop))
            .await
            .map_err(|_| VBusError::Transport("timed out sending DISCONNECT".to_string()))?
    }
}

async fn flush_disconnect(eventloop: &mut EventLoop) -> Result<(), VBusError> {
    loop {
        match eventloop.poll().await? {
            Event::Outgoing(Outgoing::Disconnect) => return Ok(()),
            event => debug!("MQTT event while disconnecting: {event:?}"),
        }
    }
}

impl Publisher for MqttTransport {
    fn publish(&mut self, publication: &Publication) -> Result<(), VBusError> {
        self.client.try_publish(
            publication.topic.as_str(),
            QoS::AtMostOnce,
            false,
            publication.payload.clone().into_bytes(),
        )?;
        Ok(())
    }
}

#[async_trait]
impl MessageSource for MqttTransport {
    /// Polls the event loop until a publish arrives on the inbound topic.
    ///
    /// Connection errors after startup are logged and polling resumes, which
    /// lets rumqttc reconnect.
    async fn next_message(&mut self) -> Result<Option<InboundMessage>, VBusError> {
        loop {
            match self.eventloop.poll().await {
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    return Ok(Some(InboundMessage::new(publish.topic, publish.payload)));
                }
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    info!("Reconnected to MQTT broker");
                    self.subscribe()?;
                }
                Ok(Event::Incoming(Packet::SubAck(ack))) => {
                    debug!("Subscription acknowledged: {:?}", ack.return_codes);
                }
                Ok(Event::Incoming(Packet::Disconnect)) => {
                    warn!("Broker sent DISCONNECT");
                }
                Ok(_) => {}
                Err(e) => {
                    error!("MQTT connection error: {e}");
                    tokio::time::sleep(RECONNECT_DELAY).await;
                }
            }
        }
    }
}
