//! # VBUS Payload Decoding
//!
//! A [`Payload`] is one telemetry frame's data bytes after the VBUS framing,
//! septett encoding and checksums have been removed upstream. Decoding is
//! pure: a payload is built per message, read through the field table and
//! dropped.
//!
//! ```rust
//! use vbus_bridge::payload::Payload;
//!
//! let payload = Payload::from_hex(
//!     "1D507F0000072938223822054600000000007F5F140000010B00000000007F00000001007E64000000",
//! ).unwrap();
//! let readings = payload.readings();
//! assert_eq!(readings[1].name, "boiler_temperature");
//! assert_eq!(readings[1].to_string(), "12.8");
//! ```

pub mod decode;
pub mod field;

use std::fmt;

use serde::Serialize;

use crate::constants::PAYLOAD_MIN_LEN;
use crate::error::VBusError;
use crate::util::hex::decode_hex;

pub use decode::{decode_boiler, decode_collector};
pub use field::{BiasOrder, FieldSpec, FieldWidth, Scale, BOILER_FIELD, COLLECTOR_FIELD, FIELD_TABLE};

/// Payload bytes that passed the minimum length check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload(Vec<u8>);

impl Payload {
    /// Wraps `bytes`, rejecting anything shorter than [`PAYLOAD_MIN_LEN`].
    /// Short payloads are never padded.
    pub fn new(bytes: Vec<u8>) -> Result<Self, VBusError> {
        if bytes.len() < PAYLOAD_MIN_LEN {
            return Err(VBusError::PayloadTooShort {
                len: bytes.len(),
                min: PAYLOAD_MIN_LEN,
            });
        }
        Ok(Payload(bytes))
    }

    /// Decodes an ASCII hex string (whitespace allowed) into a payload.
    pub fn from_hex(input: &str) -> Result<Self, VBusError> {
        Self::new(decode_hex(input)?)
    }

    /// Decodes a raw inbound message. The message must be ASCII text.
    pub fn from_message(raw: &[u8]) -> Result<Self, VBusError> {
        if !raw.is_ascii() {
            return Err(VBusError::NonAscii);
        }
        let text = std::str::from_utf8(raw).map_err(|_| VBusError::NonAscii)?;
        Self::from_hex(text)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Collector temperature in °C
    pub fn collector_temperature(&self) -> f64 {
        decode_collector(&self.0)
    }

    /// Boiler temperature in °C
    pub fn boiler_temperature(&self) -> f64 {
        decode_boiler(&self.0)
    }

    /// Decodes every entry of [`FIELD_TABLE`].
    pub fn readings(&self) -> Vec<DecodedReading> {
        self.readings_for(&FIELD_TABLE)
    }

    /// Decodes the given fields in order.
    pub fn readings_for(&self, fields: &[FieldSpec]) -> Vec<DecodedReading> {
        fields
            .iter()
            .map(|field| DecodedReading {
                name: field.name,
                value: field.extract(&self.0),
            })
            .collect()
    }
}

impl AsRef<[u8]> for Payload {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A named temperature in °C
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DecodedReading {
    pub name: &'static str,
    pub value: f64,
}

impl DecodedReading {
    /// Output form with exactly one fractional digit, or `None` for the
    /// not-a-number sentinel.
    pub fn formatted(&self) -> Option<String> {
        if self.value.is_nan() {
            None
        } else {
            Some(format!("{:.1}", self.value))
        }
    }
}

impl fmt::Display for DecodedReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.value)
    }
}
