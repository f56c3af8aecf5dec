//! # VBUS Bridge Error Handling
//!
//! This module defines the VBusError enum, which represents the different error
//! types that can occur in the vbus-bridge crate.

use crate::util::hex::HexError;
use thiserror::Error;

/// Represents the different error types that can occur in the bridge.
#[derive(Debug, Error)]
pub enum VBusError {
    /// The inbound message is not a valid hex encoding of a byte sequence.
    #[error("Invalid hexadecimal payload: {0}")]
    InvalidHex(#[from] HexError),

    /// The inbound message contains bytes outside the ASCII range.
    #[error("Payload is not ASCII text")]
    NonAscii,

    /// The decoded payload is shorter than the supported field layout.
    #[error("Payload too short: {len} bytes (minimum {min})")]
    PayloadTooShort { len: usize, min: usize },

    /// Indicates an error reported by the MQTT client or connection.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Indicates an invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl VBusError {
    /// Per-message errors are absorbed by the bridge; everything else is fatal.
    pub fn is_discardable(&self) -> bool {
        matches!(
            self,
            VBusError::InvalidHex(_) | VBusError::NonAscii | VBusError::PayloadTooShort { .. }
        )
    }
}

impl From<rumqttc::ClientError> for VBusError {
    fn from(e: rumqttc::ClientError) -> Self {
        VBusError::Transport(e.to_string())
    }
}

impl From<rumqttc::ConnectionError> for VBusError {
    fn from(e: rumqttc::ConnectionError) -> Self {
        VBusError::Transport(e.to_string())
    }
}
