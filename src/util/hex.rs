//! # Hex Encoding/Decoding Utilities
//!
//! Inbound VBUS payloads arrive as ASCII hex text. These helpers wrap the `hex`
//! crate with whitespace stripping and typed errors, plus a compact formatter
//! for log output.
//!
//! ```rust
//! use vbus_bridge::util::hex::{decode_hex, encode_hex};
//!
//! let data = [0x1D, 0x50, 0x7F];
//! assert_eq!(encode_hex(&data), "1d507f");
//! assert_eq!(decode_hex("1D 50 7F").unwrap(), data);
//! ```

use thiserror::Error;

/// Errors that can occur during hex operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HexError {
    #[error("Invalid hex character {c:?} at position {index}")]
    InvalidCharacter { c: char, index: usize },

    #[error("Odd number of hex characters: {0}")]
    OddLength(usize),

    #[error("Empty hex string")]
    EmptyString,
}

/// Encode bytes to lowercase hex string
pub fn encode_hex(data: &[u8]) -> String {
    hex::encode(data)
}

/// Encode bytes to uppercase hex string
pub fn encode_hex_upper(data: &[u8]) -> String {
    hex::encode_upper(data)
}

/// Decode hex string to bytes
///
/// Accepts both uppercase and lowercase hex characters. All whitespace,
/// including spaces between byte pairs, is stripped first.
pub fn decode_hex(hex_str: &str) -> Result<Vec<u8>, HexError> {
    let cleaned: String = hex_str.chars().filter(|c| !c.is_whitespace()).collect();

    if cleaned.is_empty() {
        return Err(HexError::EmptyString);
    }

    if cleaned.len() % 2 != 0 {
        return Err(HexError::OddLength(cleaned.len()));
    }

    hex::decode(&cleaned).map_err(|e| match e {
        hex::FromHexError::InvalidHexCharacter { c, index } => {
            HexError::InvalidCharacter { c, index }
        }
        hex::FromHexError::OddLength | hex::FromHexError::InvalidStringLength => {
            HexError::OddLength(cleaned.len())
        }
    })
}

/// Format bytes for compact display in logs, e.g. "1d 50 7f"
pub fn format_hex_compact(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
