//! # Utility Modules
//!
//! Helpers shared by the decoder, the bridge and the calibration tool.

pub mod hex;

pub use hex::{decode_hex, encode_hex, encode_hex_upper, format_hex_compact, HexError};
