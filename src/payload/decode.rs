//! # Single-Field Extraction Rules
//!
//! Pure functions turning payload bytes into physical values. Every rule
//! returns `f64::NAN` when the bytes it needs lie outside the payload; none of
//! them panic and none of them range-check the result.
//!
//! Only [`decode_collector`] and [`decode_boiler`] feed the published
//! readings. The remaining rules exist for the calibration search, which tries
//! them at every offset to re-derive field positions after firmware changes.

use crate::constants::{
    BOILER_BYTE_OFFSET, BOILER_DIVISOR, BOILER_OFFSET, COLLECTOR_BIAS, COLLECTOR_OFFSET,
};

/// Collector temperature in °C: `payload[0] - 33.9`.
pub fn decode_collector(payload: &[u8]) -> f64 {
    decode_biased_byte(payload, COLLECTOR_OFFSET, COLLECTOR_BIAS)
}

/// Boiler temperature in °C: `(payload[36] + 2) / 10`.
pub fn decode_boiler(payload: &[u8]) -> f64 {
    decode_scaled_byte(payload, BOILER_OFFSET, BOILER_BYTE_OFFSET)
}

/// `payload[offset] - bias`, the raw byte taken as unsigned.
pub fn decode_biased_byte(payload: &[u8], offset: usize, bias: f64) -> f64 {
    match payload.get(offset) {
        Some(&b) => f64::from(b) - bias,
        None => f64::NAN,
    }
}

/// `(payload[offset] + byte_offset) / 10`.
///
/// `byte_offset` corrects the raw byte before scaling; it is unrelated to the
/// positional `offset`.
pub fn decode_scaled_byte(payload: &[u8], offset: usize, byte_offset: i32) -> f64 {
    match payload.get(offset) {
        Some(&b) => f64::from(i32::from(b) + byte_offset) / BOILER_DIVISOR,
        None => f64::NAN,
    }
}

/// `payload[offset] / 2`
pub fn decode_byte_half(payload: &[u8], offset: usize) -> f64 {
    match payload.get(offset) {
        Some(&b) => f64::from(b) / 2.0,
        None => f64::NAN,
    }
}

/// `payload[offset] / 2 - 40`
pub fn decode_byte_half_minus_40(payload: &[u8], offset: usize) -> f64 {
    match payload.get(offset) {
        Some(&b) => f64::from(b) / 2.0 - 40.0,
        None => f64::NAN,
    }
}

/// Unsigned little-endian pair times 0.1, e.g. `80 00` -> 12.8.
pub fn decode_u16_le_tenths(payload: &[u8], offset: usize) -> f64 {
    match le_pair(payload, offset) {
        Some(pair) => f64::from(u16::from_le_bytes(pair)) * 0.1,
        None => f64::NAN,
    }
}

/// Signed little-endian pair divided by 10, the usual RESOL temperature encoding.
pub fn decode_i16_le_tenths(payload: &[u8], offset: usize) -> f64 {
    match le_pair(payload, offset) {
        Some(pair) => f64::from(i16::from_le_bytes(pair)) / 10.0,
        None => f64::NAN,
    }
}

fn le_pair(payload: &[u8], offset: usize) -> Option<[u8; 2]> {
    let end = offset.checked_add(2)?;
    match payload.get(offset..end)? {
        &[lo, hi] => Some([lo, hi]),
        _ => None,
    }
}
