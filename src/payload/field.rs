//! # Field Table
//!
//! Each supported reading is described by a [`FieldSpec`] rather than inline
//! arithmetic, so re-calibrating the decoder means editing [`FIELD_TABLE`].

use serde::Serialize;

use crate::constants::{
    BOILER_BYTE_OFFSET, BOILER_DIVISOR, BOILER_OFFSET, BOILER_TOPIC, COLLECTOR_BIAS,
    COLLECTOR_OFFSET, COLLECTOR_TOPIC,
};

/// Number of payload bytes holding the raw value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldWidth {
    One,
    /// Two bytes, little-endian
    Two,
}

impl FieldWidth {
    pub const fn len(self) -> usize {
        match self {
            FieldWidth::One => 1,
            FieldWidth::Two => 2,
        }
    }
}

/// Scaling applied to the raw value
///
/// A divisor is kept distinct from a factor of its reciprocal: `x / 10.0` and
/// `x * 0.1` do not round to the same `f64` for every `x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Scale {
    Factor(f64),
    Divisor(f64),
}

impl Scale {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Scale::Factor(factor) => value * factor,
            Scale::Divisor(divisor) => value / divisor,
        }
    }
}

/// Whether the additive bias is applied to the raw value or to the scaled one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BiasOrder {
    BeforeScale,
    AfterScale,
}

/// Describes how one physical value is extracted from a payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldSpec {
    /// Reading name, also used as the outbound topic suffix
    pub name: &'static str,
    /// Zero-based index of the first raw byte
    pub offset: usize,
    pub width: FieldWidth,
    /// Interpret the raw bytes as two's complement
    pub signed: bool,
    pub scale: Scale,
    pub bias: f64,
    pub bias_order: BiasOrder,
    /// Plausible range in °C. Only the calibration search looks at this;
    /// production decoding publishes whatever the arithmetic yields.
    pub valid_range: (f64, f64),
}

/// `payload[0] - 33.9`
pub const COLLECTOR_FIELD: FieldSpec = FieldSpec {
    name: COLLECTOR_TOPIC,
    offset: COLLECTOR_OFFSET,
    width: FieldWidth::One,
    signed: false,
    scale: Scale::Factor(1.0),
    bias: -COLLECTOR_BIAS,
    bias_order: BiasOrder::AfterScale,
    valid_range: (-40.0, 250.0),
};

/// `(payload[36] + 2) / 10`
pub const BOILER_FIELD: FieldSpec = FieldSpec {
    name: BOILER_TOPIC,
    offset: BOILER_OFFSET,
    width: FieldWidth::One,
    signed: false,
    scale: Scale::Divisor(BOILER_DIVISOR),
    bias: BOILER_BYTE_OFFSET as f64,
    bias_order: BiasOrder::BeforeScale,
    valid_range: (0.0, 150.0),
};

/// Fields published for every accepted payload, in publish order
pub static FIELD_TABLE: [FieldSpec; 2] = [COLLECTOR_FIELD, BOILER_FIELD];

impl FieldSpec {
    /// Index one past the last raw byte of this field
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.width.len())
    }

    /// Raw integer value as `f64`, or `None` if the payload is too short.
    pub fn raw_value(&self, payload: &[u8]) -> Option<f64> {
        let end = self.offset.checked_add(self.width.len())?;
        let bytes = payload.get(self.offset..end)?;

        let raw = match (bytes, self.signed) {
            (&[b], false) => f64::from(b),
            (&[b], true) => f64::from(b as i8),
            (&[lo, hi], false) => f64::from(u16::from_le_bytes([lo, hi])),
            (&[lo, hi], true) => f64::from(i16::from_le_bytes([lo, hi])),
            _ => return None,
        };
        Some(raw)
    }

    /// Physical value of this field, or `f64::NAN` if the payload is too short.
    pub fn extract(&self, payload: &[u8]) -> f64 {
        match self.raw_value(payload) {
            Some(raw) => match self.bias_order {
                BiasOrder::BeforeScale => self.scale.apply(raw + self.bias),
                BiasOrder::AfterScale => self.scale.apply(raw) + self.bias,
            },
            None => f64::NAN,
        }
    }

    pub fn is_plausible(&self, value: f64) -> bool {
        let (min, max) = self.valid_range;
        (min..=max).contains(&value)
    }
}

/// Smallest payload length that covers every field in `fields`
pub fn required_len(fields: &[FieldSpec]) -> usize {
    fields.iter().map(FieldSpec::end).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PAYLOAD_MIN_LEN;
    use crate::payload::decode::{decode_boiler, decode_collector};

    #[test]
    fn test_table_fits_minimum_length() {
        assert!(required_len(&FIELD_TABLE) <= PAYLOAD_MIN_LEN);
        assert_eq!(required_len(&[]), 0);
    }

    #[test]
    fn test_table_order() {
        assert_eq!(FIELD_TABLE[0].name, "collector_temperature");
        assert_eq!(FIELD_TABLE[1].name, "boiler_temperature");
    }

    #[test]
    fn test_table_matches_rules() {
        let mut payload = [0u8; 41];
        for b in 0..=255u8 {
            payload[0] = b;
            payload[36] = b;
            assert_eq!(COLLECTOR_FIELD.extract(&payload), decode_collector(&payload));
            assert_eq!(BOILER_FIELD.extract(&payload), decode_boiler(&payload));
        }
    }

    #[test]
    fn test_two_byte_fields() {
        let field = FieldSpec {
            name: "t",
            offset: 1,
            width: FieldWidth::Two,
            signed: true,
            scale: Scale::Divisor(10.0),
            bias: 0.0,
            bias_order: BiasOrder::AfterScale,
            valid_range: (-50.0, 150.0),
        };
        assert_eq!(field.extract(&[0x00, 0xCE, 0xFF]), -5.0);
        assert_eq!(field.raw_value(&[0x00, 0xCE, 0xFF]), Some(-50.0));

        let unsigned = FieldSpec { signed: false, ..field };
        assert_eq!(unsigned.raw_value(&[0x00, 0xCE, 0xFF]), Some(65486.0));
        assert!(field.extract(&[0x00, 0xCE]).is_nan());
    }

    #[test]
    fn test_plausibility_is_informational() {
        assert!(BOILER_FIELD.is_plausible(12.8));
        assert!(!BOILER_FIELD.is_plausible(-1.0));
        // Implausible values still decode.
        assert_eq!(COLLECTOR_FIELD.extract(&[0xFF]), 255.0 - 33.9);
    }
}
