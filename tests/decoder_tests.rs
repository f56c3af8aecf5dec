//! Decoder tests against the logged BS 2 sample and arbitrary payloads.

use proptest::prelude::*;
use vbus_bridge::calibration::SAMPLE_PAYLOAD;
use vbus_bridge::constants::PAYLOAD_MIN_LEN;
use vbus_bridge::payload::decode::{
    decode_biased_byte, decode_byte_half, decode_byte_half_minus_40, decode_i16_le_tenths,
    decode_scaled_byte, decode_u16_le_tenths,
};
use vbus_bridge::util::hex::{decode_hex, encode_hex};
use vbus_bridge::{decode_boiler, decode_collector, Payload, VBusError, FIELD_TABLE};

const SAMPLE_HEX: &str =
    "1D 50 7F 00 00 07 29 38 22 38 22 05 46 00 00 00 00 00 7F 5F 14 00 00 01 0B 00 00 00 00 00 7F 00 00 00 01 00 7E 64 00 00 00";

#[test]
fn test_sample_hex_matches_sample_bytes() {
    assert_eq!(decode_hex(SAMPLE_HEX).unwrap(), SAMPLE_PAYLOAD.to_vec());
    assert_eq!(SAMPLE_PAYLOAD.len(), PAYLOAD_MIN_LEN);
}

#[test]
fn test_sample_boiler_temperature() {
    let payload = Payload::from_hex(SAMPLE_HEX).unwrap();
    assert_eq!(payload.boiler_temperature(), 12.8);
    assert_eq!(format!("{:.1}", payload.boiler_temperature()), "12.8");
}

#[test]
fn test_sample_collector_temperature() {
    let payload = Payload::from_hex(SAMPLE_HEX).unwrap();
    // 0x1D = 29; the bias is applied verbatim
    assert_eq!(payload.collector_temperature(), 29.0 - 33.9);
    assert_eq!(format!("{:.1}", payload.collector_temperature()), "-4.9");
}

#[test]
fn test_sample_readings_in_table_order() {
    let payload = Payload::new(SAMPLE_PAYLOAD.to_vec()).unwrap();
    let readings = payload.readings();
    let names: Vec<&str> = readings.iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["collector_temperature", "boiler_temperature"]);
    assert_eq!(readings.len(), FIELD_TABLE.len());
}

#[test]
fn test_payload_length_boundary() {
    assert!(Payload::new(vec![0u8; 41]).is_ok());
    assert!(Payload::new(vec![0u8; 200]).is_ok());

    let err = Payload::new(vec![0u8; 40]).unwrap_err();
    assert!(matches!(err, VBusError::PayloadTooShort { len: 40, min: 41 }));
    assert_eq!(err.to_string(), "Payload too short: 40 bytes (minimum 41)");
}

#[test]
fn test_rules_on_empty_payload_are_nan() {
    let empty: [u8; 0] = [];
    assert!(decode_collector(&empty).is_nan());
    assert!(decode_boiler(&empty).is_nan());
    assert!(decode_biased_byte(&empty, 0, 33.9).is_nan());
    assert!(decode_scaled_byte(&empty, 0, 2).is_nan());
    assert!(decode_byte_half(&empty, 0).is_nan());
    assert!(decode_byte_half_minus_40(&empty, 0).is_nan());
    assert!(decode_u16_le_tenths(&empty, 0).is_nan());
    assert!(decode_i16_le_tenths(&empty, 0).is_nan());
}

proptest! {
    #[test]
    fn prop_collector_is_byte0_minus_bias(data in proptest::collection::vec(any::<u8>(), 41..96)) {
        let payload = Payload::new(data.clone()).unwrap();
        prop_assert_eq!(payload.collector_temperature(), f64::from(data[0]) - 33.9);
        prop_assert_eq!(payload.readings()[0].value, f64::from(data[0]) - 33.9);
    }

    #[test]
    fn prop_boiler_is_byte36_plus_two_over_ten(data in proptest::collection::vec(any::<u8>(), 41..96)) {
        let payload = Payload::new(data.clone()).unwrap();
        prop_assert_eq!(payload.boiler_temperature(), (f64::from(data[36]) + 2.0) / 10.0);
        prop_assert_eq!(payload.readings()[1].value, (f64::from(data[36]) + 2.0) / 10.0);
    }

    #[test]
    fn prop_hex_decoding_of_long_strings(data in proptest::collection::vec(any::<u8>(), 41..96)) {
        let payload = Payload::from_hex(&encode_hex(&data)).unwrap();
        prop_assert_eq!(payload.as_bytes(), data.as_slice());
    }

    #[test]
    fn prop_short_payloads_rejected(data in proptest::collection::vec(any::<u8>(), 0..41)) {
        let rejected = matches!(Payload::new(data), Err(VBusError::PayloadTooShort { .. }));
        prop_assert!(rejected);
    }

    #[test]
    fn prop_rules_never_panic(
        data in proptest::collection::vec(any::<u8>(), 0..8),
        offset in 0usize..16,
    ) {
        let values = [
            decode_biased_byte(&data, offset, 33.9),
            decode_scaled_byte(&data, offset, 2),
            decode_byte_half(&data, offset),
            decode_byte_half_minus_40(&data, offset),
        ];
        for value in values {
            prop_assert_eq!(value.is_nan(), offset >= data.len());
        }
        let pair = decode_u16_le_tenths(&data, offset);
        prop_assert_eq!(pair.is_nan(), offset + 1 >= data.len());
        prop_assert_eq!(decode_i16_le_tenths(&data, offset).is_nan(), pair.is_nan());
    }
}
