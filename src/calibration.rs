//! # Offline Field Calibration
//!
//! The controller's field layout is undocumented. Field positions were found
//! by trying every offset with a handful of candidate formulas against one
//! payload whose display values were known. This module reruns that search so
//! the field table can be re-derived after a firmware change; it is not on
//! the bridge's data path.
//!
//! ```rust
//! use vbus_bridge::calibration::{calibrate, SAMPLE_PAYLOAD};
//!
//! let report = calibrate(&SAMPLE_PAYLOAD);
//! assert_eq!(report.recommended_boiler, 12.8);
//! ```

use std::fmt;

use serde::Serialize;

use crate::constants::{BOILER_BYTE_OFFSET, BOILER_OFFSET, COLLECTOR_BIAS, COLLECTOR_OFFSET};
use crate::payload::decode::{
    decode_biased_byte, decode_byte_half, decode_byte_half_minus_40, decode_i16_le_tenths,
    decode_scaled_byte, decode_u16_le_tenths,
};
use crate::payload::BOILER_FIELD;
use crate::util::hex::decode_hex;

/// Payload logged from a BS 2 controller (buffer positions 9..=49 of the frame)
pub const SAMPLE_PAYLOAD: [u8; 41] = [
    0x1D, 0x50, 0x7F, 0x00, 0x00, 0x07, 0x29, 0x38,
    0x22, 0x38, 0x22, 0x05, 0x46, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x7F, 0x5F, 0x14, 0x00, 0x00, 0x01,
    0x0B, 0x00, 0x00, 0x00, 0x00, 0x00, 0x7F, 0x00,
    0x00, 0x00, 0x01, 0x00, 0x7E, 0x64, 0x00, 0x00, 0x00,
];

/// Values the controller display showed for [`SAMPLE_PAYLOAD`]
pub const EXPECTED_COLLECTOR: f64 = -4.8;
pub const EXPECTED_BOILER: f64 = 12.8;

/// Collector biases compared against each other
pub const COLLECTOR_BIAS_CANDIDATES: [f64; 2] = [33.9, 33.8];

/// Candidates must land within this distance of the expected value
pub const CANDIDATE_TOLERANCE: f64 = 2.0;

/// Range of byte_offset corrections tried at the boiler offset
pub const BYTE_OFFSET_SWEEP: std::ops::RangeInclusive<i32> = -5..=5;
/// Distance below which a byte_offset trial counts as an exact match
pub const EXACT_MATCH_TOLERANCE: f64 = 0.01;

/// Candidate formulas tried at every offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Formula {
    /// `byte / 10`
    ByteTenths,
    /// `byte / 2`
    ByteHalf,
    /// `byte / 2 - 40`
    ByteHalfMinus40,
    /// unsigned little-endian pair × 0.1
    U16LeTenths,
    /// signed little-endian pair / 10
    I16LeTenths,
}

impl Formula {
    pub const ALL: [Formula; 5] = [
        Formula::ByteTenths,
        Formula::ByteHalf,
        Formula::ByteHalfMinus40,
        Formula::U16LeTenths,
        Formula::I16LeTenths,
    ];

    /// Number of payload bytes the formula reads
    pub fn width(self) -> usize {
        match self {
            Formula::U16LeTenths | Formula::I16LeTenths => 2,
            _ => 1,
        }
    }

    pub fn apply(self, payload: &[u8], offset: usize) -> f64 {
        match self {
            Formula::ByteTenths => decode_scaled_byte(payload, offset, 0),
            Formula::ByteHalf => decode_byte_half(payload, offset),
            Formula::ByteHalfMinus40 => decode_byte_half_minus_40(payload, offset),
            Formula::U16LeTenths => decode_u16_le_tenths(payload, offset),
            Formula::I16LeTenths => decode_i16_le_tenths(payload, offset),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Formula::ByteTenths => "single byte / 10",
            Formula::ByteHalf => "byte/2",
            Formula::ByteHalfMinus40 => "byte/2 - 40",
            Formula::U16LeTenths => "two bytes LE * 0.1",
            Formula::I16LeTenths => "signed two bytes LE / 10",
        }
    }
}

/// One offset whose decoded value is close to the expected value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub formula: Formula,
    pub offset: usize,
    pub raw: Vec<u8>,
    pub value: f64,
}

/// `(byte + byte_offset) / 10` for one correction value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ByteOffsetTrial {
    pub byte_offset: i32,
    pub raw: u8,
    pub value: f64,
    pub exact: bool,
}

/// Collector value for one candidate bias
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CollectorTrial {
    pub bias: f64,
    pub value: f64,
}

/// Every offset at which `formula` yields a value within
/// [`CANDIDATE_TOLERANCE`] of `expected` and inside the boiler field's
/// plausible range.
pub fn find_candidates(payload: &[u8], formula: Formula, expected: f64) -> Vec<Candidate> {
    let last = payload.len().saturating_sub(formula.width() - 1);

    (0..last)
        .filter_map(|offset| {
            let value = formula.apply(payload, offset);
            let close = (value - expected).abs() < CANDIDATE_TOLERANCE;
            (close && BOILER_FIELD.is_plausible(value)).then(|| Candidate {
                formula,
                offset,
                raw: payload[offset..offset + formula.width()].to_vec(),
                value,
            })
        })
        .collect()
}

/// Tries each correction in [`BYTE_OFFSET_SWEEP`] on `payload[offset]`.
/// Empty when the offset is outside the payload.
pub fn sweep_byte_offset(payload: &[u8], offset: usize, expected: f64) -> Vec<ByteOffsetTrial> {
    let Some(&raw) = payload.get(offset) else {
        return Vec::new();
    };

    BYTE_OFFSET_SWEEP
        .map(|byte_offset| {
            let value = decode_scaled_byte(payload, offset, byte_offset);
            ByteOffsetTrial {
                byte_offset,
                raw,
                value,
                exact: (value - expected).abs() < EXACT_MATCH_TOLERANCE,
            }
        })
        .collect()
}

/// Results of a full calibration search over one payload
#[derive(Debug, Clone, Serialize)]
pub struct CalibrationReport {
    pub payload_len: usize,
    pub collector: Vec<CollectorTrial>,
    pub candidates: Vec<Candidate>,
    pub boiler_offset: usize,
    pub byte_offset_sweep: Vec<ByteOffsetTrial>,
    pub recommended_collector: f64,
    pub recommended_boiler: f64,
}

impl CalibrationReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    fn candidates_for(&self, formula: Formula) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter().filter(move |c| c.formula == formula)
    }
}

/// Runs the collector bias comparison, the per-formula boiler search and the
/// byte_offset sweep at the production boiler offset.
pub fn calibrate(payload: &[u8]) -> CalibrationReport {
    let collector = COLLECTOR_BIAS_CANDIDATES
        .iter()
        .map(|&bias| CollectorTrial {
            bias,
            value: decode_biased_byte(payload, COLLECTOR_OFFSET, bias),
        })
        .collect();

    let candidates = Formula::ALL
        .iter()
        .flat_map(|&formula| find_candidates(payload, formula, EXPECTED_BOILER))
        .collect();

    CalibrationReport {
        payload_len: payload.len(),
        collector,
        candidates,
        boiler_offset: BOILER_OFFSET,
        byte_offset_sweep: sweep_byte_offset(payload, BOILER_OFFSET, EXPECTED_BOILER),
        recommended_collector: decode_biased_byte(payload, COLLECTOR_OFFSET, COLLECTOR_BIAS),
        recommended_boiler: decode_scaled_byte(payload, BOILER_OFFSET, BOILER_BYTE_OFFSET),
    }
}

/// Where the calibration input came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// No argument given
    Sample,
    /// Hex from the command line
    Argument,
    /// The argument was not valid hex
    InvalidArgument(String),
}

/// Joins the command-line arguments into one hex string and decodes it,
/// falling back to [`SAMPLE_PAYLOAD`] when there is none or it is invalid.
pub fn resolve_input(args: &[String]) -> (Vec<u8>, InputSource) {
    let joined = args.concat();
    if joined.trim().is_empty() {
        return (SAMPLE_PAYLOAD.to_vec(), InputSource::Sample);
    }

    match decode_hex(&joined) {
        Ok(bytes) => (bytes, InputSource::Argument),
        Err(e) => (SAMPLE_PAYLOAD.to_vec(), InputSource::InvalidArgument(e.to_string())),
    }
}

impl fmt::Display for CalibrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Payload length: {} bytes", self.payload_len)?;
        writeln!(f)?;

        for trial in &self.collector {
            writeln!(
                f,
                "Collector (payload[0] - {}): {:.1} °C  (expected ~{})",
                trial.bias, trial.value, EXPECTED_COLLECTOR
            )?;
        }
        writeln!(f)?;

        for formula in Formula::ALL {
            writeln!(f, "Boiler candidates ({}):", formula.label())?;
            for c in self.candidates_for(formula) {
                match c.raw.as_slice() {
                    [b] => writeln!(f, "  payload[{}] = 0x{:02X} -> {:.1} °C", c.offset, b, c.value)?,
                    _ => writeln!(
                        f,
                        "  payload[{},{}] -> {:.1} °C",
                        c.offset,
                        c.offset + 1,
                        c.value
                    )?,
                }
            }
            writeln!(f)?;
        }

        writeln!(
            f,
            "Boiler payload[{}] with byte_offset (byte + k) / 10:",
            self.boiler_offset
        )?;
        for trial in &self.byte_offset_sweep {
            writeln!(
                f,
                "  (0x{:02X} {:+}) / 10 = {:.1} °C{}",
                trial.raw,
                trial.byte_offset,
                trial.value,
                if trial.exact { " <-- match" } else { "" }
            )?;
        }
        writeln!(f)?;

        writeln!(
            f,
            "Recommended: Collector = payload[0] - {} = {:.1} °C",
            COLLECTOR_BIAS, self.recommended_collector
        )?;
        write!(
            f,
            "Recommended: Boiler    = (payload[{}] + {}) / 10 = {:.1} °C",
            BOILER_OFFSET, BOILER_BYTE_OFFSET, self.recommended_boiler
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_marks_byte_offset_two() {
        let sweep = sweep_byte_offset(&SAMPLE_PAYLOAD, BOILER_OFFSET, EXPECTED_BOILER);
        assert_eq!(sweep.len(), 11);
        let exact: Vec<i32> = sweep.iter().filter(|t| t.exact).map(|t| t.byte_offset).collect();
        assert_eq!(exact, vec![2]);
        assert!(sweep.iter().all(|t| t.raw == 0x7E));
    }

    #[test]
    fn test_sweep_out_of_range() {
        assert!(sweep_byte_offset(&[0x7E], 36, EXPECTED_BOILER).is_empty());
    }

    #[test]
    fn test_single_byte_candidates() {
        let found = find_candidates(&SAMPLE_PAYLOAD, Formula::ByteTenths, EXPECTED_BOILER);
        // 0x7F = 12.7 at offsets 2, 18 and 30; 0x7E = 12.6 at 36
        let offsets: Vec<usize> = found.iter().map(|c| c.offset).collect();
        assert_eq!(offsets, vec![2, 18, 30, 36]);
        assert!(found.iter().all(|c| (c.value - EXPECTED_BOILER).abs() < CANDIDATE_TOLERANCE));
    }

    #[test]
    fn test_two_byte_candidates_stay_in_bounds() {
        let payload = [0x80, 0x00];
        let found = find_candidates(&payload, Formula::U16LeTenths, EXPECTED_BOILER);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].raw, vec![0x80, 0x00]);
        assert!(find_candidates(&[], Formula::I16LeTenths, EXPECTED_BOILER).is_empty());
    }

    #[test]
    fn test_report_text() {
        let text = calibrate(&SAMPLE_PAYLOAD).to_string();
        assert!(text.starts_with("Payload length: 41 bytes"));
        assert!(text.contains("(0x7E +2) / 10 = 12.8 °C <-- match"));
        assert!(text.contains("Recommended: Boiler    = (payload[36] + 2) / 10 = 12.8 °C"));
    }
}
