//! VBUS Decoding Constants
//!
//! Field positions and corrections for the RESOL BS 2 controller (VBUS source
//! address 0x4278). None of these come from a vendor document; they were fitted
//! against a logged payload with known display values and must be kept as-is.

/// VBUS source address of the supported controller
pub const VBUS_SOURCE_ADDRESS: u16 = 0x4278;

/// Minimum payload length covering every supported field (bytes 0..=40)
pub const PAYLOAD_MIN_LEN: usize = 41;

/// Collector temperature: `payload[0] - 33.9`
pub const COLLECTOR_OFFSET: usize = 0;
pub const COLLECTOR_BIAS: f64 = 33.9;

/// Boiler temperature: `(payload[36] + 2) / 10`
pub const BOILER_OFFSET: usize = 36;
pub const BOILER_BYTE_OFFSET: i32 = 2;
pub const BOILER_DIVISOR: f64 = 10.0;

// ----------------------------------------------------------------------------
// MQTT defaults
// ----------------------------------------------------------------------------

pub const DEFAULT_BROKER: &str = "localhost";
pub const DEFAULT_PORT: u16 = 1883;
pub const DEFAULT_KEEP_ALIVE_SECS: u64 = 60;
pub const DEFAULT_RAW_TOPIC: &str = "vita/vbus/raw";
pub const DEFAULT_OUTPUT_PREFIX: &str = "vita";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Outbound topic suffixes (joined to the output prefix with '/')
pub const COLLECTOR_TOPIC: &str = "collector_temperature";
pub const BOILER_TOPIC: &str = "boiler_temperature";
