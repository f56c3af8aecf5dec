//! # vbus-bridge - RESOL VBUS Telemetry to MQTT
//!
//! The vbus-bridge crate decodes the data payload of a RESOL BS 2 solar
//! controller (VBUS source address 0x4278) into collector and boiler
//! temperatures and republishes them over MQTT, e.g. for Home Assistant.
//!
//! ## Features
//!
//! - Pure payload decoding driven by a small field table
//! - A per-message bridge pipeline: ingest, validate, decode, publish
//! - An MQTT transport built on `rumqttc`
//! - An offline calibration search for re-deriving field offsets
//!
//! The VBUS wire protocol itself (sync bytes, headers, septett encoding,
//! checksums) is handled upstream; this crate receives one payload at a time
//! as ASCII hex.
//!
//! ## Usage
//!
//! ```rust
//! use vbus_bridge::{Bridge, MemoryTransport};
//! use vbus_bridge::calibration::SAMPLE_PAYLOAD;
//! use vbus_bridge::util::hex::encode_hex;
//!
//! let mut bridge = Bridge::new("vita");
//! let mut transport = MemoryTransport::new();
//!
//! let published = bridge.process(encode_hex(&SAMPLE_PAYLOAD).as_bytes(), &mut transport);
//! assert_eq!(published, 2);
//! assert_eq!(transport.published()[1].topic, "vita/boiler_temperature");
//! assert_eq!(transport.published()[1].payload, "12.8");
//! ```

pub mod bridge;
pub mod calibration;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod payload;
pub mod util;

pub use crate::error::VBusError;
pub use crate::logging::init_logger;

pub use bridge::{
    Bridge, BridgeState, BridgeStats, InboundMessage, MemoryTransport, MessageSource,
    MqttTransport, Publication, Publisher,
};
pub use config::BridgeConfig;
pub use payload::{decode_boiler, decode_collector, DecodedReading, FieldSpec, Payload, FIELD_TABLE};
