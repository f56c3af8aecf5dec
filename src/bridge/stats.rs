//! Message counters for the bridge loop.

use std::fmt;

use serde::Serialize;

/// Running totals since the bridge started. Messages are independent; these
/// counters are the only thing carried from one message to the next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BridgeStats {
    /// Inbound messages seen
    pub received: u64,
    /// Messages that passed validation and were decoded
    pub decoded: u64,
    /// Messages dropped as malformed or undersized
    pub discarded: u64,
    /// Readings handed to the publisher
    pub published: u64,
    /// Readings the publisher refused
    pub publish_failures: u64,
    /// Readings skipped because they decoded to not-a-number
    pub skipped_readings: u64,
}

impl BridgeStats {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for BridgeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "received={}, decoded={}, discarded={}, published={}, publish_failures={}, skipped_readings={}",
            self.received,
            self.decoded,
            self.discarded,
            self.published,
            self.publish_failures,
            self.skipped_readings
        )
    }
}
