#![no_main]

use libfuzzer_sys::fuzz_target;
use vbus_bridge::{Bridge, MemoryTransport};

fuzz_target!(|data: &[u8]| {
    // Arbitrary inbound bytes must be rejected or decoded, never panic
    let bridge = Bridge::new("fuzz");
    let publications = bridge.handle_message(data);

    // A message either publishes every field or nothing
    if let Ok(publications) = &publications {
        assert!(publications.len() <= 2);
    }

    // Hex-encoded copies reach the decoder past the ASCII and hex checks
    let hex: String = data.iter().map(|b| format!("{b:02X}")).collect();
    let mut bridge = Bridge::new("fuzz");
    let mut transport = MemoryTransport::new();
    let published = bridge.process(hex.as_bytes(), &mut transport);
    assert_eq!(published == 2, data.len() >= 41);
});
