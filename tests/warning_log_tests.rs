//! Log output of the bridge pipeline. Kept in its own test binary since it
//! installs a global logger; tests share it and filter on their own messages.

use std::sync::{Mutex, Once};

use log::{Level, LevelFilter, Log, Metadata, Record};
use vbus_bridge::calibration::SAMPLE_PAYLOAD;
use vbus_bridge::payload::{BiasOrder, FieldWidth, Scale, COLLECTOR_FIELD};
use vbus_bridge::util::hex::encode_hex;
use vbus_bridge::{Bridge, FieldSpec, MemoryTransport};

static RECORDS: Mutex<Vec<(Level, String)>> = Mutex::new(Vec::new());
static INIT: Once = Once::new();

struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        RECORDS
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;

fn install_logger() {
    INIT.call_once(|| {
        log::set_logger(&LOGGER).unwrap();
        log::set_max_level(LevelFilter::Trace);
    });
}

fn messages(level: Level, prefix: &str) -> Vec<String> {
    RECORDS
        .lock()
        .unwrap()
        .iter()
        .filter(|(l, message)| *l == level && message.starts_with(prefix))
        .map(|(_, message)| message.clone())
        .collect()
}

static WITH_MISSING_FIELD: [FieldSpec; 2] = [
    COLLECTOR_FIELD,
    FieldSpec {
        name: "missing_temperature",
        offset: 500,
        width: FieldWidth::One,
        signed: false,
        scale: Scale::Factor(1.0),
        bias: 0.0,
        bias_order: BiasOrder::AfterScale,
        valid_range: (0.0, 255.0),
    },
];

#[test]
fn test_discards_are_logged_as_warnings() {
    install_logger();

    let mut bridge = Bridge::new("vita");
    let mut transport = MemoryTransport::new();
    bridge.process(b"not-hex!!", &mut transport);
    bridge.process("00".repeat(20).as_bytes(), &mut transport);
    assert!(transport.published().is_empty());

    let warnings = messages(Level::Warn, "Discarding inbound message");
    assert_eq!(warnings.len(), 2, "{warnings:?}");
    assert!(warnings[0].contains("Invalid hexadecimal payload"));
    assert!(warnings[1].contains("Payload too short: 20 bytes (minimum 41)"));
}

#[test]
fn test_published_summary_lists_only_accepted_readings() {
    install_logger();

    let mut bridge = Bridge::new("vita");
    let mut transport = MemoryTransport::new();
    transport.fail_next_publishes(1);
    assert_eq!(
        bridge.process(encode_hex(&SAMPLE_PAYLOAD).as_bytes(), &mut transport),
        1
    );

    let mut bridge = Bridge::new("solar").with_fields(&WITH_MISSING_FIELD);
    let mut transport = MemoryTransport::new();
    assert_eq!(
        bridge.process(encode_hex(&SAMPLE_PAYLOAD).as_bytes(), &mut transport),
        1
    );

    let summaries = messages(Level::Debug, "Published ");
    assert!(summaries.contains(&"Published boiler_temperature=12.8".to_string()));
    assert!(summaries.contains(&"Published collector_temperature=-4.9".to_string()));
    assert!(summaries.iter().all(|s| !s.contains("NaN")), "{summaries:?}");
    assert!(
        summaries
            .iter()
            .all(|s| !s.contains("collector_temperature=-4.9, ")),
        "{summaries:?}"
    );

    let failures = messages(Level::Warn, "Failed to publish");
    assert!(failures.iter().any(|f| f.starts_with("Failed to publish vita/collector_temperature")));
}
