#![no_main]

use libfuzzer_sys::fuzz_target;
use vbus_bridge::calibration::calibrate;

fuzz_target!(|data: &[u8]| {
    let report = calibrate(data);
    let _ = report.to_string();
    let _ = report.to_json();
});
