use log::{debug, info, log_enabled, Level};

use crate::constants::DEFAULT_LOG_LEVEL;
use crate::util::hex::format_hex_compact;

/// Hex dumps longer than this are truncated in log output
const MAX_LOG_BYTES: usize = 64;

/// Initializes the logger with the `env_logger` crate.
///
/// `level` is the default filter (usually taken from `LOG_LEVEL`); a `RUST_LOG`
/// variable still takes precedence. Calling this more than once is harmless.
pub fn init_logger(level: &str) {
    let filter = normalize_level(level);
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp_secs()
        .try_init();
}

/// Maps level names as commonly written in deployment environments
/// ("INFO", "WARNING", "CRITICAL") onto `log` filter names.
pub fn normalize_level(level: &str) -> String {
    match level.trim().to_ascii_lowercase().as_str() {
        "" => DEFAULT_LOG_LEVEL.to_string(),
        "warning" => "warn".to_string(),
        "critical" | "fatal" => "error".to_string(),
        "notset" => "trace".to_string(),
        other => other.to_string(),
    }
}

/// Logs payload bytes in hex at debug level, truncated to keep lines short.
pub fn log_payload_hex(prefix: &str, data: &[u8]) {
    if !log_enabled!(Level::Debug) {
        return;
    }

    let shown = &data[..data.len().min(MAX_LOG_BYTES)];
    let suffix = if data.len() > MAX_LOG_BYTES {
        format!(" ... ({} bytes total)", data.len())
    } else {
        String::new()
    };

    debug!("{prefix}: {}{suffix}", format_hex_compact(shown));
}

/// Logs an informational message.
pub fn log_info(message: &str) {
    info!("{message}");
}
