//! # Bridge Configuration
//!
//! Broker and topic settings, read from command-line flags with environment
//! variable fallbacks. Every setting has a default, so the bridge starts with
//! no configuration at all against a broker on `localhost:1883`.

use std::time::Duration;

use clap::Args;
use rumqttc::MqttOptions;

use crate::constants::{
    DEFAULT_BROKER, DEFAULT_KEEP_ALIVE_SECS, DEFAULT_OUTPUT_PREFIX, DEFAULT_PORT, DEFAULT_RAW_TOPIC,
};
use crate::error::VBusError;

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct BridgeConfig {
    /// MQTT broker host
    #[arg(long, env = "MQTT_BROKER", default_value = DEFAULT_BROKER)]
    pub broker: String,

    /// MQTT broker port
    #[arg(long, env = "MQTT_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Username; no authentication when unset or empty
    #[arg(long, env = "MQTT_USERNAME")]
    pub username: Option<String>,

    #[arg(long, env = "MQTT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Client id; defaults to "vbus-bridge-<pid>"
    #[arg(long, env = "MQTT_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Keep-alive interval in seconds
    #[arg(long, env = "MQTT_KEEP_ALIVE", default_value_t = DEFAULT_KEEP_ALIVE_SECS)]
    pub keep_alive: u64,

    /// Topic carrying hex-encoded VBUS payloads
    #[arg(long, env = "VBUS_RAW_TOPIC", default_value = DEFAULT_RAW_TOPIC)]
    pub raw_topic: String,

    /// Prefix for the collector_temperature and boiler_temperature topics
    #[arg(long, env = "VBUS_OUTPUT_TOPIC_PREFIX", default_value = DEFAULT_OUTPUT_PREFIX)]
    pub output_prefix: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            broker: DEFAULT_BROKER.to_string(),
            port: DEFAULT_PORT,
            username: None,
            password: None,
            client_id: None,
            keep_alive: DEFAULT_KEEP_ALIVE_SECS,
            raw_topic: DEFAULT_RAW_TOPIC.to_string(),
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
        }
    }
}

impl BridgeConfig {
    /// Rejects topics the broker would refuse: empty topics, and wildcards in
    /// the publish prefix.
    pub fn validate(&self) -> Result<(), VBusError> {
        if self.raw_topic.is_empty() {
            return Err(VBusError::Config("inbound topic must not be empty".to_string()));
        }
        if self.output_prefix.trim_end_matches('/').is_empty() {
            return Err(VBusError::Config("output topic prefix must not be empty".to_string()));
        }
        if self.output_prefix.contains(['+', '#']) {
            return Err(VBusError::Config(format!(
                "output topic prefix '{}' must not contain wildcards",
                self.output_prefix
            )));
        }
        if self.broker.is_empty() {
            return Err(VBusError::Config("broker host must not be empty".to_string()));
        }
        Ok(())
    }

    /// Username and password to authenticate with. A username without a
    /// password authenticates with an empty password.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let username = self.username.as_deref().filter(|u| !u.is_empty())?;
        Some((username, self.password.as_deref().unwrap_or("")))
    }

    pub fn client_id(&self) -> String {
        match self.client_id.as_deref() {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => format!("vbus-bridge-{}", std::process::id()),
        }
    }

    /// Broker address for log messages
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.broker, self.port)
    }

    pub fn mqtt_options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(self.client_id(), self.broker.as_str(), self.port);
        options.set_keep_alive(Duration::from_secs(self.keep_alive));
        if let Some((username, password)) = self.credentials() {
            options.set_credentials(username, password);
        }
        options
    }
}
