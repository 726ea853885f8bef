//! Configuration schema for the signaling relay.
//!
//! Every section uses `#[serde(default)]` so a partial file only needs the
//! keys it wants to change.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayServerConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Listening endpoint and per-connection limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    pub port: u16,
    /// Frames buffered per connection before further sends are dropped
    /// (valid range: 1-65536).
    pub outbox_capacity: u32,
    /// Body of the plain-text HTTP response for non-WebSocket requests.
    pub banner: String,
    /// Text carried in `error_no_master` replies.
    pub no_master_message: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            outbox_capacity: 256,
            banner: "Mythos signaling server is running.".into(),
            no_master_message: "Master not found.".into(),
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    /// Log every relayed screen chunk and ack at trace level.
    pub relay_trace: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            relay_trace: false,
        }
    }
}

impl LoggingConfig {
    /// Default `EnvFilter` directive for the relay binary.
    pub fn directive(&self) -> String {
        format!("mythos_signal={}", self.level.as_str())
    }
}
