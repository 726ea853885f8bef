//! Mythos signaling relay configuration.
//!
//! TOML-based configuration with defaults for every key, so an empty or
//! missing file yields a working server on `0.0.0.0:3000`.

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{LogLevel, LoggingConfig, RelayServerConfig, ServerConfig};
pub use toml_loader::{default_config_path, load_default, load_from_path, load_optional};
