//! Core TOML config loading: read from path or platform default.

use crate::schema::RelayServerConfig;
use mythos_common::ConfigError;
use std::path::Path;
use tracing::{debug, info};

use super::paths::default_config_path;

/// Load config from a specific TOML file path.
///
/// Missing keys fall back to serde defaults. Values are not validated
/// here; callers validate once any overrides are applied.
pub fn load_from_path(path: &Path) -> Result<RelayServerConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ParseError(format!("failed to read {}: {e}", path.display())))?;

    let config: RelayServerConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Load from `path` when given, otherwise from the platform default.
pub fn load_optional(path: Option<&Path>) -> Result<RelayServerConfig, ConfigError> {
    match path {
        Some(path) => load_from_path(path),
        None => load_default(),
    }
}

/// Load config from the platform-specific default path.
///
/// On Linux: `~/.config/mythos/signal.toml`
///
/// A missing file is not an error; built-in defaults are used instead.
pub fn load_default() -> Result<RelayServerConfig, ConfigError> {
    let path = match default_config_path() {
        Ok(path) => path,
        Err(e) => {
            debug!("{e}, using built-in defaults");
            return Ok(RelayServerConfig::default());
        }
    };

    match load_from_path(&path) {
        Err(ConfigError::FileNotFound(_)) => {
            debug!("no config found at {}, using defaults", path.display());
            Ok(RelayServerConfig::default())
        }
        other => other,
    }
}
