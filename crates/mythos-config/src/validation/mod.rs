//! Configuration validation.
//!
//! Collects every problem into a single `ConfigError` so an operator sees
//! all bad keys at once.

mod helpers;


use crate::schema::RelayServerConfig;
use mythos_common::ConfigError;

use helpers::{validate_non_empty, validate_range};

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &RelayServerConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_non_empty(&mut errors, "server.host", &config.server.host);
    validate_range(
        &mut errors,
        "server.port",
        u32::from(config.server.port),
        1,
        65535,
    );
    validate_range(
        &mut errors,
        "server.outbox_capacity",
        config.server.outbox_capacity,
        1,
        65536,
    );
    validate_non_empty(
        &mut errors,
        "server.no_master_message",
        &config.server.no_master_message,
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
