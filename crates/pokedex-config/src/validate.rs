//! Post-load configuration validation.
//!
//! Checks that deserialized [`Config`](crate::Config) values are within
//! acceptable ranges. Credentials are not checked here; they are only
//! required by the operations that use them.

use std::net::SocketAddr;

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Discord accepts at most this many autocomplete choices and rejects
/// messages with more than this many embed fields.
pub const DISCORD_LIST_CAP: u32 = 25;

/// Validate a loaded configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_commands(config)?;
    validate_server(config)?;
    validate_dataset(config)?;
    validate_logging(config)?;
    Ok(())
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_owned(),
        message: message.into(),
    }
}

fn validate_commands(config: &Config) -> ConfigResult<()> {
    let c = &config.commands;
    if !(1..=DISCORD_LIST_CAP).contains(&c.page_limit) {
        return Err(invalid(
            "commands.page_limit",
            format!("must be between 1 and {DISCORD_LIST_CAP}, got {}", c.page_limit),
        ));
    }
    if !(1..=DISCORD_LIST_CAP).contains(&c.autocomplete_limit) {
        return Err(invalid(
            "commands.autocomplete_limit",
            format!(
                "must be between 1 and {DISCORD_LIST_CAP}, got {}",
                c.autocomplete_limit
            ),
        ));
    }
    Ok(())
}

fn validate_server(config: &Config) -> ConfigResult<()> {
    let s = &config.server;
    if s.bind.parse::<SocketAddr>().is_err() {
        return Err(invalid(
            "server.bind",
            format!("'{}' is not a socket address (expected host:port)", s.bind),
        ));
    }
    if !s.path.starts_with('/') {
        return Err(invalid("server.path", "must start with '/'"));
    }
    if s.max_body_bytes == 0 {
        return Err(invalid("server.max_body_bytes", "must be greater than 0"));
    }
    Ok(())
}

fn validate_dataset(config: &Config) -> ConfigResult<()> {
    let d = &config.dataset;
    if d.min_level == 0 {
        return Err(invalid("dataset.min_level", "must be at least 1"));
    }
    if d.min_level > d.max_level {
        return Err(invalid(
            "dataset.max_level",
            format!(
                "max_level {} is below min_level {}",
                d.max_level, d.min_level
            ),
        ));
    }
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let l = &config.logging;
    if !matches!(
        l.level.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    ) {
        return Err(invalid(
            "logging.level",
            format!(
                "unknown level '{}'; expected one of: trace, debug, info, warn, error",
                l.level
            ),
        ));
    }
    if !matches!(l.format.as_str(), "pretty" | "compact" | "full" | "json") {
        return Err(invalid(
            "logging.format",
            format!(
                "unknown format '{}'; expected one of: pretty, compact, full, json",
                l.format
            ),
        ));
    }
    if let Some(bad) = l.directives.iter().find(|d| d.trim().is_empty()) {
        return Err(invalid(
            "logging.directives",
            format!("empty directive {bad:?}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(result: ConfigResult<()>) -> String {
        match result {
            Err(ConfigError::ValidationError { field, .. }) => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn defaults_are_valid() {
        validate(&Config::default()).unwrap();
    }

    #[test]
    fn page_limit_bounds() {
        let mut config = Config::default();
        config.commands.page_limit = 0;
        assert_eq!(field_of(validate(&config)), "commands.page_limit");
        config.commands.page_limit = 26;
        assert_eq!(field_of(validate(&config)), "commands.page_limit");
        config.commands.page_limit = 25;
        validate(&config).unwrap();
    }

    #[test]
    fn autocomplete_limit_bounds() {
        let mut config = Config::default();
        config.commands.autocomplete_limit = 30;
        assert_eq!(field_of(validate(&config)), "commands.autocomplete_limit");
    }

    #[test]
    fn bind_must_be_socket_address() {
        let mut config = Config::default();
        config.server.bind = "localhost".into();
        assert_eq!(field_of(validate(&config)), "server.bind");
        config.server.bind = "0.0.0.0:3000".into();
        validate(&config).unwrap();
    }

    #[test]
    fn server_path_needs_leading_slash() {
        let mut config = Config::default();
        config.server.path = "interactions".into();
        assert_eq!(field_of(validate(&config)), "server.path");
    }

    #[test]
    fn level_range_must_be_ordered() {
        let mut config = Config::default();
        config.dataset.min_level = 50;
        config.dataset.max_level = 10;
        assert_eq!(field_of(validate(&config)), "dataset.max_level");
    }

    #[test]
    fn logging_level_and_format() {
        let mut config = Config::default();
        config.logging.level = "verbose".into();
        assert_eq!(field_of(validate(&config)), "logging.level");

        let mut config = Config::default();
        config.logging.level = "DEBUG".into();
        validate(&config).unwrap();

        config.logging.format = "full".into();
        validate(&config).unwrap();

        config.logging.format = "xml".into();
        assert_eq!(field_of(validate(&config)), "logging.format");
    }
}
