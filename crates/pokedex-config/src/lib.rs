#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Configuration for the Pokedex bot.
//!
//! A single [`Config`] read from one TOML file, with Discord credentials
//! optionally supplied through the environment.
//!
//! # Usage
//!
//! ```rust,no_run
//! use pokedex_config::Config;
//!
//! let config = Config::load(None).unwrap();
//! println!("serving on {}", config.server.bind);
//! ```
//!
//! # Sections
//!
//! | Section      | Purpose                                            |
//! |--------------|----------------------------------------------------|
//! | `[discord]`  | credentials, guild-scoped registration             |
//! | `[commands]` | page size, autocomplete suggestion count           |
//! | `[server]`   | interactions endpoint bind address and path        |
//! | `[dataset]`  | Pokemon snapshot path and level range              |
//! | `[logging]`  | level, format, per-crate directives, log directory |
//!
//! This crate has no dependencies on other internal crates.

/// Environment variable fallbacks.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use types::*;

impl Config {
    /// Load configuration from `path`, or from the default search path.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a file is unreadable or malformed, or if
    /// validation fails.
    pub fn load(path: Option<&std::path::Path>) -> ConfigResult<Self> {
        loader::load(path)
    }

    /// Parse and validate configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the string is malformed or invalid.
    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_owned(),
            source: e,
        })?;
        validate::validate(&config)?;
        Ok(config)
    }
}
