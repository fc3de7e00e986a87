//! Logging for the Pokedex bot.
//!
//! One call installs a global `tracing` subscriber with an `EnvFilter`, a
//! pretty/compact/JSON formatter, and stderr, stdout or rotated-file output.
//!
//! # Example
//!
//! ```rust,no_run
//! use pokedex_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), pokedex_telemetry::TelemetryError> {
//! let _guard = setup_logging(
//!     &LogConfig::new("info")
//!         .with_format(LogFormat::Json)
//!         .with_directive("pokedex_interaction=debug"),
//! )?;
//! tracing::info!("ready");
//! # Ok(())
//! # }
//! ```
//!
//! With the `config` feature, [`LogConfig::from_section`] builds the config
//! from the `[logging]` section of `pokedex-config`.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{LogConfig, LogFormat, LogTarget, LoggingGuard, setup_logging};
