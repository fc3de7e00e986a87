//! Logging configuration and setup.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::error::{TelemetryError, TelemetryResult};

/// Log format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line, human-readable output.
    Pretty,
    /// Single-line output (default).
    #[default]
    Compact,
    /// Single-line output with the full span context.
    Full,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "full" => Ok(Self::Full),
            "json" => Ok(Self::Json),
            other => Err(TelemetryError::UnknownFormat(other.to_owned())),
        }
    }
}

/// Log output target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    /// Log to stdout.
    Stdout,
    /// Log to stderr.
    #[default]
    Stderr,
    /// Daily-rotated files in a directory, named `{prefix}.YYYY-MM-DD`.
    File {
        /// Directory to write to; created if missing.
        directory: PathBuf,
        /// File name prefix.
        prefix: String,
    },
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Base level filter (e.g. "info").
    pub level: String,
    /// Output format.
    pub format: LogFormat,
    /// Output target.
    pub target: LogTarget,
    /// Directive overrides (e.g. `pokedex_interaction=debug`).
    pub directives: Vec<String>,
    /// Use `RUST_LOG` instead of `level` when it is set.
    pub env_override: bool,
    /// Include source file and line.
    pub file_info: bool,
    /// Use ANSI colors. Ignored for file and JSON output.
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::default(),
            target: LogTarget::default(),
            directives: Vec::new(),
            env_override: true,
            file_info: false,
            ansi: true,
        }
    }
}

impl LogConfig {
    /// Create a new log config with the specified level.
    #[must_use]
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }

    /// Set the log format.
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Write daily-rotated files to `directory`.
    #[must_use]
    pub fn with_file_logging(
        mut self,
        directory: impl Into<PathBuf>,
        prefix: impl Into<String>,
    ) -> Self {
        self.target = LogTarget::File {
            directory: directory.into(),
            prefix: prefix.into(),
        };
        self.ansi = false;
        self
    }

    /// Add a directive override.
    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    /// Ignore `RUST_LOG`.
    #[must_use]
    pub fn without_env_override(mut self) -> Self {
        self.env_override = false;
        self
    }

    /// Enable file/line info.
    #[must_use]
    pub fn with_file_info(mut self) -> Self {
        self.file_info = true;
        self
    }

    fn build_filter(&self) -> TelemetryResult<EnvFilter> {
        let env = self
            .env_override
            .then(|| EnvFilter::try_from_default_env().ok())
            .flatten();
        let mut filter = match env {
            Some(filter) => filter,
            None => EnvFilter::try_new(&self.level).map_err(|e| TelemetryError::InvalidFilter {
                directive: self.level.clone(),
                message: e.to_string(),
            })?,
        };

        for directive in &self.directives {
            let parsed = directive
                .parse()
                .map_err(|e: tracing_subscriber::filter::ParseError| {
                    TelemetryError::InvalidFilter {
                        directive: directive.clone(),
                        message: e.to_string(),
                    }
                })?;
            filter = filter.add_directive(parsed);
        }
        Ok(filter)
    }
}

/// Keeps the background log writer alive.
///
/// Buffered file output is flushed when this is dropped, so hold it for the
/// lifetime of `main`.
#[must_use = "dropping the guard stops file logging"]
#[derive(Debug)]
pub struct LoggingGuard {
    _worker: Option<WorkerGuard>,
}

type Base = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<Base> + Send + Sync>;

fn fmt_layer<W>(config: &LogConfig, writer: W) -> BoxedLayer
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_file(config.file_info)
        .with_line_number(config.file_info);
    match config.format {
        LogFormat::Pretty => layer.pretty().with_ansi(config.ansi).boxed(),
        LogFormat::Compact => layer.compact().with_ansi(config.ansi).boxed(),
        LogFormat::Full => layer.with_ansi(config.ansi).boxed(),
        LogFormat::Json => layer.json().with_ansi(false).boxed(),
    }
}

/// Install the global subscriber described by `config`.
///
/// # Errors
///
/// Returns an error if the filter is invalid, the log directory cannot be
/// created, or a subscriber is already installed.
pub fn setup_logging(config: &LogConfig) -> TelemetryResult<LoggingGuard> {
    let filter = config.build_filter()?;

    let (layer, worker) = match &config.target {
        LogTarget::Stdout => (fmt_layer(config, std::io::stdout), None),
        LogTarget::Stderr => (fmt_layer(config, std::io::stderr), None),
        LogTarget::File { directory, prefix } => {
            std::fs::create_dir_all(directory).map_err(|source| {
                TelemetryError::LogDirectory {
                    path: directory.clone(),
                    source,
                }
            })?;
            let appender = tracing_appender::rolling::daily(directory, prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let plain = LogConfig {
                ansi: false,
                ..config.clone()
            };
            (fmt_layer(&plain, writer), Some(guard))
        },
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;

    Ok(LoggingGuard { _worker: worker })
}

#[cfg(feature = "config")]
impl LogConfig {
    /// Build from the `[logging]` section of the bot configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::UnknownFormat`] for an unrecognized format.
    pub fn from_section(section: &pokedex_config::LoggingSection) -> TelemetryResult<Self> {
        let mut config = Self::new(section.level.to_ascii_lowercase())
            .with_format(section.format.parse()?);
        config.directives.clone_from(&section.directives);
        if let Some(directory) = &section.directory {
            config = config.with_file_logging(directory, "pokedex");
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_compact_stderr_info() {
        let config = LogConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Compact);
        assert_eq!(config.target, LogTarget::Stderr);
        assert!(config.env_override);
    }

    #[test]
    fn format_parses_known_names() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!("full".parse::<LogFormat>().unwrap(), LogFormat::Full);
        assert!(matches!(
            "xml".parse::<LogFormat>(),
            Err(TelemetryError::UnknownFormat(f)) if f == "xml"
        ));
    }

    #[test]
    fn file_logging_disables_ansi() {
        let config = LogConfig::new("debug").with_file_logging("/tmp/logs", "bot");
        assert!(!config.ansi);
        assert_eq!(
            config.target,
            LogTarget::File {
                directory: PathBuf::from("/tmp/logs"),
                prefix: "bot".into(),
            }
        );
    }

    #[test]
    fn serializes_lowercase() {
        let config = LogConfig::new("warn").with_format(LogFormat::Json);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"format\":\"json\""));
        assert!(json.contains("\"target\":\"stderr\""));
    }

    #[test]
    fn filter_accepts_directives() {
        let config = LogConfig::new("debug")
            .without_env_override()
            .with_directive("pokedex_interaction=trace");
        assert!(config.build_filter().is_ok());
    }

    #[test]
    fn filter_rejects_bad_directive() {
        let config = LogConfig::new("debug")
            .without_env_override()
            .with_directive("[invalid=syntax");
        assert!(matches!(
            config.build_filter(),
            Err(TelemetryError::InvalidFilter { directive, .. }) if directive == "[invalid=syntax"
        ));
    }

    #[test]
    fn unwritable_log_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let config = LogConfig::new("info")
            .without_env_override()
            .with_file_logging(blocker.join("logs"), "pokedex");
        assert!(matches!(
            setup_logging(&config),
            Err(TelemetryError::LogDirectory { .. })
        ));
    }

    #[cfg(feature = "config")]
    #[test]
    fn from_section_maps_fields() {
        let section = pokedex_config::LoggingSection {
            level: "DEBUG".into(),
            format: "json".into(),
            directives: vec!["pokedex_discord=trace".into()],
            directory: Some(PathBuf::from("logs")),
        };
        let config = LogConfig::from_section(&section).unwrap();
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.directives, vec!["pokedex_discord=trace"]);
        assert!(matches!(config.target, LogTarget::File { .. }));
    }
}
