//! Config file discovery and loading.
//!
//! [`load`] resolves a single config file:
//! 1. The explicit path, if one was given (it must exist).
//! 2. `./pokedex.toml` in the working directory.
//! 3. `config.toml` in the platform config directory
//!    (e.g. `~/.config/pokedex/config.toml`).
//!
//! If none exists the built-in defaults are used. Environment fallbacks are
//! applied afterwards, then the result is validated.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::apply_env_fallbacks;
use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;
use crate::validate;

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "pokedex.toml";

/// Load configuration using the standard discovery order and the process
/// environment.
///
/// # Errors
///
/// Returns a [`ConfigError`] if a config file is unreadable or malformed,
/// if an explicit path does not exist, or if validation fails.
pub fn load(explicit: Option<&Path>) -> ConfigResult<Config> {
    let candidates = match explicit {
        Some(path) => vec![path.to_path_buf()],
        None => default_candidates(),
    };
    load_from(explicit.is_some(), &candidates, |key| std::env::var(key).ok())
}

/// Load from the first existing candidate, with an injectable environment.
///
/// When `required` is set, the first candidate must exist.
///
/// # Errors
///
/// See [`load`].
pub fn load_from<F>(required: bool, candidates: &[PathBuf], lookup: F) -> ConfigResult<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let found = match (required, candidates.first()) {
        (true, Some(path)) => Some((load_file_unvalidated(path)?, path)),
        _ => first_existing(candidates)?,
    };
    let mut config = match found {
        Some((config, path)) => {
            info!(path = %path.display(), "loaded config");
            config
        },
        None => {
            debug!("no config file found, using defaults");
            Config::default()
        },
    };

    let applied = apply_env_fallbacks(&mut config, lookup);
    if applied > 0 {
        debug!(count = applied, "applied environment variable fallbacks");
    }

    validate::validate(&config)?;
    Ok(config)
}

/// Load and validate a config from a specific file path.
///
/// No environment fallbacks are applied.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed or validated.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let config = load_file_unvalidated(path)?;
    validate::validate(&config)?;
    Ok(config)
}

fn first_existing(candidates: &[PathBuf]) -> ConfigResult<Option<(Config, &PathBuf)>> {
    for path in candidates {
        if let Some(config) = try_load_file(path)? {
            return Ok(Some((config, path)));
        }
    }
    Ok(None)
}

fn load_file_unvalidated(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse(path, &content)
}

/// Try to load a file, returning `None` if it doesn't exist.
///
/// Reads once and checks the size afterwards so there is no gap between a
/// metadata check and the read.
fn try_load_file(path: &Path) -> ConfigResult<Option<Config>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: e,
            });
        },
    };
    parse(path, &content).map(Some)
}

fn parse(path: &Path, content: &str) -> ConfigResult<Config> {
    if content.len() as u64 > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {MAX_CONFIG_FILE_SIZE} byte limit",
                content.len(),
            ),
        });
    }
    toml::from_str(content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })
}

/// The implicit search path: working directory, then the user config dir.
#[must_use]
pub fn default_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
    if let Some(dirs) = directories::ProjectDirs::from("", "", "pokedex") {
        candidates.push(dirs.config_dir().join("config.toml"));
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn missing_candidates_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_from(false, &[dir.path().join("absent.toml")], no_env).unwrap();
        assert_eq!(config.commands.page_limit, 15);
    }

    #[test]
    fn first_existing_candidate_wins() {
        let dir = tempfile::tempdir().unwrap();
        let second = write(dir.path(), "b.toml", "[commands]\npage_limit = 5\n");
        let third = write(dir.path(), "c.toml", "[commands]\npage_limit = 9\n");
        let config = load_from(
            false,
            &[dir.path().join("a.toml"), second, third],
            no_env,
        )
        .unwrap();
        assert_eq!(config.commands.page_limit, 5);
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_from(true, &[dir.path().join("nope.toml")], no_env).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "bad.toml", "[commands\npage_limit = ");
        let err = load_from(false, &[path], no_env).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn invalid_values_rejected_after_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "c.toml", "[commands]\npage_limit = 0\n");
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn oversized_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let padding = "#".repeat(1_048_577);
        let path = write(dir.path(), "big.toml", &padding);
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn env_fills_credentials_missing_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "c.toml",
            "[discord]\napplication_id = \"111\"\n",
        );
        let config = load_from(true, &[path], |key| match key {
            "DISCORD_APPLICATION_ID" => Some("222".into()),
            "DISCORD_PUBLIC_KEY" => Some("ab".repeat(32)),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.discord.application_id.as_deref(), Some("111"));
        assert_eq!(config.discord.public_key.as_deref(), Some("ab".repeat(32).as_str()));
    }

    #[test]
    fn default_candidates_start_local() {
        let candidates = default_candidates();
        assert_eq!(candidates[0], PathBuf::from(LOCAL_CONFIG_FILE));
    }
}
