//! Configuration types for the Pokedex bot.
//!
//! Every struct implements [`Default`] with working values so that a bare
//! `[section]` header, or no file at all, produces a usable configuration
//! (apart from Discord credentials, which have no sensible default).

use std::path::PathBuf;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Discord application credentials and registration scope.
    pub discord: DiscordSection,
    /// Command behaviour.
    pub commands: CommandsSection,
    /// Interactions endpoint.
    pub server: ServerSection,
    /// Pokemon data snapshot.
    pub dataset: DatasetSection,
    /// Logging level, format, and per-crate directives.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// DiscordSection
// ---------------------------------------------------------------------------

/// Discord application settings.
///
/// `bot_token`, `application_id` and `public_key` fall back to the
/// `DISCORD_BOT_TOKEN`, `DISCORD_APPLICATION_ID` and `DISCORD_PUBLIC_KEY`
/// environment variables when unset.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DiscordSection {
    /// Bot token used for REST calls. Prefer the environment variable.
    pub bot_token: Option<String>,
    /// Application snowflake.
    pub application_id: Option<String>,
    /// Hex-encoded Ed25519 key used to verify interaction signatures.
    pub public_key: Option<String>,
    /// Register commands in this guild only (instant) instead of globally.
    pub guild_id: Option<String>,
    /// Overwrite the registered command set on startup.
    pub register_commands: bool,
}

impl Default for DiscordSection {
    fn default() -> Self {
        Self {
            bot_token: None,
            application_id: None,
            public_key: None,
            guild_id: None,
            register_commands: true,
        }
    }
}

impl DiscordSection {
    /// The bot token, required for command registration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] if unset or blank.
    pub fn require_bot_token(&self) -> ConfigResult<&str> {
        require(self.bot_token.as_deref(), "discord.bot_token", "DISCORD_BOT_TOKEN")
    }

    /// The application id, required for command registration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] if unset or blank.
    pub fn require_application_id(&self) -> ConfigResult<&str> {
        require(
            self.application_id.as_deref(),
            "discord.application_id",
            "DISCORD_APPLICATION_ID",
        )
    }

    /// The interaction verification key, required to serve.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] if unset or blank.
    pub fn require_public_key(&self) -> ConfigResult<&str> {
        require(self.public_key.as_deref(), "discord.public_key", "DISCORD_PUBLIC_KEY")
    }
}

fn require<'a>(
    value: Option<&'a str>,
    field: &'static str,
    env: &'static str,
) -> ConfigResult<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingCredential { field, env })
}

impl std::fmt::Debug for DiscordSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordSection")
            .field("has_bot_token", &self.bot_token.is_some())
            .field("application_id", &self.application_id)
            .field("has_public_key", &self.public_key.is_some())
            .field("guild_id", &self.guild_id)
            .field("register_commands", &self.register_commands)
            .finish()
    }
}

impl Serialize for DiscordSection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("DiscordSection", 4)?;
        // bot_token is omitted; the public key is not secret.
        state.serialize_field("application_id", &self.application_id)?;
        state.serialize_field("public_key", &self.public_key)?;
        state.serialize_field("guild_id", &self.guild_id)?;
        state.serialize_field("register_commands", &self.register_commands)?;
        state.end()
    }
}

// ---------------------------------------------------------------------------
// CommandsSection
// ---------------------------------------------------------------------------

/// Command behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandsSection {
    /// Rows per page of a paginated reply.
    pub page_limit: u32,
    /// Maximum autocomplete suggestions (Discord caps this at 25).
    pub autocomplete_limit: u32,
}

impl Default for CommandsSection {
    fn default() -> Self {
        Self {
            page_limit: 15,
            autocomplete_limit: 25,
        }
    }
}

// ---------------------------------------------------------------------------
// ServerSection
// ---------------------------------------------------------------------------

/// Interactions endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Socket address to listen on.
    pub bind: String,
    /// Path Discord posts interactions to.
    pub path: String,
    /// Largest accepted request body, in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_owned(),
            path: "/interactions".to_owned(),
            max_body_bytes: 65_536,
        }
    }
}

// ---------------------------------------------------------------------------
// DatasetSection
// ---------------------------------------------------------------------------

/// Pokemon data snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetSection {
    /// JSON snapshot loaded once at startup.
    pub path: PathBuf,
    /// Lowest level a Pokemon can be.
    pub min_level: u32,
    /// Highest level a Pokemon can be.
    pub max_level: u32,
}

impl Default for DatasetSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/pokedex.json"),
            min_level: 1,
            max_level: 100,
        }
    }
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging and tracing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"`, `"full"` or `"json"`.
    pub format: String,
    /// Per-crate tracing directives (e.g. `["pokedex_interaction=debug"]`).
    pub directives: Vec<String>,
    /// Write daily-rotated log files to this directory instead of stderr.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
            directory: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.commands.page_limit, 15);
        assert_eq!(config.commands.autocomplete_limit, 25);
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.dataset.max_level, 100);
        assert!(config.discord.register_commands);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            [commands]
            page_limit = 10

            [discord]
            guild_id = "1234"
            "#,
        )
        .unwrap();
        assert_eq!(config.commands.page_limit, 10);
        assert_eq!(config.commands.autocomplete_limit, 25);
        assert_eq!(config.discord.guild_id.as_deref(), Some("1234"));
    }

    #[test]
    fn discord_debug_redacts_token() {
        let section = DiscordSection {
            bot_token: Some("super-secret-token".into()),
            ..Default::default()
        };
        let debug = format!("{section:?}");
        assert!(!debug.contains("super-secret-token"));
        assert!(debug.contains("has_bot_token: true"));
    }

    #[test]
    fn discord_serialize_omits_token() {
        let section = DiscordSection {
            bot_token: Some("super-secret-token".into()),
            application_id: Some("42".into()),
            ..Default::default()
        };
        let json = serde_json::to_string(&section).unwrap();
        assert!(!json.contains("super-secret-token"));
        assert!(!json.contains("bot_token"));
        assert!(json.contains("\"application_id\":\"42\""));
    }

    #[test]
    fn blank_credentials_are_missing() {
        let section = DiscordSection {
            public_key: Some("   ".into()),
            application_id: Some("42".into()),
            ..Default::default()
        };
        assert!(matches!(
            section.require_public_key(),
            Err(ConfigError::MissingCredential { env: "DISCORD_PUBLIC_KEY", .. })
        ));
        assert!(section.require_bot_token().is_err());
        assert_eq!(section.require_application_id().unwrap(), "42");
    }
}
