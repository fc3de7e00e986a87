//! Discord REST API client.
//!
//! Only command registration goes through REST; interaction replies are
//! returned in the HTTP response of the interactions endpoint.

use pokedex_interaction::types::CommandDefinition;
use reqwest::Method;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{DiscordError, DiscordResult};

/// Base URL for the Discord REST API.
pub const API_BASE: &str = "https://discord.com/api/v10";

/// Where a command set is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandScope<'a> {
    /// All guilds; propagation can take up to an hour.
    Global,
    /// One guild; visible immediately.
    Guild(&'a str),
}

impl CommandScope<'_> {
    /// Scope from an optional guild id.
    #[must_use]
    pub fn from_guild(guild_id: Option<&str>) -> CommandScope<'_> {
        guild_id.map_or(CommandScope::Global, CommandScope::Guild)
    }
}

/// Thin wrapper around the Discord REST API.
pub struct DiscordRest {
    http: reqwest::Client,
    base: String,
    bot_token: String,
    application_id: String,
}

impl DiscordRest {
    /// Create a client for the production API.
    #[must_use]
    pub fn new(bot_token: impl Into<String>, application_id: impl Into<String>) -> Self {
        Self::with_base_url(API_BASE, bot_token, application_id)
    }

    /// Create a client against another base URL.
    #[must_use]
    pub fn with_base_url(
        base: impl Into<String>,
        bot_token: impl Into<String>,
        application_id: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base.into().trim_end_matches('/').to_owned(),
            bot_token: bot_token.into(),
            application_id: application_id.into(),
        }
    }

    /// The application id.
    #[must_use]
    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    // ── Slash Command Registration ───────────────────────────

    /// Replace the registered command set with `commands`.
    ///
    /// Commands previously registered but absent from `commands` are
    /// removed. Returns the number of commands Discord reports back.
    ///
    /// # Errors
    ///
    /// Returns [`DiscordError::Api`] if Discord rejects the set, or a
    /// transport error.
    pub async fn overwrite_commands(
        &self,
        scope: CommandScope<'_>,
        commands: &[CommandDefinition],
    ) -> DiscordResult<usize> {
        let path = match scope {
            CommandScope::Global => format!("/applications/{}/commands", self.application_id),
            CommandScope::Guild(guild) => format!(
                "/applications/{}/guilds/{guild}/commands",
                self.application_id
            ),
        };
        let registered = self.request(Method::PUT, &path, commands).await?;
        let count = registered.as_array().map_or(0, Vec::len);
        info!(?scope, count, "registered application commands");
        Ok(count)
    }

    // ── HTTP Helpers ─────────────────────────────────────────

    async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> DiscordResult<serde_json::Value> {
        let url = format!("{}{path}", self.base);
        debug!(%method, %url, "discord request");
        let resp = self
            .http
            .request(method, &url)
            .header("Authorization", format!("Bot {}", self.bot_token))
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(DiscordError::Api {
                status: status.as_u16(),
                body: text,
            });
        }
        if text.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

impl std::fmt::Debug for DiscordRest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordRest")
            .field("base", &self.base)
            .field("application_id", &self.application_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_from_guild() {
        assert_eq!(CommandScope::from_guild(None), CommandScope::Global);
        assert_eq!(CommandScope::from_guild(Some("9")), CommandScope::Guild("9"));
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let rest = DiscordRest::with_base_url("http://localhost:1/api/", "t", "1");
        assert_eq!(rest.base, "http://localhost:1/api");
    }

    #[test]
    fn debug_hides_token() {
        let rest = DiscordRest::new("secret-token", "42");
        let debug = format!("{rest:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("42"));
    }
}
