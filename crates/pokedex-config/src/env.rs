//! Environment variable fallbacks.
//!
//! Discord credentials are usually injected by the deployment environment
//! rather than committed to a config file. A variable only fills a field the
//! file left unset; an explicit file value always wins.

use crate::types::{Config, DiscordSection};

type Slot = fn(&mut DiscordSection) -> &mut Option<String>;

/// Fallbacks for `[discord]` fields, as `(env var, field)`.
const DISCORD_ENV_FALLBACKS: &[(&str, Slot)] = &[
    ("DISCORD_BOT_TOKEN", |d| &mut d.bot_token),
    ("DISCORD_APPLICATION_ID", |d| &mut d.application_id),
    ("DISCORD_PUBLIC_KEY", |d| &mut d.public_key),
];

/// Fill unset Discord credentials from `lookup`.
///
/// Returns the number of fields filled.
pub fn apply_env_fallbacks<F>(config: &mut Config, lookup: F) -> usize
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = 0usize;
    for (var, field) in DISCORD_ENV_FALLBACKS {
        let slot = field(&mut config.discord);
        if slot.is_some() {
            continue;
        }
        if let Some(value) = lookup(var).filter(|v| !v.trim().is_empty()) {
            tracing::debug!(var, "discord credential taken from environment");
            *slot = Some(value);
            applied = applied.saturating_add(1);
        }
    }
    applied
}
