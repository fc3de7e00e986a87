//! Slash commands served by the bot.
//!
//! | Command    | Delivery                         |
//! |------------|----------------------------------|
//! | `learnset` | paged, autocompletes `pokemon`   |
//! | `moves`    | paged, autocompletes `pokemon`   |
//! | `dex`      | direct, with follow-up buttons   |
//! | `weak`     | direct, per-field autocomplete   |
//! | `coverage` | direct, per-field autocomplete   |

mod coverage;
mod dex;
mod learnset;
mod matchups;
mod moves;
mod weak;

use std::num::NonZeroU32;
use std::sync::Arc;

use pokedex_config::{CommandsSection, DatasetSection};
use pokedex_interaction::prelude::*;
use pokedex_interaction::{CommandRegistry, RegistryError};

use crate::dex::{Dex, LearnedMove, MAX_NAME_LEN};

/// Reply when a name matches nothing in the dataset.
pub(crate) const NOT_FOUND: &str = "No Pokemon found with that name.";
pub(crate) const NO_MOVE: &str = "No move found with that name.";
pub(crate) const NO_TYPE: &str = "No type found with that name.";

/// Knobs shared by the commands.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Settings {
    pub(crate) page_limit: NonZeroU32,
    pub(crate) autocomplete_limit: usize,
    pub(crate) min_level: u32,
    pub(crate) max_level: u32,
}

impl Settings {
    pub(crate) fn from_config(commands: &CommandsSection, dataset: &DatasetSection) -> Self {
        Self {
            page_limit: NonZeroU32::new(commands.page_limit).unwrap_or(NonZeroU32::MIN),
            autocomplete_limit: usize::try_from(commands.autocomplete_limit).unwrap_or(25),
            min_level: dataset.min_level,
            max_level: dataset.max_level,
        }
    }
}

/// Register every command against `dex`.
pub(crate) fn build_registry(
    data: Arc<dyn Dex>,
    settings: Settings,
) -> Result<CommandRegistry, RegistryError> {
    let mut registry = CommandRegistry::new();
    registry.register(learnset::command(Arc::clone(&data), settings))?;
    registry.register(moves::command(Arc::clone(&data), settings))?;
    registry.register(dex::command(Arc::clone(&data), settings))?;
    registry.register(weak::command(Arc::clone(&data), settings))?;
    registry.register(coverage::command(data, settings))?;
    Ok(registry)
}

// ── Shared rendering ─────────────────────────────────────────

/// An autocompleted name, capped so it always fits in button state.
fn name_option(name: &str, description: &str) -> OptionDefinition {
    OptionDefinition::new(option_type::STRING, name, description)
        .autocomplete()
        .max_length(MAX_NAME_LEN)
}

fn pokemon_option() -> OptionDefinition {
    name_option("pokemon", "Name of the Pokemon").required()
}

fn not_found() -> InteractionCallbackData {
    InteractionCallbackData::text(NOT_FOUND)
}

/// One embed field per move: `Lv. 7  ▸ Ember` over its type, class and stats.
fn move_field(learned: &LearnedMove) -> EmbedField {
    let info = &learned.info;
    let mut values = Vec::with_capacity(5);
    if !info.move_type.is_empty() && info.move_type != "???" {
        values.push(info.move_type.clone());
    }
    values.push(info.damage_class.clone());
    if let Some(power) = info.power {
        values.push(format!("{power} `POWER`"));
    }
    if let Some(accuracy) = info.accuracy {
        values.push(format!("{accuracy}%"));
    }
    if let Some(pp) = info.pp {
        values.push(format!("{pp} `PP`"));
    }
    EmbedField {
        name: format!("Lv. {:<2} ▸ {}", learned.level, info.display_name),
        value: values.join(" ▸ "),
        inline: None,
    }
}

fn moves_embed(title: String, description: Option<String>, rows: &[LearnedMove]) -> Embed {
    Embed {
        title: Some(title),
        description,
        fields: Some(rows.iter().map(move_field).collect()),
        ..Default::default()
    }
}

/// Suggestions for a partially typed Pokemon name.
async fn pokemon_choices(dex: &dyn Dex, prefix: &str, limit: usize) -> InteractionResult<Vec<Choice>> {
    let found = dex
        .search_pokemon(prefix, limit)
        .await
        .map_err(InteractionError::handler)?;
    Ok(found
        .into_iter()
        .map(|p| Choice {
            name: p.display_name,
            value: serde_json::Value::String(p.name),
        })
        .collect())
}

async fn move_choices(dex: &dyn Dex, prefix: &str, limit: usize) -> InteractionResult<Vec<Choice>> {
    let found = dex
        .search_moves(prefix, limit)
        .await
        .map_err(InteractionError::handler)?;
    Ok(found
        .into_iter()
        .map(|m| Choice {
            name: m.display_name,
            value: serde_json::Value::String(m.name),
        })
        .collect())
}

async fn type_choices(dex: &dyn Dex, prefix: &str, limit: usize) -> InteractionResult<Vec<Choice>> {
    let found = dex
        .search_types(prefix, limit)
        .await
        .map_err(InteractionError::handler)?;
    Ok(found
        .into_iter()
        .map(|t| Choice {
            name: t.display_name,
            value: serde_json::Value::String(t.name),
        })
        .collect())
}

/// Attach pagination controls when the result spans more than one page.
fn with_controls<O>(
    ctx: &CommandContext<'_>,
    reply: InteractionCallbackData,
    cursor: &Cursor<O>,
    has_next: bool,
) -> InteractionResult<InteractionCallbackData>
where
    O: serde::Serialize + serde::de::DeserializeOwned + Clone,
{
    Ok(match ctx.page_controls(cursor, has_next)? {
        Some(controls) => reply.with_component(controls.into_action_row()),
        None => reply,
    })
}
