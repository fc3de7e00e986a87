//! `/learnset`: every move a Pokemon learns, one page of fields at a time.

use std::sync::Arc;

use pokedex_interaction::UnrecognizedInteraction;
use pokedex_interaction::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Settings, moves_embed, not_found, pokemon_choices, pokemon_option, with_controls};
use crate::dex::{Dex, LearnsetFilter};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct LearnsetOptions {
    pub(crate) pokemon: Focusable<String>,
    pub(crate) max_level: Option<u32>,
    pub(crate) egg_moves: Option<bool>,
}

struct Learnset {
    dex: Arc<dyn Dex>,
    settings: Settings,
}

pub(super) fn command(dex: Arc<dyn Dex>, settings: Settings) -> Command<LearnsetOptions> {
    let definition = CommandDefinition::new("learnset", "Get the learnset for a Pokemon")
        .option(pokemon_option())
        .option(
            OptionDefinition::new(
                option_type::INTEGER,
                "max_level",
                "Maximum level of moves to include",
            )
            .range(i64::from(settings.min_level), i64::from(settings.max_level)),
        )
        .option(OptionDefinition::new(
            option_type::BOOLEAN,
            "egg_moves",
            "Include egg moves",
        ));
    let handler = Arc::new(Learnset { dex, settings });
    Command::new(definition)
        .pager(Arc::clone(&handler), settings.page_limit)
        .autocompleter(handler)
}

#[async_trait::async_trait]
impl Paginate<LearnsetOptions> for Learnset {
    async fn paginate(
        &self,
        ctx: &CommandContext<'_>,
        mut cursor: Cursor<LearnsetOptions>,
    ) -> InteractionResult<InteractionCallbackData> {
        let Some(pokemon) = self
            .dex
            .pokemon(&cursor.options.pokemon.value)
            .await
            .map_err(InteractionError::handler)?
        else {
            debug!(name = %cursor.options.pokemon.value, "learnset for unknown pokemon");
            return Ok(not_found());
        };
        // Page buttons carry the dataset key, not whatever was typed.
        cursor.options.pokemon = Focusable::new(pokemon.name.clone());
        let options = &cursor.options;

        let filter = LearnsetFilter {
            max_level: options.max_level.unwrap_or(self.settings.max_level),
            egg_moves: options.egg_moves.unwrap_or(false),
        };
        let (rows, has_next) = self
            .dex
            .learnset(&pokemon.name, filter, cursor.page)
            .await
            .map_err(InteractionError::handler)?;

        let embed = moves_embed(
            format!("{}, {}", pokemon.display_name, self.dex.generation()),
            options.max_level.map(|level| format!("Max Lv. {level}")),
            &rows,
        );
        let reply = InteractionCallbackData::default().with_embed(embed);
        with_controls(ctx, reply, &cursor, has_next)
    }
}

#[async_trait::async_trait]
impl Autocomplete<LearnsetOptions> for Learnset {
    async fn autocomplete(
        &self,
        _ctx: &CommandContext<'_>,
        options: LearnsetOptions,
    ) -> InteractionResult<Vec<Choice>> {
        if !options.pokemon.focused {
            return Err(UnrecognizedInteraction::UnrecognizedFocus.into());
        }
        pokemon_choices(
            self.dex.as_ref(),
            &options.pokemon.value,
            self.settings.autocomplete_limit,
        )
        .await
    }
}
