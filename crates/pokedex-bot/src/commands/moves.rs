//! `/moves`: the moves a Pokemon knows at a given level.

use std::sync::Arc;

use pokedex_interaction::UnrecognizedInteraction;
use pokedex_interaction::prelude::*;
use serde::{Deserialize, Serialize};

use super::{Settings, moves_embed, not_found, pokemon_choices, pokemon_option, with_controls};
use crate::dex::Dex;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct MovesOptions {
    pub(crate) pokemon: Focusable<String>,
    pub(crate) level: u32,
}

struct Moves {
    dex: Arc<dyn Dex>,
    settings: Settings,
}

pub(super) fn command(dex: Arc<dyn Dex>, settings: Settings) -> Command<MovesOptions> {
    let definition = CommandDefinition::new("moves", "Get the moveset of a Pokemon at a level")
        .option(pokemon_option())
        .option(
            OptionDefinition::new(option_type::INTEGER, "level", "Level of the Pokemon")
                .required()
                .range(i64::from(settings.min_level), i64::from(settings.max_level)),
        );
    let handler = Arc::new(Moves { dex, settings });
    Command::new(definition)
        .pager(Arc::clone(&handler), settings.page_limit)
        .autocompleter(handler)
}

#[async_trait::async_trait]
impl Paginate<MovesOptions> for Moves {
    async fn paginate(
        &self,
        ctx: &CommandContext<'_>,
        mut cursor: Cursor<MovesOptions>,
    ) -> InteractionResult<InteractionCallbackData> {
        let Some(pokemon) = self
            .dex
            .pokemon(&cursor.options.pokemon.value)
            .await
            .map_err(InteractionError::handler)?
        else {
            return Ok(not_found());
        };
        cursor.options.pokemon = Focusable::new(pokemon.name.clone());
        let options = &cursor.options;

        let (rows, has_next) = self
            .dex
            .moveset(&pokemon.name, options.level, cursor.page)
            .await
            .map_err(InteractionError::handler)?;

        let embed = moves_embed(
            format!("{}, {}", pokemon.display_name, self.dex.generation()),
            Some(format!("Lv. {}", options.level)),
            &rows,
        );
        let reply = InteractionCallbackData::default().with_embed(embed);
        with_controls(ctx, reply, &cursor, has_next)
    }
}

#[async_trait::async_trait]
impl Autocomplete<MovesOptions> for Moves {
    async fn autocomplete(
        &self,
        _ctx: &CommandContext<'_>,
        options: MovesOptions,
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
