//! `/dex pokemon`: a Pokemon's entry, with buttons leading to its moves.

use std::sync::Arc;

use pokedex_interaction::UnrecognizedInteraction;
use pokedex_interaction::prelude::*;
use serde::{Deserialize, Serialize};

use super::learnset::LearnsetOptions;
use super::moves::MovesOptions;
use super::{Settings, not_found, pokemon_choices, pokemon_option};
use crate::dex::{Ability, Dex, Pokemon};

/// Ability and padding fields fill the first embed row.
const HEADER_FIELDS: usize = 3;
const BLANK: &str = "\u{200b}";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct DexOptions {
    pub(crate) pokemon: Option<PokemonLookup>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct PokemonLookup {
    pub(crate) pokemon: Focusable<String>,
}

struct DexEntry {
    dex: Arc<dyn Dex>,
    settings: Settings,
}

pub(super) fn command(dex: Arc<dyn Dex>, settings: Settings) -> Command<DexOptions> {
    let definition = CommandDefinition::new("dex", "Fetch game data for a specified resource")
        .option(
            OptionDefinition::new(option_type::SUB_COMMAND, "pokemon", "Fetch data for a Pokemon")
                .option(pokemon_option()),
        );
    let handler = Arc::new(DexEntry { dex, settings });
    Command::new(definition)
        .handler(Arc::clone(&handler))
        .autocompleter(handler)
}

fn inline(name: impl Into<String>, value: impl Into<String>) -> EmbedField {
    EmbedField {
        name: name.into(),
        value: value.into(),
        inline: Some(true),
    }
}

fn join(abilities: &[&Ability]) -> String {
    abilities
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn entry_fields(pokemon: &Pokemon) -> Vec<EmbedField> {
    let (hidden, visible): (Vec<&Ability>, Vec<&Ability>) =
        pokemon.abilities.iter().partition(|ability| ability.hidden);

    let mut fields = Vec::with_capacity(HEADER_FIELDS.saturating_add(pokemon.stats.len()));
    if !visible.is_empty() {
        fields.push(inline("Abilities", join(&visible)));
    } else if hidden.is_empty() {
        fields.push(inline("Abilities", "_None_"));
    }
    if !hidden.is_empty() {
        fields.push(inline("Hidden Abilities", join(&hidden)));
    }
    while fields.len() < HEADER_FIELDS {
        fields.push(inline(BLANK, BLANK));
    }

    fields.extend(
        pokemon
            .stats
            .iter()
            .map(|stat| inline(stat.name.as_str(), stat.base.to_string())),
    );
    fields
}

impl DexEntry {
    fn follow_ups(
        &self,
        ctx: &CommandContext<'_>,
        pokemon: &Pokemon,
    ) -> InteractionResult<Component> {
        let learnset = ctx.follow_up(
            "learnset",
            LearnsetOptions {
                pokemon: Focusable::new(pokemon.name.clone()),
                ..LearnsetOptions::default()
            },
        )?;
        let moves = ctx.follow_up(
            "moves",
            MovesOptions {
                pokemon: Focusable::new(pokemon.name.clone()),
                level: self.settings.max_level,
            },
        )?;
        Ok(Component::action_row(vec![
            Component::button(button_style::SECONDARY, "Learnset", learnset),
            Component::button(button_style::SECONDARY, "Moves", moves),
        ]))
    }
}

#[async_trait::async_trait]
impl Handle<DexOptions> for DexEntry {
    async fn handle(
        &self,
        ctx: &CommandContext<'_>,
        options: DexOptions,
    ) -> InteractionResult<InteractionCallbackData> {
        let Some(lookup) = options.pokemon else {
            return Err(UnrecognizedInteraction::MissingData("subcommand").into());
        };
        let Some(pokemon) = self
            .dex
            .pokemon(&lookup.pokemon.value)
            .await
            .map_err(InteractionError::handler)?
        else {
            return Ok(not_found());
        };

        let mut title = vec![pokemon.display_name.as_str()];
        title.extend(pokemon.types.iter().map(String::as_str));
        let embed = Embed {
            title: Some(title.join(" ")),
            description: Some(self.dex.generation().to_owned()),
            fields: Some(entry_fields(&pokemon)),
            ..Default::default()
        };

        Ok(InteractionCallbackData::default()
            .with_embed(embed)
            .with_component(self.follow_ups(ctx, &pokemon)?))
    }
}

#[async_trait::async_trait]
impl Autocomplete<DexOptions> for DexEntry {
    async fn autocomplete(
        &self,
        _ctx: &CommandContext<'_>,
        options: DexOptions,
    ) -> InteractionResult<Vec<Choice>> {
        match options.pokemon {
            Some(lookup) if lookup.pokemon.focused => {
                pokemon_choices(
                    self.dex.as_ref(),
                    &lookup.pokemon.value,
                    self.settings.autocomplete_limit,
                )
                .await
            },
            _ => Err(UnrecognizedInteraction::UnrecognizedFocus.into()),
        }
    }
}
