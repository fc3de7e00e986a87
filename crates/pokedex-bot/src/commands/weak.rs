//! `/weak`: the defensive type chart of a Pokemon or a type combination.

use std::sync::Arc;

use pokedex_interaction::UnrecognizedInteraction;
use pokedex_interaction::prelude::*;
use serde::{Deserialize, Serialize};

use super::dex::PokemonLookup;
use super::matchups::{ChartLabels, chart_fields};
use super::{
    NO_TYPE, Settings, name_option, not_found, pokemon_choices, pokemon_option, type_choices,
};
use crate::dex::Dex;

/// Exactly one subcommand is populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct WeakOptions {
    pub(crate) pokemon: Option<PokemonLookup>,
    #[serde(rename = "type")]
    pub(crate) types: Option<TypeCombo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct TypeCombo {
    pub(crate) type_1: Focusable<String>,
    pub(crate) type_2: Option<Focusable<String>>,
}

struct Weak {
    dex: Arc<dyn Dex>,
    settings: Settings,
}

pub(super) fn command(dex: Arc<dyn Dex>, settings: Settings) -> Command<WeakOptions> {
    let definition = CommandDefinition::new(
        "weak",
        "View type chart against a defending Pokemon/type combination.",
    )
    .option(
        OptionDefinition::new(
            option_type::SUB_COMMAND,
            "pokemon",
            "View type chart against a defending Pokemon",
        )
        .option(pokemon_option()),
    )
    .option(
        OptionDefinition::new(
            option_type::SUB_COMMAND,
            "type",
            "View type chart against a defending type (combination)",
        )
        .option(name_option("type_1", "Name of the first type").required())
        .option(name_option("type_2", "Name of the second type")),
    );
    let handler = Arc::new(Weak { dex, settings });
    Command::new(definition)
        .handler(Arc::clone(&handler))
        .autocompleter(handler)
}

#[async_trait::async_trait]
impl Handle<WeakOptions> for Weak {
    async fn handle(
        &self,
        _ctx: &CommandContext<'_>,
        options: WeakOptions,
    ) -> InteractionResult<InteractionCallbackData> {
        let (title, types) = match (options.pokemon, options.types) {
            (Some(lookup), None) => {
                let Some(pokemon) = self
                    .dex
                    .pokemon(&lookup.pokemon.value)
                    .await
                    .map_err(InteractionError::handler)?
                else {
                    return Ok(not_found());
                };
                let mut title = vec![pokemon.display_name];
                title.extend(pokemon.types.iter().cloned());
                (title, pokemon.types)
            },
            (None, Some(combo)) => {
                let mut types = Vec::with_capacity(2);
                for name in std::iter::once(&combo.type_1).chain(combo.type_2.as_ref()) {
                    let Some(found) = self
                        .dex
                        .find_type(&name.value)
                        .await
                        .map_err(InteractionError::handler)?
                    else {
                        return Ok(InteractionCallbackData::text(NO_TYPE));
                    };
                    types.push(found);
                }
                (
                    types.iter().map(|t| t.display_name.clone()).collect(),
                    types.into_iter().map(|t| t.name).collect(),
                )
            },
            _ => return Err(UnrecognizedInteraction::MissingData("subcommand").into()),
        };

        let efficacies = self
            .dex
            .defending(&types)
            .await
            .map_err(InteractionError::handler)?;
        Ok(InteractionCallbackData::default().with_embed(Embed {
            title: Some(title.join(" ")),
            description: Some("Defensive type chart".to_owned()),
            fields: Some(chart_fields(&efficacies, &ChartLabels::DEFENSIVE)),
            ..Default::default()
        }))
    }
}

#[async_trait::async_trait]
impl Autocomplete<WeakOptions> for Weak {
    async fn autocomplete(
        &self,
        _ctx: &CommandContext<'_>,
        options: WeakOptions,
    ) -> InteractionResult<Vec<Choice>> {
        let limit = self.settings.autocomplete_limit;
        match (options.pokemon, options.types) {
            (Some(lookup), _) if lookup.pokemon.focused => {
                pokemon_choices(self.dex.as_ref(), &lookup.pokemon.value, limit).await
            },
            (_, Some(combo)) => {
                let focused = if combo.type_1.focused {
                    combo.type_1
                } else {
                    combo
                        .type_2
                        .filter(|t| t.focused)
                        .ok_or(UnrecognizedInteraction::UnrecognizedFocus)?
                };
                type_choices(self.dex.as_ref(), &focused.value, limit).await
            },
            _ => Err(UnrecognizedInteraction::UnrecognizedFocus.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use pokedex_interaction::decode_options;
    use pokedex_interaction::types::CommandOption;
    use serde_json::{Value, json};

    use super::*;
    use crate::commands::NOT_FOUND;
    use crate::commands::testing::{autocomplete, command, dispatcher, field_names, send};

    fn by_type(options: Value) -> Value {
        json!([{ "name": "type", "type": 1, "options": options }])
    }

    #[test]
    fn only_the_invoked_subcommand_is_populated() {
        let tree: Vec<CommandOption> = serde_json::from_value(by_type(json!([
            { "name": "type_1", "type": 3, "value": "fire" }
        ])))
        .unwrap();
        let options: WeakOptions = decode_options(&tree).unwrap();
        assert!(options.pokemon.is_none());
        let combo = options.types.unwrap();
        assert_eq!(combo.type_1.value, "fire");
        assert!(combo.type_2.is_none());

        let tree: Vec<CommandOption> = serde_json::from_value(json!([{
            "name": "pokemon", "type": 1,
            "options": [{ "name": "pokemon", "type": 3, "value": "pikachu" }]
        }]))
        .unwrap();
        let options: WeakOptions = decode_options(&tree).unwrap();
        assert!(options.types.is_none());
        assert_eq!(options.pokemon.unwrap().pokemon.value, "pikachu");
    }

    #[tokio::test]
    async fn pokemon_chart_combines_both_types() {
        let dispatcher = dispatcher();
        let response = send(
            &dispatcher,
            &command(
                "weak",
                json!([{
                    "name": "pokemon", "type": 1,
                    "options": [{ "name": "pokemon", "type": 3, "value": "Bulbasaur" }]
                }]),
            ),
        )
        .await;
        let embed = &response["data"]["embeds"][0];
        assert_eq!(embed["title"], "Bulbasaur Grass Poison");
        assert_eq!(embed["description"], "Defensive type chart");
        assert_eq!(
            field_names(&response),
            ["Weaknesses (2x)", "Resistances (0.5x)", "Resistances (0.25x)"]
        );
        assert_eq!(embed["fields"][0]["value"], "Fire Ice Flying Psychic");
        assert_eq!(embed["fields"][2]["value"], "Grass");
    }

    #[tokio::test]
    async fn type_pair_chart_includes_quadruple_and_immunities() {
        let dispatcher = dispatcher();
        let response = send(
            &dispatcher,
            &command(
                "weak",
                by_type(json!([
                    { "name": "type_1", "type": 3, "value": "grass" },
                    { "name": "type_2", "type": 3, "value": "Flying" }
                ])),
            ),
        )
        .await;
        let embed = &response["data"]["embeds"][0];
        assert_eq!(embed["title"], "Grass Flying");
        assert_eq!(embed["fields"][0]["name"], "Weaknesses (4x)");
        assert_eq!(embed["fields"][0]["value"], "Ice");
        assert_eq!(field_names(&response).last().unwrap(), "Immunities");
    }

    #[tokio::test]
    async fn single_type_and_unknowns() {
        let dispatcher = dispatcher();
        let response = send(
            &dispatcher,
            &command("weak", by_type(json!([{ "name": "type_1", "type": 3, "value": "ghost" }]))),
        )
        .await;
        assert_eq!(response["data"]["embeds"][0]["title"], "Ghost");

        let response = send(
            &dispatcher,
            &command(
                "weak",
                by_type(json!([
                    { "name": "type_1", "type": 3, "value": "ghost" },
                    { "name": "type_2", "type": 3, "value": "shadow" }
                ])),
            ),
        )
        .await;
        assert_eq!(response["data"]["content"], NO_TYPE);

        let response = send(
            &dispatcher,
            &command(
                "weak",
                json!([{
                    "name": "pokemon", "type": 1,
                    "options": [{ "name": "pokemon", "type": 3, "value": "agumon" }]
                }]),
            ),
        )
        .await;
        assert_eq!(response["data"]["content"], NOT_FOUND);
    }

    #[tokio::test]
    async fn autocomplete_follows_focus_to_second_type() {
        let dispatcher = dispatcher();
        let response = send(
            &dispatcher,
            &autocomplete(
                "weak",
                by_type(json!([
                    { "name": "type_1", "type": 3, "value": "fire" },
                    { "name": "type_2", "type": 3, "value": "dr", "focused": true }
                ])),
            ),
        )
        .await;
        let choices = response["data"]["choices"].as_array().unwrap();
        assert_eq!(choices.len(), 1);
        assert_eq!(choices[0]["name"], "Dragon");
        assert_eq!(choices[0]["value"], "dragon");

        let response = send(
            &dispatcher,
            &autocomplete(
                "weak",
                by_type(json!([{ "name": "type_1", "type": 3, "value": "f", "focused": true }])),
            ),
        )
        .await;
        let names: Vec<_> = response["data"]["choices"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["Fairy", "Fighting", "Fire", "Flying"]);
    }

    #[tokio::test]
    async fn autocomplete_without_focus_sends_nothing() {
        let dispatcher = dispatcher();
        let response = dispatcher
            .dispatch(&autocomplete(
                "weak",
                by_type(json!([
                    { "name": "type_1", "type": 3, "value": "fire" },
                    { "name": "type_2", "type": 3, "value": "ice" }
                ])),
            ))
            .await;
        assert!(response.is_none());
    }
}
