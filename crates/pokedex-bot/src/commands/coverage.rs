//! `/coverage`: the offensive type chart of a move or a type.

use std::sync::Arc;

use pokedex_interaction::UnrecognizedInteraction;
use pokedex_interaction::prelude::*;
use serde::{Deserialize, Serialize};

use super::matchups::{ChartLabels, chart_fields};
use super::{NO_MOVE, NO_TYPE, Settings, move_choices, name_option, type_choices};
use crate::dex::Dex;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct CoverageOptions {
    #[serde(rename = "move")]
    pub(crate) attack: Option<MoveLookup>,
    #[serde(rename = "type")]
    pub(crate) attacker: Option<TypeLookup>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct MoveLookup {
    #[serde(rename = "move")]
    pub(crate) name: Focusable<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct TypeLookup {
    #[serde(rename = "type")]
    pub(crate) name: Focusable<String>,
}

struct Coverage {
    dex: Arc<dyn Dex>,
    settings: Settings,
}

pub(super) fn command(dex: Arc<dyn Dex>, settings: Settings) -> Command<CoverageOptions> {
    let definition = CommandDefinition::new(
        "coverage",
        "View type chart for an attacking move/type combination.",
    )
    .option(
        OptionDefinition::new(
            option_type::SUB_COMMAND,
            "move",
            "View type chart for an attacking move",
        )
        .option(name_option("move", "Name of the move").required()),
    )
    .option(
        OptionDefinition::new(
            option_type::SUB_COMMAND,
            "type",
            "View type chart for an attacking type",
        )
        .option(name_option("type", "Name of the type").required()),
    );
    let handler = Arc::new(Coverage { dex, settings });
    Command::new(definition)
        .handler(Arc::clone(&handler))
        .autocompleter(handler)
}

#[async_trait::async_trait]
impl Handle<CoverageOptions> for Coverage {
    async fn handle(
        &self,
        _ctx: &CommandContext<'_>,
        options: CoverageOptions,
    ) -> InteractionResult<InteractionCallbackData> {
        let (mut title, type_name) = match (options.attack, options.attacker) {
            (Some(lookup), None) => {
                let Some(found) = self
                    .dex
                    .find_move(&lookup.name.value)
                    .await
                    .map_err(InteractionError::handler)?
                else {
                    return Ok(InteractionCallbackData::text(NO_MOVE));
                };
                (vec![found.display_name], found.move_type)
            },
            (None, Some(lookup)) => (Vec::with_capacity(1), lookup.name.value),
            _ => return Err(UnrecognizedInteraction::MissingData("subcommand").into()),
        };

        let Some(attacker) = self
            .dex
            .find_type(&type_name)
            .await
            .map_err(InteractionError::handler)?
        else {
            return Ok(InteractionCallbackData::text(NO_TYPE));
        };
        let efficacies = self
            .dex
            .attacking(&attacker.name)
            .await
            .map_err(InteractionError::handler)?;
        title.push(attacker.display_name);

        Ok(InteractionCallbackData::default().with_embed(Embed {
            title: Some(title.join(" ")),
            description: Some("Offensive type chart".to_owned()),
            fields: Some(chart_fields(&efficacies, &ChartLabels::OFFENSIVE)),
            ..Default::default()
        }))
    }
}

#[async_trait::async_trait]
impl Autocomplete<CoverageOptions> for Coverage {
    async fn autocomplete(
        &self,
        _ctx: &CommandContext<'_>,
        options: CoverageOptions,
    ) -> InteractionResult<Vec<Choice>> {
        let limit = self.settings.autocomplete_limit;
        match (options.attack, options.attacker) {
            (Some(lookup), _) if lookup.name.focused => {
                move_choices(self.dex.as_ref(), &lookup.name.value, limit).await
            },
            (_, Some(lookup)) if lookup.name.focused => {
                type_choices(self.dex.as_ref(), &lookup.name.value, limit).await
            },
            _ => Err(UnrecognizedInteraction::UnrecognizedFocus.into()),
        }
    }
}
