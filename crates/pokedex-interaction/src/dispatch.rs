//! Interaction dispatcher.
//!
//! Routes each inbound interaction to the owning command and turns the
//! outcome into a callback response:
//!
//! | interaction          | handler path                         | callback            |
//! |----------------------|--------------------------------------|---------------------|
//! | ping                 | none                                 | pong                |
//! | slash command        | direct handler, or pager at page one | new message         |
//! | autocomplete         | autocompleter                        | suggestions         |
//! | button, pagination   | pager at the decoded cursor          | update in place     |
//! | button, follow-up    | fresh path of the target command     | new message         |
//!
//! Failures are logged. Commands and buttons get a short ephemeral apology;
//! autocomplete failures get no response at all.

use std::sync::Arc;

use tracing::Instrument;

use crate::command::{CommandContext, CommandHandler, Delivery};
use crate::error::{InteractionError, InteractionResult, UnrecognizedInteraction};
use crate::registry::CommandRegistry;
use crate::token::{ActionTag, Envelope};
use crate::types::{
    Interaction, InteractionCallbackData, InteractionData, InteractionResponse, component_type,
    interaction_type,
};

/// Shown to the user when a command or button fails.
pub const APOLOGY: &str = "Sorry, something went wrong while handling that. Please try again.";

/// Routes interactions to registered commands.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
}

impl Dispatcher {
    /// Dispatcher over a populated registry.
    #[must_use]
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    /// The underlying registry.
    #[must_use]
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Handle one interaction.
    ///
    /// Returns `None` when no response should be sent.
    pub async fn dispatch(&self, interaction: &Interaction) -> Option<InteractionResponse> {
        let kind = interaction.interaction_type;
        let span = tracing::info_span!(
            "interaction",
            id = %interaction.id,
            kind = interaction_type::name(kind),
            command = tracing::field::Empty,
        );

        async move {
            match self.route(interaction).await {
                Ok(delivery) => Some(delivery.into()),
                Err(err) => {
                    report(&err);
                    if kind == interaction_type::APPLICATION_COMMAND_AUTOCOMPLETE {
                        None
                    } else {
                        Some(InteractionResponse::message(
                            InteractionCallbackData::ephemeral(APOLOGY),
                        ))
                    }
                },
            }
        }
        .instrument(span)
        .await
    }

    async fn route(&self, interaction: &Interaction) -> InteractionResult<Delivery> {
        match interaction.interaction_type {
            interaction_type::PING => Ok(Delivery::Pong),
            interaction_type::APPLICATION_COMMAND => {
                let (command, data) = self.command_for(interaction)?;
                let ctx = CommandContext::new(interaction, command.name(), None);
                command
                    .invoke(&ctx, &data.options)
                    .await
                    .map(Delivery::Message)
            },
            interaction_type::APPLICATION_COMMAND_AUTOCOMPLETE => {
                let (command, data) = self.command_for(interaction)?;
                let ctx = CommandContext::new(interaction, command.name(), None);
                command
                    .autocomplete(&ctx, &data.options)
                    .await
                    .map(Delivery::Choices)
            },
            interaction_type::MESSAGE_COMPONENT => self.press(interaction).await,
            other => Err(UnrecognizedInteraction::InteractionType(other).into()),
        }
    }

    fn lookup(&self, name: &str) -> Result<&dyn CommandHandler, UnrecognizedInteraction> {
        tracing::Span::current().record("command", name);
        self.registry
            .get(name)
            .ok_or_else(|| UnrecognizedInteraction::UnknownCommand(name.to_string()))
    }

    fn command_for<'i>(
        &self,
        interaction: &'i Interaction,
    ) -> Result<(&dyn CommandHandler, &'i InteractionData), UnrecognizedInteraction> {
        let data = interaction
            .data
            .as_ref()
            .ok_or(UnrecognizedInteraction::MissingData("data"))?;
        let name = data
            .name
            .as_deref()
            .ok_or(UnrecognizedInteraction::MissingData("command name"))?;
        Ok((self.lookup(name)?, data))
    }

    async fn press(&self, interaction: &Interaction) -> InteractionResult<Delivery> {
        let data = interaction
            .data
            .as_ref()
            .ok_or(UnrecognizedInteraction::MissingData("data"))?;
        match data.component_type {
            Some(component_type::BUTTON) => {},
            Some(other) => return Err(UnrecognizedInteraction::ComponentType(other).into()),
            None => return Err(UnrecognizedInteraction::MissingData("component type").into()),
        }
        let custom_id = data
            .custom_id
            .as_deref()
            .ok_or(UnrecognizedInteraction::MissingData("custom id"))?;

        let envelope = Envelope::parse(custom_id)?;
        let name = match envelope.route() {
            Some(name) => name,
            None => interaction
                .origin_command()
                .ok_or(UnrecognizedInteraction::MissingData("message interaction"))?,
        };
        let command = self.lookup(name)?;

        // A follow-up posts a fresh message that does not resolve back to
        // its command on its own.
        let route = match envelope.tag() {
            ActionTag::Paginate => envelope.route(),
            ActionTag::FollowUp => Some(command.name()),
        };
        tracing::debug!(action = envelope.tag().as_str(), "resuming from button");

        let ctx = CommandContext::new(interaction, command.name(), route);
        command.resume(&ctx, &envelope).await
    }
}

fn report(err: &InteractionError) {
    match err {
        InteractionError::Unrecognized(e) => {
            tracing::error!(error = %e, "unrecognized interaction");
        },
        InteractionError::Decode(e) => {
            tracing::warn!(error = %e, "failed to decode interaction");
        },
        InteractionError::Encode(e) => {
            tracing::error!(error = %e, "failed to build response controls");
        },
        InteractionError::Handler(e) => {
            tracing::error!(error = %e, "command handler failed");
        },
    }
}
