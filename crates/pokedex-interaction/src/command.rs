//! Commands and their handler capabilities.
//!
//! A [`Command`] binds a registration definition to an options type and up
//! to three capabilities: a direct [`Handle`]r, a [`Paginate`]r with a page
//! limit, and an [`Autocomplete`]r. It erases its options type behind the
//! [`CommandHandler`] trait so commands with different option shapes can
//! share one registry.

use std::num::NonZeroU32;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::codec::Fingerprint;
use crate::error::{
    DecodeError, EncodeResult, InteractionResult, UnrecognizedInteraction,
};
use crate::options::{decode_options, focused_count};
use crate::paging::{Continuation, Cursor, FollowUp, PageControls};
use crate::token::{Envelope, StateToken};
use crate::types::{
    Choice, CommandDefinition, CommandOption, Interaction, InteractionCallbackData,
    InteractionResponse,
};

/// Bounds every options type must satisfy.
pub trait CommandOptions: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

impl<T> CommandOptions for T where T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

/// Per-request context handed to handlers.
#[derive(Debug, Clone, Copy)]
pub struct CommandContext<'a> {
    interaction: &'a Interaction,
    command: &'a str,
    route: Option<&'a str>,
}

impl<'a> CommandContext<'a> {
    /// Context for `command` handling `interaction`.
    ///
    /// `route` is the prefix controls rendered by this invocation must
    /// carry to come back to `command`; `None` when the message being
    /// produced already resolves to it.
    #[must_use]
    pub fn new(interaction: &'a Interaction, command: &'a str, route: Option<&'a str>) -> Self {
        Self {
            interaction,
            command,
            route,
        }
    }

    /// The raw interaction.
    #[must_use]
    pub fn interaction(&self) -> &'a Interaction {
        self.interaction
    }

    /// Name of the command being run.
    #[must_use]
    pub fn command(&self) -> &'a str {
        self.command
    }

    /// Route prefix for controls that return to this command.
    #[must_use]
    pub fn route(&self) -> Option<&'a str> {
        self.route
    }

    /// Invoking user's ID.
    #[must_use]
    pub fn user_id(&self) -> Option<&'a str> {
        self.interaction.user_id()
    }

    /// Pagination controls for `cursor`, routed back to this command.
    ///
    /// # Errors
    ///
    /// Propagates token encoding failures.
    pub fn page_controls<O>(
        &self,
        cursor: &Cursor<O>,
        has_next: bool,
    ) -> EncodeResult<Option<PageControls>>
    where
        O: Serialize + DeserializeOwned + Clone,
    {
        PageControls::derive(cursor, has_next, self.route)
    }

    /// A token that runs `target` with `options` when pressed.
    ///
    /// # Errors
    ///
    /// Propagates token encoding failures.
    pub fn follow_up<O>(&self, target: &str, options: O) -> EncodeResult<StateToken>
    where
        O: Serialize + DeserializeOwned,
    {
        let route = if target == self.command {
            self.route
        } else {
            Some(target)
        };
        StateToken::encode(&FollowUp { options }, route)
    }
}

/// Runs a command directly from its decoded options.
#[async_trait::async_trait]
pub trait Handle<O>: Send + Sync {
    /// Produce the reply.
    async fn handle(
        &self,
        ctx: &CommandContext<'_>,
        options: O,
    ) -> InteractionResult<InteractionCallbackData>;
}

/// Produces one page of a paginated reply.
#[async_trait::async_trait]
pub trait Paginate<O>: Send + Sync {
    /// Produce the page the cursor points at, including its controls.
    async fn paginate(
        &self,
        ctx: &CommandContext<'_>,
        cursor: Cursor<O>,
    ) -> InteractionResult<InteractionCallbackData>;
}

/// Suggests values for the focused option.
#[async_trait::async_trait]
pub trait Autocomplete<O>: Send + Sync {
    /// Produce suggestions; exactly one option in `options` is focused.
    async fn autocomplete(
        &self,
        ctx: &CommandContext<'_>,
        options: O,
    ) -> InteractionResult<Vec<Choice>>;
}

/// How a handler's output reaches the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// Acknowledge a ping.
    Pong,
    /// Post a new message.
    Message(InteractionCallbackData),
    /// Replace the message the pressed button belongs to.
    Update(InteractionCallbackData),
    /// Offer autocomplete suggestions.
    Choices(Vec<Choice>),
}

impl From<Delivery> for InteractionResponse {
    fn from(delivery: Delivery) -> Self {
        match delivery {
            Delivery::Pong => Self::pong(),
            Delivery::Message(data) => Self::message(data),
            Delivery::Update(data) => Self::update(data),
            Delivery::Choices(choices) => Self::choices(choices),
        }
    }
}

/// A registered command with its options type erased.
#[async_trait::async_trait]
pub trait CommandHandler: Send + Sync {
    /// Registration definition.
    fn definition(&self) -> &CommandDefinition;

    /// Command name.
    fn name(&self) -> &str {
        &self.definition().name
    }

    /// Verify the options type can be carried in state tokens.
    ///
    /// # Errors
    ///
    /// Returns the encoding failure for unsupported shapes.
    fn check_schema(&self) -> EncodeResult<()>;

    /// Run the fresh path for a slash command.
    async fn invoke(
        &self,
        ctx: &CommandContext<'_>,
        options: &[CommandOption],
    ) -> InteractionResult<InteractionCallbackData>;

    /// Produce autocomplete suggestions.
    async fn autocomplete(
        &self,
        ctx: &CommandContext<'_>,
        options: &[CommandOption],
    ) -> InteractionResult<Vec<Choice>>;

    /// Continue from a pressed button.
    async fn resume(
        &self,
        ctx: &CommandContext<'_>,
        envelope: &Envelope,
    ) -> InteractionResult<Delivery>;
}

/// A command bound to the options type `O`.
pub struct Command<O> {
    definition: CommandDefinition,
    handler: Option<Arc<dyn Handle<O>>>,
    pager: Option<(Arc<dyn Paginate<O>>, u32)>,
    autocompleter: Option<Arc<dyn Autocomplete<O>>>,
}

impl<O: CommandOptions> Command<O> {
    /// A command with no capabilities yet.
    #[must_use]
    pub fn new(definition: CommandDefinition) -> Self {
        Self {
            definition,
            handler: None,
            pager: None,
            autocompleter: None,
        }
    }

    /// Attach a direct handler. Takes precedence over the pager on the
    /// fresh path.
    #[must_use]
    pub fn handler<H: Handle<O> + 'static>(mut self, handler: Arc<H>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Attach a paging handler showing `limit` rows per page.
    #[must_use]
    pub fn pager<P: Paginate<O> + 'static>(mut self, pager: Arc<P>, limit: NonZeroU32) -> Self {
        self.pager = Some((pager, limit.get()));
        self
    }

    /// Attach an autocompleter.
    #[must_use]
    pub fn autocompleter<A: Autocomplete<O> + 'static>(mut self, autocompleter: Arc<A>) -> Self {
        self.autocompleter = Some(autocompleter);
        self
    }

    fn missing(&self, capability: &'static str) -> UnrecognizedInteraction {
        UnrecognizedInteraction::MissingHandler {
            command: self.definition.name.clone(),
            capability,
        }
    }

    /// The fresh path: direct handler if present, otherwise the first page.
    async fn run(
        &self,
        ctx: &CommandContext<'_>,
        options: O,
    ) -> InteractionResult<InteractionCallbackData> {
        if let Some(handler) = &self.handler {
            return handler.handle(ctx, options).await;
        }
        if let Some((pager, limit)) = &self.pager {
            return pager.paginate(ctx, Cursor::first(options, *limit)).await;
        }
        Err(self.missing("command").into())
    }
}

#[async_trait::async_trait]
impl<O: CommandOptions> CommandHandler for Command<O> {
    fn definition(&self) -> &CommandDefinition {
        &self.definition
    }

    fn check_schema(&self) -> EncodeResult<()> {
        Fingerprint::of::<Cursor<O>>()?;
        Fingerprint::of::<FollowUp<O>>()?;
        Ok(())
    }

    async fn invoke(
        &self,
        ctx: &CommandContext<'_>,
        options: &[CommandOption],
    ) -> InteractionResult<InteractionCallbackData> {
        let options = decode_options::<O>(options)?;
        self.run(ctx, options).await
    }

    async fn autocomplete(
        &self,
        ctx: &CommandContext<'_>,
        options: &[CommandOption],
    ) -> InteractionResult<Vec<Choice>> {
        let completer = self
            .autocompleter
            .as_ref()
            .ok_or_else(|| self.missing("autocomplete"))?;
        let focused = focused_count(options);
        if focused != 1 {
            return Err(UnrecognizedInteraction::FocusedCount(focused).into());
        }
        let options = decode_options::<O>(options)?;
        completer.autocomplete(ctx, options).await
    }

    async fn resume(
        &self,
        ctx: &CommandContext<'_>,
        envelope: &Envelope,
    ) -> InteractionResult<Delivery> {
        match Continuation::<O>::open(envelope)? {
            Continuation::Paginate(cursor) => {
                let (pager, _) = self.pager.as_ref().ok_or_else(|| self.missing("pagination"))?;
                if cursor.page.limit == 0 {
                    return Err(DecodeError::ZeroPageLimit.into());
                }
                Ok(Delivery::Update(pager.paginate(ctx, cursor).await?))
            },
            Continuation::FollowUp(state) => Ok(Delivery::Message(self.run(ctx, state.options).await?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::options::Focusable;
    use crate::types::interaction_type;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Lookup {
        pokemon: Focusable<String>,
    }

    struct Echo;

    #[async_trait::async_trait]
    impl Handle<Lookup> for Echo {
        async fn handle(
            &self,
            _ctx: &CommandContext<'_>,
            options: Lookup,
        ) -> InteractionResult<InteractionCallbackData> {
            Ok(InteractionCallbackData::text(format!("direct {}", options.pokemon.value)))
        }
    }

    struct Pages;

    #[async_trait::async_trait]
    impl Paginate<Lookup> for Pages {
        async fn paginate(
            &self,
            _ctx: &CommandContext<'_>,
            cursor: Cursor<Lookup>,
        ) -> InteractionResult<InteractionCallbackData> {
            Ok(InteractionCallbackData::text(format!(
                "page {} of {}",
                cursor.page.offset, cursor.options.pokemon.value
            )))
        }
    }

    #[async_trait::async_trait]
    impl Autocomplete<Lookup> for Pages {
        async fn autocomplete(
            &self,
            _ctx: &CommandContext<'_>,
            options: Lookup,
        ) -> InteractionResult<Vec<Choice>> {
            Ok(vec![Choice::string(format!("{}saur", options.pokemon.value))])
        }
    }

    fn interaction() -> Interaction {
        serde_json::from_value(json!({
            "id": "1",
            "type": interaction_type::APPLICATION_COMMAND,
            "token": "t"
        }))
        .unwrap()
    }

    fn options(value: serde_json::Value) -> Vec<CommandOption> {
        serde_json::from_value(value).unwrap()
    }

    fn limit() -> NonZeroU32 {
        NonZeroU32::new(15).unwrap()
    }

    fn definition() -> CommandDefinition {
        CommandDefinition::new("learnset", "Moves a Pokemon can learn")
    }

    #[tokio::test]
    async fn direct_handler_wins_on_fresh_path() {
        let command = Command::<Lookup>::new(definition())
            .handler(Arc::new(Echo))
            .pager(Arc::new(Pages), limit());
        let interaction = interaction();
        let ctx = CommandContext::new(&interaction, "learnset", None);
        let reply = command
            .invoke(&ctx, &options(json!([{ "name": "pokemon", "type": 3, "value": "Mew" }])))
            .await
            .unwrap();
        assert_eq!(reply.content.as_deref(), Some("direct Mew"));
    }

    #[tokio::test]
    async fn pager_starts_at_offset_zero() {
        let command = Command::<Lookup>::new(definition()).pager(Arc::new(Pages), limit());
        let interaction = interaction();
        let ctx = CommandContext::new(&interaction, "learnset", None);
        let reply = command
            .invoke(&ctx, &options(json!([{ "name": "pokemon", "type": 3, "value": "Mew" }])))
            .await
            .unwrap();
        assert_eq!(reply.content.as_deref(), Some("page 0 of Mew"));
    }

    #[tokio::test]
    async fn command_without_handlers_is_unrecognized() {
        let command = Command::<Lookup>::new(definition());
        let interaction = interaction();
        let ctx = CommandContext::new(&interaction, "learnset", None);
        let err = command.invoke(&ctx, &[]).await.unwrap_err();
        assert!(matches!(
            err,
            crate::InteractionError::Unrecognized(UnrecognizedInteraction::MissingHandler { .. })
        ));
    }

    #[tokio::test]
    async fn autocomplete_requires_single_focus() {
        let command = Command::<Lookup>::new(definition()).autocompleter(Arc::new(Pages));
        let interaction = interaction();
        let ctx = CommandContext::new(&interaction, "learnset", None);

        let err = command
            .autocomplete(&ctx, &options(json!([{ "name": "pokemon", "type": 3, "value": "Bulba" }])))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::InteractionError::Unrecognized(UnrecognizedInteraction::FocusedCount(0))
        ));

        let choices = command
            .autocomplete(
                &ctx,
                &options(json!([{ "name": "pokemon", "type": 3, "value": "Bulba", "focused": true }])),
            )
            .await
            .unwrap();
        assert_eq!(choices, vec![Choice::string("Bulbasaur")]);
    }

    #[tokio::test]
    async fn autocomplete_without_completer_is_unrecognized() {
        let command = Command::<Lookup>::new(definition()).handler(Arc::new(Echo));
        let interaction = interaction();
        let ctx = CommandContext::new(&interaction, "learnset", None);
        let err = command.autocomplete(&ctx, &[]).await.unwrap_err();
        assert!(matches!(err, crate::InteractionError::Unrecognized(_)));
    }

    #[tokio::test]
    async fn resume_pagination_updates_in_place() {
        let command = Command::<Lookup>::new(definition()).pager(Arc::new(Pages), limit());
        let interaction = interaction();
        let ctx = CommandContext::new(&interaction, "learnset", None);
        let cursor = Cursor {
            options: Lookup {
                pokemon: Focusable::new("Mew".into()),
            },
            page: crate::paging::Page {
                limit: 15,
                offset: 30,
            },
        };
        let token = StateToken::encode(&cursor, None).unwrap();
        let envelope = Envelope::parse(token.as_str()).unwrap();
        let delivery = command.resume(&ctx, &envelope).await.unwrap();
        assert_eq!(
            delivery,
            Delivery::Update(InteractionCallbackData::text("page 30 of Mew"))
        );
    }

    #[tokio::test]
    async fn resume_rejects_zero_limit() {
        let command = Command::<Lookup>::new(definition()).pager(Arc::new(Pages), limit());
        let interaction = interaction();
        let ctx = CommandContext::new(&interaction, "learnset", None);
        let cursor = Cursor::first(Lookup::default(), 0);
        let token = StateToken::encode(&cursor, None).unwrap();
        let envelope = Envelope::parse(token.as_str()).unwrap();
        let err = command.resume(&ctx, &envelope).await.unwrap_err();
        assert!(matches!(
            err,
            crate::InteractionError::Decode(DecodeError::ZeroPageLimit)
        ));
    }

    #[tokio::test]
    async fn resume_follow_up_posts_new_message() {
        let command = Command::<Lookup>::new(definition()).pager(Arc::new(Pages), limit());
        let interaction = interaction();
        let ctx = CommandContext::new(&interaction, "dex", None);
        let token = ctx
            .follow_up(
                "learnset",
                Lookup {
                    pokemon: Focusable::new("Eevee".into()),
                },
            )
            .unwrap();
        let envelope = Envelope::parse(token.as_str()).unwrap();
        assert_eq!(envelope.route(), Some("learnset"));

        let ctx = CommandContext::new(&interaction, "learnset", Some("learnset"));
        let delivery = command.resume(&ctx, &envelope).await.unwrap();
        assert_eq!(
            delivery,
            Delivery::Message(InteractionCallbackData::text("page 0 of Eevee"))
        );
    }

    #[test]
    fn follow_up_to_self_keeps_route() {
        let interaction = interaction();
        let ctx = CommandContext::new(&interaction, "learnset", None);
        let token = ctx.follow_up("learnset", Lookup::default()).unwrap();
        let envelope = Envelope::parse(token.as_str()).unwrap();
        assert_eq!(envelope.route(), None);
    }

    #[test]
    fn schema_check_rejects_floats() {
        #[derive(Debug, Clone, Serialize, Deserialize)]
        struct Weighted {
            weight: f64,
        }
        let command = Command::<Weighted>::new(definition());
        assert!(command.check_schema().is_err());

        let command = Command::<Lookup>::new(definition());
        assert!(command.check_schema().is_ok());
    }
}
