//! Discord interaction wire types.
//!
//! Only the fields the bot reads or writes are modelled. Unknown fields are
//! silently dropped by serde's default deserialization.

use serde::{Deserialize, Serialize};

// ── Constants ───────────────────────────────────────────────

/// Discord interaction type constants.
pub mod interaction_type {
    /// Ping (used for endpoint verification).
    pub const PING: u8 = 1;
    /// Application command (slash command).
    pub const APPLICATION_COMMAND: u8 = 2;
    /// Message component (button, select menu).
    pub const MESSAGE_COMPONENT: u8 = 3;
    /// Partial command input awaiting suggestions.
    pub const APPLICATION_COMMAND_AUTOCOMPLETE: u8 = 4;
    /// Modal submit.
    pub const MODAL_SUBMIT: u8 = 5;

    /// Human-readable name for logging.
    #[must_use]
    pub fn name(kind: u8) -> &'static str {
        match kind {
            PING => "ping",
            APPLICATION_COMMAND => "command",
            MESSAGE_COMPONENT => "component",
            APPLICATION_COMMAND_AUTOCOMPLETE => "autocomplete",
            MODAL_SUBMIT => "modal",
            _ => "unknown",
        }
    }
}

/// Discord interaction callback type constants.
pub mod callback_type {
    /// ACK a ping.
    pub const PONG: u8 = 1;
    /// Respond with a new message.
    pub const CHANNEL_MESSAGE_WITH_SOURCE: u8 = 4;
    /// Replace the message the pressed component belongs to.
    pub const UPDATE_MESSAGE: u8 = 7;
    /// Respond with autocomplete suggestions.
    pub const APPLICATION_COMMAND_AUTOCOMPLETE_RESULT: u8 = 8;
}

/// Component type constants.
pub mod component_type {
    /// Container for up to five buttons.
    pub const ACTION_ROW: u8 = 1;
    /// Clickable button.
    pub const BUTTON: u8 = 2;
}

/// Button style constants.
pub mod button_style {
    /// Blurple.
    pub const PRIMARY: u8 = 1;
    /// Grey.
    pub const SECONDARY: u8 = 2;
}

/// Message flag constants.
pub mod message_flags {
    /// Only the invoking user can see the message.
    pub const EPHEMERAL: u32 = 1 << 6;
}

/// Command option type constants.
pub mod option_type {
    /// Nested subcommand.
    pub const SUB_COMMAND: u8 = 1;
    /// Group of subcommands.
    pub const SUB_COMMAND_GROUP: u8 = 2;
    /// Free text.
    pub const STRING: u8 = 3;
    /// Integer in the 53-bit safe range.
    pub const INTEGER: u8 = 4;
    /// Boolean.
    pub const BOOLEAN: u8 = 5;
    /// User snowflake.
    pub const USER: u8 = 6;
    /// Channel snowflake.
    pub const CHANNEL: u8 = 7;
    /// Role snowflake.
    pub const ROLE: u8 = 8;
    /// User or role snowflake.
    pub const MENTIONABLE: u8 = 9;
    /// Double-precision number.
    pub const NUMBER: u8 = 10;
    /// Attachment snowflake.
    pub const ATTACHMENT: u8 = 11;

    /// Human-readable name used in decode errors.
    #[must_use]
    pub fn name(kind: u8) -> &'static str {
        match kind {
            SUB_COMMAND => "subcommand",
            SUB_COMMAND_GROUP => "subcommand group",
            STRING => "string",
            INTEGER => "integer",
            BOOLEAN => "boolean",
            USER => "user",
            CHANNEL => "channel",
            ROLE => "role",
            MENTIONABLE => "mentionable",
            NUMBER => "number",
            ATTACHMENT => "attachment",
            _ => "unknown",
        }
    }
}

// ── Inbound Types (from Discord) ─────────────────────────────

/// A Discord interaction payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Interaction {
    /// Interaction snowflake.
    pub id: String,
    /// One of [`interaction_type`].
    #[serde(rename = "type")]
    pub interaction_type: u8,
    /// Continuation token for follow-up webhooks.
    pub token: String,
    /// Command or component payload.
    #[serde(default)]
    pub data: Option<InteractionData>,
    /// Invoking member, present in guilds.
    #[serde(default)]
    pub member: Option<GuildMember>,
    /// Invoking user, present in DMs.
    #[serde(default)]
    pub user: Option<User>,
    /// Channel the interaction came from.
    #[serde(default)]
    pub channel_id: Option<String>,
    /// Guild the interaction came from.
    #[serde(default)]
    pub guild_id: Option<String>,
    /// Message the pressed component belongs to.
    #[serde(default)]
    pub message: Option<Message>,
    /// Invoking user's client locale.
    #[serde(default)]
    pub locale: Option<String>,
}

impl Interaction {
    /// Extract the user ID from either `member.user` or top-level `user`.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.member
            .as_ref()
            .and_then(|m| m.user.as_ref())
            .or(self.user.as_ref())
            .map(|u| u.id.as_str())
    }

    /// Name of the command that created the message a component belongs to.
    #[must_use]
    pub fn origin_command(&self) -> Option<&str> {
        self.message
            .as_ref()
            .and_then(|m| m.interaction.as_ref())
            .and_then(|i| i.name.split_whitespace().next())
    }
}

/// Data payload within an interaction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InteractionData {
    /// Command snowflake.
    #[serde(default)]
    pub id: Option<String>,
    /// Command name.
    #[serde(default)]
    pub name: Option<String>,
    /// Command type (1 = chat input).
    #[serde(rename = "type")]
    #[serde(default)]
    pub data_type: Option<u8>,
    /// Option tree supplied by the user.
    #[serde(default)]
    pub options: Vec<CommandOption>,
    /// State token of the pressed component.
    #[serde(default)]
    pub custom_id: Option<String>,
    /// One of [`component_type`].
    #[serde(default)]
    pub component_type: Option<u8>,
}

/// A node of the option tree supplied with a command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandOption {
    /// Option name as registered.
    pub name: String,
    /// One of [`option_type`].
    #[serde(rename = "type")]
    pub option_type: u8,
    /// Scalar value; absent for subcommands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    /// Set on the option the user is typing into during autocomplete.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub focused: bool,
    /// Children of a subcommand or group.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOption>,
}

impl CommandOption {
    /// Number of focused nodes in this subtree.
    #[must_use]
    pub fn focused_count(&self) -> usize {
        let own = usize::from(self.focused);
        self.options
            .iter()
            .fold(own, |acc, child| acc.saturating_add(child.focused_count()))
    }
}

/// A Discord guild member.
#[derive(Debug, Clone, Deserialize)]
pub struct GuildMember {
    /// The member's user record.
    #[serde(default)]
    pub user: Option<User>,
}

/// A Discord user.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    /// User snowflake.
    pub id: String,
    /// Account name.
    #[serde(default)]
    pub username: Option<String>,
}

/// A Discord message.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    /// Message snowflake.
    pub id: String,
    /// Channel the message lives in.
    #[serde(default)]
    pub channel_id: Option<String>,
    /// Text content.
    #[serde(default)]
    pub content: Option<String>,
    /// Interaction that created this message.
    #[serde(default)]
    pub interaction: Option<MessageInteraction>,
}

/// Summary of the interaction that produced a message.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageInteraction {
    /// Interaction snowflake.
    pub id: String,
    /// Interaction type.
    #[serde(rename = "type")]
    pub interaction_type: u8,
    /// Name of the invoked command.
    pub name: String,
}

// ── Outbound Types (to Discord) ──────────────────────────────

/// Interaction callback response body.
#[derive(Debug, Clone, Serialize)]
pub struct InteractionResponse {
    /// One of [`callback_type`].
    #[serde(rename = "type")]
    pub response_type: u8,
    /// Callback payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<InteractionCallbackData>,
}

impl InteractionResponse {
    /// Acknowledge a ping.
    #[must_use]
    pub fn pong() -> Self {
        Self {
            response_type: callback_type::PONG,
            data: None,
        }
    }

    /// Post a new message.
    #[must_use]
    pub fn message(data: InteractionCallbackData) -> Self {
        Self {
            response_type: callback_type::CHANNEL_MESSAGE_WITH_SOURCE,
            data: Some(data),
        }
    }

    /// Replace the message a pressed component belongs to.
    #[must_use]
    pub fn update(data: InteractionCallbackData) -> Self {
        Self {
            response_type: callback_type::UPDATE_MESSAGE,
            data: Some(data),
        }
    }

    /// Offer autocomplete suggestions.
    #[must_use]
    pub fn choices(choices: Vec<Choice>) -> Self {
        Self {
            response_type: callback_type::APPLICATION_COMMAND_AUTOCOMPLETE_RESULT,
            data: Some(InteractionCallbackData {
                choices: Some(choices),
                ..Default::default()
            }),
        }
    }
}

/// Data for an interaction callback.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InteractionCallbackData {
    /// Text content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Up to ten embeds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embeds: Option<Vec<Embed>>,
    /// Action rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<Component>>,
    /// Bitset of [`message_flags`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u32>,
    /// Autocomplete suggestions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Choice>>,
}

impl InteractionCallbackData {
    /// A plain text message.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    /// A plain text message only the invoking user can see.
    #[must_use]
    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            flags: Some(message_flags::EPHEMERAL),
            ..Default::default()
        }
    }

    /// Append an embed.
    #[must_use]
    pub fn with_embed(mut self, embed: Embed) -> Self {
        self.embeds.get_or_insert_with(Vec::new).push(embed);
        self
    }

    /// Append a component row.
    #[must_use]
    pub fn with_component(mut self, component: Component) -> Self {
        self.components.get_or_insert_with(Vec::new).push(component);
        self
    }
}

/// An embed object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Embed {
    /// Heading.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Body text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Sidebar colour.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    /// Key/value fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<EmbedField>>,
    /// Small image in the corner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedImage>,
    /// Footer text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
}

/// An embed field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedField {
    /// Field label.
    pub name: String,
    /// Field value.
    pub value: String,
    /// Render side by side with neighbours.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline: Option<bool>,
}

/// An embed image reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedImage {
    /// Image URL.
    pub url: String,
}

/// An embed footer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedFooter {
    /// Footer text.
    pub text: String,
}

/// A message component (action row or button).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    /// One of [`component_type`].
    #[serde(rename = "type")]
    pub component_type: u8,
    /// Children of an action row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<Component>>,
    /// One of [`button_style`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<u8>,
    /// Button label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// State token carried back on press.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    /// Greyed out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

impl Component {
    /// An action row holding `components`.
    #[must_use]
    pub fn action_row(components: Vec<Component>) -> Self {
        Self {
            component_type: component_type::ACTION_ROW,
            components: Some(components),
            style: None,
            label: None,
            custom_id: None,
            disabled: None,
        }
    }

    /// A button carrying a state token.
    #[must_use]
    pub fn button(style: u8, label: impl Into<String>, custom_id: impl Into<String>) -> Self {
        Self {
            component_type: component_type::BUTTON,
            components: None,
            style: Some(style),
            label: Some(label.into()),
            custom_id: Some(custom_id.into()),
            disabled: None,
        }
    }

    /// Grey the button out.
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = Some(disabled);
        self
    }
}

/// An autocomplete suggestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Choice {
    /// Label shown to the user.
    pub name: String,
    /// Value submitted when picked.
    pub value: serde_json::Value,
}

impl Choice {
    /// A suggestion whose label and value are the same string.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            name: value.clone(),
            value: serde_json::Value::String(value),
        }
    }
}

/// Slash command definition for registration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandDefinition {
    /// Command name, unique per application.
    pub name: String,
    /// Help text.
    pub description: String,
    /// Top-level options.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionDefinition>,
}

impl CommandDefinition {
    /// A command with no options.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            options: Vec::new(),
        }
    }

    /// Append an option.
    #[must_use]
    pub fn option(mut self, option: OptionDefinition) -> Self {
        self.options.push(option);
        self
    }
}

/// Slash command option definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionDefinition {
    /// Option name.
    pub name: String,
    /// Help text.
    pub description: String,
    /// One of [`option_type`].
    #[serde(rename = "type")]
    pub option_type: u8,
    /// Whether the user must supply it.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    /// Whether the bot supplies suggestions.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub autocomplete: bool,
    /// Lower bound for numeric options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<i64>,
    /// Upper bound for numeric options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<i64>,
    /// Longest accepted string, in characters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u16>,
    /// Fixed set of accepted values.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    /// Children of a subcommand or group.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionDefinition>,
}

impl OptionDefinition {
    /// An optional option of the given type.
    #[must_use]
    pub fn new(option_type: u8, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            option_type,
            required: false,
            autocomplete: false,
            min_value: None,
            max_value: None,
            max_length: None,
            choices: Vec::new(),
            options: Vec::new(),
        }
    }

    /// Mark as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Enable autocomplete.
    #[must_use]
    pub fn autocomplete(mut self) -> Self {
        self.autocomplete = true;
        self
    }

    /// Constrain a numeric option.
    #[must_use]
    pub fn range(mut self, min: i64, max: i64) -> Self {
        self.min_value = Some(min);
        self.max_value = Some(max);
        self
    }

    /// Cap the length of a string option.
    #[must_use]
    pub fn max_length(mut self, max: u16) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Restrict to a fixed choice.
    #[must_use]
    pub fn choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }

    /// Append a child option.
    #[must_use]
    pub fn option(mut self, option: OptionDefinition) -> Self {
        self.options.push(option);
        self
    }
}
