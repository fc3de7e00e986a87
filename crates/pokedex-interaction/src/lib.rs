#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Stateless interaction protocol for the Pokedex bot.
//!
//! Everything a multi-step conversation needs (which page, which options,
//! which command) travels inside the buttons themselves as a
//! [`StateToken`]. This crate provides:
//!
//! - a compact binary state codec ([`codec`]),
//! - an option decoder mapping Discord's option tree onto typed structs
//!   ([`decode_options`], [`Focusable`]),
//! - pagination controls ([`PageControls`]),
//! - a command registry and dispatcher ([`CommandRegistry`], [`Dispatcher`]),
//! - the Discord wire types the above speak ([`types`]).

pub mod codec;
pub mod command;
pub mod dispatch;
pub mod error;
pub mod options;
pub mod paging;
pub mod registry;
pub mod token;
pub mod types;

pub use command::{
    Autocomplete, Command, CommandContext, CommandHandler, CommandOptions, Delivery, Handle,
    Paginate,
};
pub use dispatch::Dispatcher;
pub use error::{
    DecodeError, DecodeResult, EncodeError, EncodeResult, InteractionError, InteractionResult,
    RegistryError, UnrecognizedInteraction,
};
pub use options::{Focusable, decode_options};
pub use paging::{Continuation, Control, Cursor, FollowUp, Page, PageControls};
pub use registry::CommandRegistry;
pub use token::{ActionTag, ButtonState, Envelope, StateToken, TOKEN_BUDGET};

/// Commonly used items for command implementations.
pub mod prelude {
    pub use crate::command::{Autocomplete, Command, CommandContext, Handle, Paginate};
    pub use crate::error::{InteractionError, InteractionResult};
    pub use crate::options::Focusable;
    pub use crate::paging::{Cursor, Page};
    pub use crate::types::{
        Choice, CommandDefinition, Component, Embed, EmbedField, InteractionCallbackData,
        OptionDefinition, button_style, option_type,
    };
}
