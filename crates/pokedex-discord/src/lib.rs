#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Discord platform layer for the Pokedex bot.
//!
//! - [`DiscordRest`]: bulk-overwrites the application's slash commands.
//! - [`RequestVerifier`]: checks the Ed25519 signature on inbound requests.
//! - [`router`] / [`serve`]: the HTTP interactions endpoint, handing
//!   verified interactions to a [`pokedex_interaction::Dispatcher`].

pub mod error;
pub mod rest;
pub mod server;
pub mod verify;

pub use error::{DiscordError, DiscordResult, VerifyError};
pub use rest::{API_BASE, CommandScope, DiscordRest};
pub use server::{ServerConfig, router, serve};
pub use verify::{RequestVerifier, SIGNATURE_HEADER, TIMESTAMP_HEADER};
