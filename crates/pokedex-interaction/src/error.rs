//! Error taxonomy for the interaction protocol.
//!
//! Decoding failures, encoding failures and integration faults are kept
//! apart so the dispatcher can decide what (if anything) the end user sees.

use std::fmt::Display;

use serde::{de, ser};
use thiserror::Error;

/// Malformed, truncated or schema-mismatched input.
///
/// Produced by the binary state codec, the option decoder and token
/// parsing. Always recoverable; never shown verbatim to the end user.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Input ended before the declared structure was complete.
    #[error("truncated input: needed {needed} more byte(s), {remaining} remaining")]
    Truncated {
        /// Bytes required by the next value.
        needed: usize,
        /// Bytes left in the input.
        remaining: usize,
    },

    /// Bytes were left over after the declared structure was decoded.
    #[error("{0} trailing byte(s) after payload")]
    TrailingBytes(usize),

    /// A presence flag or boolean byte was neither 0 nor 1.
    #[error("invalid flag byte {0:#04x}")]
    InvalidFlag(u8),

    /// A string payload was not valid UTF-8.
    #[error("string payload is not valid UTF-8")]
    InvalidUtf8,

    /// A token contained a character outside the single-byte range.
    #[error("token character {0:?} is outside the byte range")]
    InvalidTokenChar(char),

    /// The token was issued for a different state shape.
    #[error("schema fingerprint mismatch: expected {expected:02x?}, found {found:02x?}")]
    SchemaMismatch {
        /// Fingerprint of the receiving type.
        expected: [u8; 2],
        /// Fingerprint carried by the token.
        found: [u8; 2],
    },

    /// A decoded page carried a zero limit.
    #[error("page limit must be positive")]
    ZeroPageLimit,

    /// The option tree named an option the schema does not declare.
    #[error("unexpected option name {0:?}")]
    UnknownOption(String),

    /// An option's declared type does not match the field it targets.
    #[error("unexpected type {found} for option {option:?}, expected {expected}")]
    TypeMismatch {
        /// Wire name of the option.
        option: String,
        /// Kind the target field expects.
        expected: &'static str,
        /// Kind the platform declared.
        found: &'static str,
    },

    /// A scalar option node arrived without a value.
    #[error("option {0:?} has no value")]
    MissingValue(String),

    /// A required option was absent from the tree.
    #[error("missing option {0:?}")]
    MissingOption(&'static str),

    /// The target type uses a shape the protocol does not carry.
    #[error("unsupported shape: {0}")]
    Unsupported(&'static str),

    /// Any other error raised by generated deserialization code.
    #[error("{0}")]
    Message(String),
}

impl de::Error for DecodeError {
    fn custom<T: Display>(msg: T) -> Self {
        Self::Message(msg.to_string())
    }

    fn missing_field(field: &'static str) -> Self {
        Self::MissingOption(field)
    }

    fn unknown_field(field: &str, _expected: &'static [&'static str]) -> Self {
        Self::UnknownOption(field.to_owned())
    }
}

/// A value that cannot be turned into a state token.
///
/// Raised while controls are constructed, before any token is issued.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Strings carry a one-byte length prefix.
    #[error("string of {0} bytes exceeds the 255 byte limit")]
    StringTooLong(usize),

    /// Integers are carried as 4-byte signed values.
    #[error("integer {0} does not fit in 32 bits")]
    IntegerOutOfRange(i128),

    /// The value uses a shape the protocol does not carry.
    #[error("unsupported shape: {0}")]
    Unsupported(&'static str),

    /// The serialized token exceeds the platform's identifier budget.
    #[error("state token is {len} characters, exceeding the {budget} character budget")]
    TokenTooLong {
        /// Length of the assembled token.
        len: usize,
        /// Configured budget.
        budget: usize,
    },

    /// Any other error raised by generated serialization code.
    #[error("{0}")]
    Message(String),
}

impl ser::Error for EncodeError {
    fn custom<T: Display>(msg: T) -> Self {
        Self::Message(msg.to_string())
    }
}

/// An integration fault: the request cannot be routed to any handler.
#[derive(Debug, Error)]
pub enum UnrecognizedInteraction {
    /// The interaction type is not one the dispatcher serves.
    #[error("unhandled interaction type {0}")]
    InteractionType(u8),

    /// No command is registered under this name.
    #[error("unknown command {0:?}")]
    UnknownCommand(String),

    /// The command exists but lacks the capability the request needs.
    #[error("command {command:?} has no {capability} handler")]
    MissingHandler {
        /// Command name.
        command: String,
        /// Capability that was requested.
        capability: &'static str,
    },

    /// The state token starts with an action tag nobody understands.
    #[error("unknown button action {0:?}")]
    UnknownActionTag(char),

    /// Only buttons carry state tokens.
    #[error("unhandled component type {0}")]
    ComponentType(u8),

    /// Autocomplete requires exactly one focused option.
    #[error("expected exactly one focused option, found {0}")]
    FocusedCount(usize),

    /// The focused option is not one the handler completes.
    #[error("no recognized field in focus")]
    UnrecognizedFocus,

    /// A field the request kind requires was absent from the payload.
    #[error("interaction payload is missing {0}")]
    MissingData(&'static str),
}

/// Top-level error for dispatching one interaction.
#[derive(Debug, Error)]
pub enum InteractionError {
    /// Request payload or state token could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A control could not be built.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The request could not be routed.
    #[error(transparent)]
    Unrecognized(#[from] UnrecognizedInteraction),

    /// A handler's collaborator failed.
    #[error("handler failed: {0}")]
    Handler(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl InteractionError {
    /// Wrap a collaborator failure raised inside a handler.
    pub fn handler<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Handler(err.into())
    }
}

/// Errors raised while populating the command registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two commands share a name.
    #[error("command {0:?} is already registered")]
    Duplicate(String),

    /// A command's options type cannot be carried in a state token.
    #[error("command {command:?} has an unsupported options schema: {source}")]
    Schema {
        /// Command name.
        command: String,
        /// Underlying encoding failure.
        #[source]
        source: EncodeError,
    },
}

/// Result alias for decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Result alias for encoding.
pub type EncodeResult<T> = Result<T, EncodeError>;

/// Result alias for dispatch and handlers.
pub type InteractionResult<T> = Result<T, InteractionError>;
