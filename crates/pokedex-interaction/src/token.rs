//! State tokens.
//!
//! A state token is the custom identifier attached to a button. It carries
//! everything needed to resume the conversation when the button is pressed,
//! so the bot keeps no session state. Layout, one byte per position:
//!
//! ```text
//! [ '>' len name ]  tag  fingerprint[2]  payload…  nonce[4]
//! ```
//!
//! - The optional route prefix names the command that owns the button when
//!   it is not the command that created the message.
//! - `tag` selects the continuation kind (see [`ActionTag`]).
//! - `fingerprint` is the [`Fingerprint`] of the state type.
//! - `payload` is the state in the binary codec.
//! - `nonce` is four random alphanumerics so identical controls never
//!   collide.
//!
//! Each byte maps to the character with the same code point, so the
//! character count equals the byte count and the platform's 100 character
//! limit can be checked exactly.

use std::fmt;

use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::codec::{self, FINGERPRINT_LEN, Fingerprint};
use crate::error::{
    DecodeError, DecodeResult, EncodeError, EncodeResult, InteractionResult,
    UnrecognizedInteraction,
};

/// Maximum length of a state token, in characters.
pub const TOKEN_BUDGET: usize = 100;

const ROUTE_MARKER: u8 = b'>';
const NONCE_LEN: usize = 4;

/// Continuation kind selected by a token's first significant byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionTag {
    /// Turn the page of a paginated reply.
    Paginate,
    /// Run a command's fresh path with prefilled options.
    FollowUp,
}

impl ActionTag {
    /// Wire byte.
    #[must_use]
    pub const fn byte(self) -> u8 {
        match self {
            Self::Paginate => b'p',
            Self::FollowUp => b'f',
        }
    }

    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'p' => Some(Self::Paginate),
            b'f' => Some(Self::FollowUp),
            _ => None,
        }
    }

    /// Name used in logs and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Paginate => "paginate",
            Self::FollowUp => "follow-up",
        }
    }
}

/// State that can be embedded in a button.
pub trait ButtonState: Serialize + DeserializeOwned {
    /// Tag identifying the continuation kind.
    const TAG: ActionTag;
}

/// An encoded state token, ready to be used as a component's custom id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateToken(String);

impl StateToken {
    /// Encode `state`, optionally routed to another command.
    ///
    /// # Errors
    ///
    /// Returns an [`EncodeError`] if the state cannot be encoded or the
    /// assembled token exceeds [`TOKEN_BUDGET`].
    pub fn encode<S: ButtonState>(state: &S, route: Option<&str>) -> EncodeResult<Self> {
        let fingerprint = Fingerprint::of::<S>()?;
        let payload = codec::to_bytes(state)?;

        let mut bytes = Vec::with_capacity(TOKEN_BUDGET);
        if let Some(name) = route {
            let len = u8::try_from(name.len()).map_err(|_| EncodeError::StringTooLong(name.len()))?;
            bytes.push(ROUTE_MARKER);
            bytes.push(len);
            bytes.extend_from_slice(name.as_bytes());
        }
        bytes.push(S::TAG.byte());
        bytes.extend_from_slice(&fingerprint.bytes());
        bytes.extend_from_slice(&payload);
        bytes.extend(rand::thread_rng().sample_iter(Alphanumeric).take(NONCE_LEN));

        if bytes.len() > TOKEN_BUDGET {
            return Err(EncodeError::TokenTooLong {
                len: bytes.len(),
                budget: TOKEN_BUDGET,
            });
        }
        Ok(Self(bytes.into_iter().map(char::from).collect()))
    }

    /// The token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    /// Always false for a successfully encoded token.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for StateToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<StateToken> for String {
    fn from(token: StateToken) -> Self {
        token.0
    }
}

/// A parsed token whose payload has not been decoded yet.
///
/// The route and tag are needed to pick a handler before the handler's
/// state type is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    route: Option<String>,
    tag: ActionTag,
    fingerprint: [u8; FINGERPRINT_LEN],
    payload: Vec<u8>,
}

impl Envelope {
    /// Split a custom id into its parts.
    ///
    /// # Errors
    ///
    /// Returns [`UnrecognizedInteraction::UnknownActionTag`] for an unknown
    /// tag and a [`DecodeError`] for any malformed layout.
    pub fn parse(custom_id: &str) -> InteractionResult<Self> {
        let bytes = custom_id
            .chars()
            .map(|c| u8::try_from(c).map_err(|_| DecodeError::InvalidTokenChar(c)))
            .collect::<DecodeResult<Vec<u8>>>()?;
        let mut rest = bytes.as_slice();

        let route = match rest {
            [ROUTE_MARKER, len, tail @ ..] => {
                let len = usize::from(*len);
                let name = tail.get(..len).ok_or(DecodeError::Truncated {
                    needed: len,
                    remaining: tail.len(),
                })?;
                let name = std::str::from_utf8(name).map_err(|_| DecodeError::InvalidUtf8)?;
                rest = &tail[len..];
                Some(name.to_owned())
            },
            _ => None,
        };

        let (&tag, tail) = rest.split_first().ok_or(DecodeError::Truncated {
            needed: 1,
            remaining: 0,
        })?;
        let tag = ActionTag::from_byte(tag)
            .ok_or(UnrecognizedInteraction::UnknownActionTag(char::from(tag)))?;

        let framing = FINGERPRINT_LEN.saturating_add(NONCE_LEN);
        let payload_len = tail
            .len()
            .checked_sub(framing)
            .ok_or(DecodeError::Truncated {
                needed: framing,
                remaining: tail.len(),
            })?;
        let (fingerprint, tail) = tail.split_at(FINGERPRINT_LEN);
        let payload = &tail[..payload_len];

        let mut fp = [0u8; FINGERPRINT_LEN];
        fp.copy_from_slice(fingerprint);
        Ok(Self {
            route,
            tag,
            fingerprint: fp,
            payload: payload.to_vec(),
        })
    }

    /// Command named by the route prefix, if any.
    #[must_use]
    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    /// Continuation kind.
    #[must_use]
    pub fn tag(&self) -> ActionTag {
        self.tag
    }

    /// Decode the payload as `S`.
    ///
    /// # Errors
    ///
    /// Fails when the tag or fingerprint does not belong to `S`, or when the
    /// payload does not decode.
    pub fn open<S: ButtonState>(&self) -> DecodeResult<S> {
        if self.tag != S::TAG {
            return Err(DecodeError::Message(format!(
                "token is a {} action, not {}",
                self.tag.as_str(),
                S::TAG.as_str()
            )));
        }
        let expected = Fingerprint::of::<S>()
            .map_err(|err| DecodeError::Message(err.to_string()))?
            .bytes();
        if expected != self.fingerprint {
            return Err(DecodeError::SchemaMismatch {
                expected,
                found: self.fingerprint,
            });
        }
        codec::from_bytes(&self.payload)
    }
}
