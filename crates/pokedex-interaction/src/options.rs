//! Option decoder.
//!
//! Maps the option tree Discord sends with a command onto a typed struct.
//! Each field's wire name is its serde name (`#[serde(rename = "...")]`
//! overrides it). Decoding is strict:
//!
//! - an option whose name the struct does not declare is an error,
//! - an option whose declared type does not match the field is an error,
//! - a field with no matching option is left to serde: `Option<T>` fields
//!   become `None`; other fields need `#[serde(default)]` on the container,
//!   which is recommended for every options struct since autocomplete
//!   requests omit whatever the user has not typed yet.
//!
//! Subcommands and subcommand groups decode into nested structs (usually
//! wrapped in `Option`). Wrap a field in [`Focusable`] to learn whether the
//! user is currently typing into it.

use serde::de::value::{BoolDeserializer, StrDeserializer};
use serde::de::{
    DeserializeOwned, DeserializeSeed, Deserializer, IntoDeserializer, MapAccess, Visitor,
};
use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, DecodeResult};
use crate::types::{CommandOption, option_type};

/// Struct name [`Focusable`] announces to deserializers.
const FOCUSABLE: &str = "$pokedex::Focusable";
const FOCUSABLE_FIELDS: &[&str] = &["value", "focused"];

/// A decoded option together with its autocomplete focus flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "$pokedex::Focusable")]
pub struct Focusable<T> {
    /// The option's value.
    pub value: T,
    /// Whether the user is typing into this option.
    pub focused: bool,
}

impl<T> Focusable<T> {
    /// An unfocused value.
    pub fn new(value: T) -> Self {
        Self {
            value,
            focused: false,
        }
    }
}

/// Decode an option tree into `T`.
///
/// # Errors
///
/// Returns a [`DecodeError`] on unknown option names, type mismatches and
/// missing required fields.
pub fn decode_options<T: DeserializeOwned>(options: &[CommandOption]) -> DecodeResult<T> {
    T::deserialize(Tree(options))
}

/// Count focused nodes across the whole tree.
#[must_use]
pub fn focused_count(options: &[CommandOption]) -> usize {
    options
        .iter()
        .fold(0usize, |acc, node| acc.saturating_add(node.focused_count()))
}

/// A list of sibling option nodes.
struct Tree<'a>(&'a [CommandOption]);

impl<'de> Deserializer<'de> for Tree<'_> {
    type Error = DecodeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> DecodeResult<V::Value> {
        visitor.visit_map(Nodes {
            iter: self.0.iter(),
            pending: None,
        })
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> DecodeResult<V::Value> {
        if let Some(stray) = self.0.iter().find(|n| !fields.contains(&n.name.as_str())) {
            return Err(DecodeError::UnknownOption(stray.name.clone()));
        }
        self.deserialize_any(visitor)
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> DecodeResult<V::Value> {
        match self.0.first() {
            Some(stray) => Err(DecodeError::UnknownOption(stray.name.clone())),
            None => visitor.visit_unit(),
        }
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> DecodeResult<V::Value> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> DecodeResult<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option seq tuple tuple_struct map enum identifier ignored_any
    }
}

struct Nodes<'a> {
    iter: std::slice::Iter<'a, CommandOption>,
    pending: Option<&'a CommandOption>,
}

impl<'de> MapAccess<'de> for Nodes<'_> {
    type Error = DecodeError;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> DecodeResult<Option<K::Value>> {
        let Some(node) = self.iter.next() else {
            return Ok(None);
        };
        self.pending = Some(node);
        let key: StrDeserializer<'_, DecodeError> = node.name.as_str().into_deserializer();
        seed.deserialize(key).map(Some)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> DecodeResult<V::Value> {
        let node = self
            .pending
            .take()
            .ok_or_else(|| DecodeError::Message("value requested before key".into()))?;
        seed.deserialize(Node(node))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

/// A single option node decoded as a field value.
struct Node<'a>(&'a CommandOption);

impl Node<'_> {
    fn mismatch(&self, expected: &'static str) -> DecodeError {
        DecodeError::TypeMismatch {
            option: self.0.name.clone(),
            expected,
            found: option_type::name(self.0.option_type),
        }
    }

    fn value(&self) -> DecodeResult<&serde_json::Value> {
        self.0
            .value
            .as_ref()
            .ok_or_else(|| DecodeError::MissingValue(self.0.name.clone()))
    }

    fn is_nested(&self) -> bool {
        matches!(
            self.0.option_type,
            option_type::SUB_COMMAND | option_type::SUB_COMMAND_GROUP
        )
    }

    fn is_snowflake(&self) -> bool {
        matches!(
            self.0.option_type,
            option_type::USER
                | option_type::CHANNEL
                | option_type::ROLE
                | option_type::MENTIONABLE
                | option_type::ATTACHMENT
        )
    }

    /// Integer value. Autocomplete sends the focused option's partial input
    /// as a string; an empty one reads as zero.
    fn integer(&self) -> DecodeResult<i64> {
        if self.0.option_type != option_type::INTEGER {
            return Err(self.mismatch("integer"));
        }
        match self.value()? {
            serde_json::Value::Number(n) => n.as_i64().ok_or_else(|| self.mismatch("integer")),
            serde_json::Value::String(s) if self.0.focused => parse_partial(s)
                .ok_or_else(|| DecodeError::Message(format!("{s:?} is not an integer"))),
            _ => Err(self.mismatch("integer")),
        }
    }

    fn number(&self) -> DecodeResult<f64> {
        if !matches!(
            self.0.option_type,
            option_type::NUMBER | option_type::INTEGER
        ) {
            return Err(self.mismatch("number"));
        }
        match self.value()? {
            serde_json::Value::Number(n) => n.as_f64().ok_or_else(|| self.mismatch("number")),
            serde_json::Value::String(s) if self.0.focused => parse_partial(s)
                .ok_or_else(|| DecodeError::Message(format!("{s:?} is not a number"))),
            _ => Err(self.mismatch("number")),
        }
    }

    fn string(&self) -> DecodeResult<&str> {
        if self.0.option_type != option_type::STRING && !self.is_snowflake() {
            return Err(self.mismatch("string"));
        }
        self.value()?.as_str().ok_or_else(|| self.mismatch("string"))
    }

    fn boolean(&self) -> DecodeResult<bool> {
        if self.0.option_type != option_type::BOOLEAN {
            return Err(self.mismatch("boolean"));
        }
        self.value()?
            .as_bool()
            .ok_or_else(|| self.mismatch("boolean"))
    }
}

fn parse_partial<T: std::str::FromStr + Default>(input: &str) -> Option<T> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Some(T::default());
    }
    trimmed.parse().ok()
}

macro_rules! integer {
    ($($method:ident),*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> DecodeResult<V::Value> {
                visitor.visit_i64(self.integer()?)
            }
        )*
    };
}

impl<'de> Deserializer<'de> for Node<'_> {
    type Error = DecodeError;

    integer!(
        deserialize_i8,
        deserialize_i16,
        deserialize_i32,
        deserialize_i64,
        deserialize_u8,
        deserialize_u16,
        deserialize_u32,
        deserialize_u64
    );

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> DecodeResult<V::Value> {
        match self.0.option_type {
            option_type::SUB_COMMAND | option_type::SUB_COMMAND_GROUP => {
                Tree(&self.0.options).deserialize_any(visitor)
            },
            option_type::INTEGER => visitor.visit_i64(self.integer()?),
            option_type::NUMBER => visitor.visit_f64(self.number()?),
            option_type::BOOLEAN => visitor.visit_bool(self.boolean()?),
            _ => visitor.visit_str(self.string()?),
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> DecodeResult<V::Value> {
        visitor.visit_bool(self.boolean()?)
    }

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> DecodeResult<V::Value> {
        visitor.visit_f64(self.number()?)
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> DecodeResult<V::Value> {
        visitor.visit_f64(self.number()?)
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> DecodeResult<V::Value> {
        visitor.visit_str(self.string()?)
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> DecodeResult<V::Value> {
        visitor.visit_str(self.string()?)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> DecodeResult<V::Value> {
        visitor.visit_str(self.string()?)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> DecodeResult<V::Value> {
        visitor.visit_some(self)
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> DecodeResult<V::Value> {
        if !self.is_nested() {
            return Err(self.mismatch("subcommand"));
        }
        Tree(&self.0.options).deserialize_unit(visitor)
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> DecodeResult<V::Value> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> DecodeResult<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> DecodeResult<V::Value> {
        if self.is_nested() {
            return Tree(&self.0.options).deserialize_struct(name, fields, visitor);
        }
        if name == FOCUSABLE && fields == FOCUSABLE_FIELDS {
            return visitor.visit_map(FocusParts {
                node: self.0,
                step: 0,
            });
        }
        Err(self.mismatch("subcommand"))
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> DecodeResult<V::Value> {
        visitor.visit_unit()
    }

    serde::forward_to_deserialize_any! {
        i128 u128 bytes byte_buf seq tuple tuple_struct map enum identifier
    }
}

/// Presents a scalar node as `{ value, focused }`.
struct FocusParts<'a> {
    node: &'a CommandOption,
    step: u8,
}

impl<'de> MapAccess<'de> for FocusParts<'_> {
    type Error = DecodeError;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> DecodeResult<Option<K::Value>> {
        let Some(key) = FOCUSABLE_FIELDS.get(usize::from(self.step)) else {
            return Ok(None);
        };
        let key: StrDeserializer<'_, DecodeError> = (*key).into_deserializer();
        seed.deserialize(key).map(Some)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> DecodeResult<V::Value> {
        let step = self.step;
        self.step = step.saturating_add(1);
        match step {
            0 => seed.deserialize(Node(self.node)),
            _ => {
                let flag: BoolDeserializer<DecodeError> = self.node.focused.into_deserializer();
                seed.deserialize(flag)
            },
        }
    }
}
