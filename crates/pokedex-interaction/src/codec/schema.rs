//! Structural fingerprints for state types.
//!
//! The binary encoding carries no field names, so a token issued before a
//! field was added would otherwise decode into the wrong slots. Every token
//! carries a short digest of its state type's shape; the digest is derived
//! by walking the type's `Deserialize` impl with a tracing deserializer.

use serde::de::{DeserializeOwned, DeserializeSeed, Deserializer, SeqAccess, Visitor};

use crate::error::{DecodeError, DecodeResult, EncodeError, EncodeResult};

/// Bytes of digest carried in each token.
pub const FINGERPRINT_LEN: usize = 2;

const MAX_DEPTH: usize = 16;

/// Truncated BLAKE3 digest of a state type's field layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(pub(crate) [u8; FINGERPRINT_LEN]);

impl Fingerprint {
    /// Compute the fingerprint of `T`.
    ///
    /// Fails when `T` contains a shape the state codec cannot carry.
    pub fn of<T: DeserializeOwned>() -> EncodeResult<Self> {
        let mut tracer = Tracer {
            hasher: blake3::Hasher::new(),
            depth: 0,
        };
        T::deserialize(&mut tracer).map_err(|err| match err {
            DecodeError::Unsupported(what) => EncodeError::Unsupported(what),
            other => EncodeError::Message(other.to_string()),
        })?;
        let digest = tracer.hasher.finalize();
        let mut out = [0u8; FINGERPRINT_LEN];
        out.copy_from_slice(&digest.as_bytes()[..FINGERPRINT_LEN]);
        Ok(Self(out))
    }

    /// Raw digest bytes.
    #[must_use]
    pub fn bytes(self) -> [u8; FINGERPRINT_LEN] {
        self.0
    }
}

struct Tracer {
    hasher: blake3::Hasher,
    depth: usize,
}

impl Tracer {
    fn mark(&mut self, token: &str) {
        self.hasher.update(token.as_bytes());
    }

    fn enter(&mut self) -> DecodeResult<()> {
        if self.depth >= MAX_DEPTH {
            return Err(DecodeError::Unsupported("recursive type"));
        }
        self.depth = self.depth.saturating_add(1);
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn fields<'de, V: Visitor<'de>>(&mut self, len: usize, visitor: V) -> DecodeResult<V::Value> {
        self.enter()?;
        let value = visitor.visit_seq(TraceFields {
            tracer: self,
            remaining: len,
        })?;
        self.leave();
        Ok(value)
    }
}

macro_rules! integer {
    ($($method:ident),*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> DecodeResult<V::Value> {
                self.mark("i");
                visitor.visit_i32(0)
            }
        )*
    };
}

macro_rules! unsupported {
    ($($method:ident => $what:literal),* $(,)?) => {
        $(
            fn $method<V: Visitor<'de>>(self, _visitor: V) -> DecodeResult<V::Value> {
                Err(DecodeError::Unsupported($what))
            }
        )*
    };
}

impl<'de> Deserializer<'de> for &mut Tracer {
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

    unsupported!(
        deserialize_any => "self-describing value",
        deserialize_f32 => "floating point",
        deserialize_f64 => "floating point",
        deserialize_bytes => "byte array",
        deserialize_byte_buf => "byte array",
        deserialize_seq => "sequence",
        deserialize_map => "map",
        deserialize_identifier => "identifier",
        deserialize_ignored_any => "ignored value",
    );

    fn is_human_readable(&self) -> bool {
        false
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> DecodeResult<V::Value> {
        self.mark("b");
        visitor.visit_bool(false)
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> DecodeResult<V::Value> {
        self.mark("s");
        visitor.visit_char('a')
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> DecodeResult<V::Value> {
        self.mark("s");
        visitor.visit_borrowed_str("")
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> DecodeResult<V::Value> {
        self.mark("s");
        visitor.visit_borrowed_str("")
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> DecodeResult<V::Value> {
        self.mark("o(");
        self.enter()?;
        let value = visitor.visit_some(&mut *self)?;
        self.leave();
        self.mark(")");
        Ok(value)
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> DecodeResult<V::Value> {
        self.mark("u");
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> DecodeResult<V::Value> {
        self.mark("u");
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> DecodeResult<V::Value> {
        self.enter()?;
        let value = visitor.visit_newtype_struct(&mut *self)?;
        self.leave();
        Ok(value)
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, len: usize, visitor: V) -> DecodeResult<V::Value> {
        self.mark(&format!("t{len}("));
        let value = self.fields(len, visitor)?;
        self.mark(")");
        Ok(value)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        len: usize,
        visitor: V,
    ) -> DecodeResult<V::Value> {
        self.deserialize_tuple(len, visitor)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> DecodeResult<V::Value> {
        self.mark("{");
        for field in fields {
            self.mark(field);
            self.mark(",");
        }
        self.mark("|");
        let value = self.fields(fields.len(), visitor)?;
        self.mark("}");
        Ok(value)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        _visitor: V,
    ) -> DecodeResult<V::Value> {
        Err(DecodeError::Unsupported("enum"))
    }
}

struct TraceFields<'a> {
    tracer: &'a mut Tracer,
    remaining: usize,
}

impl<'de> SeqAccess<'de> for TraceFields<'_> {
    type Error = DecodeError;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> DecodeResult<Option<T::Value>> {
        let Some(rest) = self.remaining.checked_sub(1) else {
            return Ok(None);
        };
        self.remaining = rest;
        seed.deserialize(&mut *self.tracer).map(Some)
    }
}
