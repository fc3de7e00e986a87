//! Binary state codec.
//!
//! A compact, non-self-describing encoding for button state. Values are
//! written field by field in declaration order with no names or tags:
//!
//! | shape                    | encoding                                   |
//! |--------------------------|--------------------------------------------|
//! | any integer              | 4 bytes, big-endian, signed 32-bit         |
//! | `bool`                   | 1 byte, `0` or `1`                         |
//! | `String` / `&str`        | 1 length byte, then that many UTF-8 bytes  |
//! | `Option<T>`              | 1 flag byte; `T` follows when the flag is 1|
//! | struct / tuple           | fields concatenated in order               |
//! | newtype struct           | the inner value                            |
//!
//! Floats, sequences, maps, byte arrays and enums are rejected. Integers
//! outside the 32-bit signed range are rejected at encode time; decoding a
//! negative value into an unsigned field is rejected at decode time.

mod de;
mod schema;
mod ser;

use serde::Serialize;
use serde::de::Deserialize;

pub use schema::{FINGERPRINT_LEN, Fingerprint};

use crate::error::{DecodeError, DecodeResult, EncodeResult};

/// Encode `value` into its compact binary form.
///
/// # Errors
///
/// Returns an [`EncodeError`](crate::EncodeError) for strings longer than 255
/// bytes, integers outside the 32-bit range and unsupported shapes.
pub fn to_bytes<T: ?Sized + Serialize>(value: &T) -> EncodeResult<Vec<u8>> {
    let mut encoder = ser::Encoder::new();
    value.serialize(&mut encoder)?;
    Ok(encoder.into_bytes())
}

/// Decode a value from its compact binary form.
///
/// The entire input must be consumed.
///
/// # Errors
///
/// Returns a [`DecodeError`] when the input is truncated, carries trailing
/// bytes, holds an invalid flag or string, or does not fit the target type.
pub fn from_bytes<'de, T: Deserialize<'de>>(input: &'de [u8]) -> DecodeResult<T> {
    let mut decoder = de::Decoder::new(input);
    let value = T::deserialize(&mut decoder)?;
    match decoder.remaining() {
        0 => Ok(value),
        n => Err(DecodeError::TrailingBytes(n)),
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::error::EncodeError;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Lookup {
        pokemon: String,
        max_level: Option<i32>,
        egg_moves: Option<bool>,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Level(u32);

    #[test]
    fn integer_layout_is_big_endian() {
        assert_eq!(to_bytes(&1i32).unwrap(), vec![0, 0, 0, 1]);
        assert_eq!(to_bytes(&-1i64).unwrap(), vec![0xff, 0xff, 0xff, 0xff]);
        assert_eq!(to_bytes(&258u16).unwrap(), vec![0, 0, 1, 2]);
    }

    #[test]
    fn struct_layout_matches_field_order() {
        let value = Lookup {
            pokemon: "Mew".into(),
            max_level: Some(50),
            egg_moves: None,
        };
        let bytes = to_bytes(&value).unwrap();
        assert_eq!(bytes, vec![3, b'M', b'e', b'w', 1, 0, 0, 0, 50, 0]);
        assert_eq!(from_bytes::<Lookup>(&bytes).unwrap(), value);
    }

    #[test]
    fn newtype_is_transparent() {
        assert_eq!(to_bytes(&Level(7)).unwrap(), vec![0, 0, 0, 7]);
        assert_eq!(from_bytes::<Level>(&[0, 0, 0, 7]).unwrap(), Level(7));
    }

    #[test]
    fn unit_encodes_to_nothing() {
        assert!(to_bytes(&()).unwrap().is_empty());
        from_bytes::<()>(&[]).unwrap();
    }

    #[test]
    fn long_strings_are_rejected() {
        let long = "x".repeat(256);
        assert!(matches!(
            to_bytes(&long),
            Err(EncodeError::StringTooLong(256))
        ));
        assert_eq!(to_bytes(&"x".repeat(255)).unwrap().len(), 256);
    }

    #[test]
    fn wide_integers_are_rejected() {
        assert!(matches!(
            to_bytes(&(i64::from(i32::MAX) + 1)),
            Err(EncodeError::IntegerOutOfRange(_))
        ));
        assert!(matches!(
            to_bytes(&u32::MAX),
            Err(EncodeError::IntegerOutOfRange(_))
        ));
    }

    #[test]
    fn negative_into_unsigned_is_rejected() {
        let bytes = to_bytes(&-5i32).unwrap();
        assert!(from_bytes::<u32>(&bytes).is_err());
        assert_eq!(from_bytes::<i64>(&bytes).unwrap(), -5);
    }

    #[test]
    fn unsupported_shapes_are_rejected() {
        assert!(matches!(
            to_bytes(&1.5f64),
            Err(EncodeError::Unsupported("floating point"))
        ));
        assert!(matches!(
            to_bytes(&vec![1, 2, 3]),
            Err(EncodeError::Unsupported("sequence"))
        ));
    }

    #[test]
    fn truncated_input_is_rejected() {
        assert!(matches!(
            from_bytes::<i32>(&[0, 0]),
            Err(DecodeError::Truncated {
                needed: 4,
                remaining: 2
            })
        ));
        assert!(matches!(
            from_bytes::<String>(&[5, b'a']),
            Err(DecodeError::Truncated { .. })
        ));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        assert!(matches!(
            from_bytes::<bool>(&[1, 9]),
            Err(DecodeError::TrailingBytes(1))
        ));
    }

    #[test]
    fn invalid_flags_are_rejected() {
        assert!(matches!(
            from_bytes::<Option<i32>>(&[2, 0, 0, 0, 1]),
            Err(DecodeError::InvalidFlag(2))
        ));
        assert!(matches!(
            from_bytes::<bool>(&[7]),
            Err(DecodeError::InvalidFlag(7))
        ));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        assert!(matches!(
            from_bytes::<String>(&[2, 0xc3, 0x28]),
            Err(DecodeError::InvalidUtf8)
        ));
    }
}
