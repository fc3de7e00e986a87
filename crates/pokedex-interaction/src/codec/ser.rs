use serde::ser::{self, Impossible, Serialize};

use crate::error::{EncodeError, EncodeResult};

/// Serializer writing the compact, non-self-describing state encoding.
pub(crate) struct Encoder {
    out: Vec<u8>,
}

impl Encoder {
    pub(crate) fn new() -> Self {
        Self { out: Vec::new() }
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.out
    }

    fn write_int(&mut self, value: i128) -> EncodeResult<()> {
        let narrowed = i32::try_from(value).map_err(|_| EncodeError::IntegerOutOfRange(value))?;
        self.out.extend_from_slice(&narrowed.to_be_bytes());
        Ok(())
    }

    fn write_flag(&mut self, set: bool) {
        self.out.push(u8::from(set));
    }
}

impl<'a> ser::Serializer for &'a mut Encoder {
    type Ok = ();
    type Error = EncodeError;

    type SerializeSeq = Impossible<(), EncodeError>;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Impossible<(), EncodeError>;
    type SerializeMap = Impossible<(), EncodeError>;
    type SerializeStruct = Self;
    type SerializeStructVariant = Impossible<(), EncodeError>;

    fn is_human_readable(&self) -> bool {
        false
    }

    fn serialize_bool(self, v: bool) -> EncodeResult<()> {
        self.write_flag(v);
        Ok(())
    }

    fn serialize_i8(self, v: i8) -> EncodeResult<()> {
        self.write_int(i128::from(v))
    }

    fn serialize_i16(self, v: i16) -> EncodeResult<()> {
        self.write_int(i128::from(v))
    }

    fn serialize_i32(self, v: i32) -> EncodeResult<()> {
        self.write_int(i128::from(v))
    }

    fn serialize_i64(self, v: i64) -> EncodeResult<()> {
        self.write_int(i128::from(v))
    }

    fn serialize_i128(self, v: i128) -> EncodeResult<()> {
        self.write_int(v)
    }

    fn serialize_u8(self, v: u8) -> EncodeResult<()> {
        self.write_int(i128::from(v))
    }

    fn serialize_u16(self, v: u16) -> EncodeResult<()> {
        self.write_int(i128::from(v))
    }

    fn serialize_u32(self, v: u32) -> EncodeResult<()> {
        self.write_int(i128::from(v))
    }

    fn serialize_u64(self, v: u64) -> EncodeResult<()> {
        self.write_int(i128::from(v))
    }

    fn serialize_u128(self, v: u128) -> EncodeResult<()> {
        let widened = i128::try_from(v).unwrap_or(i128::MAX);
        self.write_int(widened)
    }

    fn serialize_f32(self, _v: f32) -> EncodeResult<()> {
        Err(EncodeError::Unsupported("floating point"))
    }

    fn serialize_f64(self, _v: f64) -> EncodeResult<()> {
        Err(EncodeError::Unsupported("floating point"))
    }

    fn serialize_char(self, v: char) -> EncodeResult<()> {
        let mut buf = [0u8; 4];
        self.serialize_str(v.encode_utf8(&mut buf))
    }

    fn serialize_str(self, v: &str) -> EncodeResult<()> {
        let len = u8::try_from(v.len()).map_err(|_| EncodeError::StringTooLong(v.len()))?;
        self.out.push(len);
        self.out.extend_from_slice(v.as_bytes());
        Ok(())
    }

    fn serialize_bytes(self, _v: &[u8]) -> EncodeResult<()> {
        Err(EncodeError::Unsupported("byte array"))
    }

    fn serialize_none(self) -> EncodeResult<()> {
        self.write_flag(false);
        Ok(())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> EncodeResult<()> {
        self.write_flag(true);
        value.serialize(self)
    }

    fn serialize_unit(self) -> EncodeResult<()> {
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> EncodeResult<()> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
    ) -> EncodeResult<()> {
        Err(EncodeError::Unsupported("enum"))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> EncodeResult<()> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> EncodeResult<()> {
        Err(EncodeError::Unsupported("enum"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> EncodeResult<Self::SerializeSeq> {
        Err(EncodeError::Unsupported("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> EncodeResult<Self::SerializeTuple> {
        Ok(self)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> EncodeResult<Self::SerializeTupleStruct> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> EncodeResult<Self::SerializeTupleVariant> {
        Err(EncodeError::Unsupported("enum"))
    }

    fn serialize_map(self, _len: Option<usize>) -> EncodeResult<Self::SerializeMap> {
        Err(EncodeError::Unsupported("map"))
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> EncodeResult<Self::SerializeStruct> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> EncodeResult<Self::SerializeStructVariant> {
        Err(EncodeError::Unsupported("enum"))
    }
}

impl<'a> ser::SerializeTuple for &'a mut Encoder {
    type Ok = ();
    type Error = EncodeError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> EncodeResult<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> EncodeResult<()> {
        Ok(())
    }
}

impl<'a> ser::SerializeTupleStruct for &'a mut Encoder {
    type Ok = ();
    type Error = EncodeError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> EncodeResult<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> EncodeResult<()> {
        Ok(())
    }
}

impl<'a> ser::SerializeStruct for &'a mut Encoder {
    type Ok = ();
    type Error = EncodeError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> EncodeResult<()> {
        value.serialize(&mut **self)
    }

    // Skipped fields would shift every following field.
    fn skip_field(&mut self, _key: &'static str) -> EncodeResult<()> {
        Err(EncodeError::Unsupported("skipped field"))
    }

    fn end(self) -> EncodeResult<()> {
        Ok(())
    }
}
