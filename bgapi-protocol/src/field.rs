//! Primitive field deserializers and serializers.
//!
//! Every wire field is described by a [`FieldType`]. Decoding a field
//! consumes exactly the bytes that type declares from a shared
//! [`Cursor`] and yields a [`Value`]; encoding writes the same bytes back.
//! Multi-byte integers are little-endian.

use std::fmt;

use bytes::{Buf, BufMut, BytesMut};
use serde::{Serialize, Serializer};

use crate::error::ProtocolError;
use crate::layout::MessageLayout;
use crate::types::{BdAddr, BD_ADDR_LEN, MAX_ARRAY_LEN};

/// Code table of a one-byte enumerated type.
#[derive(Debug, PartialEq, Eq)]
pub struct EnumTable {
    /// Type name, used in diagnostics.
    pub name: &'static str,
    /// `(code, variant name)` pairs.
    pub entries: &'static [(u8, &'static str)],
}

impl EnumTable {
    /// Returns the variant name for a raw code.
    pub fn lookup(&self, code: u8) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, name)| *name)
    }
}

/// Wire type of a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    U8,
    I8,
    U16,
    I16,
    U32,
    /// One byte mapped through a code table. Unknown codes are rejected.
    Enum(&'static EnumTable),
    /// Six byte Bluetooth device address.
    Address,
    /// `uint8array`: one length byte followed by that many bytes.
    Array,
    /// Fixed-width text, NUL padded.
    Text(usize),
    /// All remaining payload bytes.
    Remainder,
}

impl FieldType {
    /// Smallest number of bytes this field can occupy.
    pub fn min_len(self) -> usize {
        match self {
            FieldType::U8 | FieldType::I8 | FieldType::Enum(_) | FieldType::Array => 1,
            FieldType::U16 | FieldType::I16 => 2,
            FieldType::U32 => 4,
            FieldType::Address => BD_ADDR_LEN,
            FieldType::Text(width) => width,
            FieldType::Remainder => 0,
        }
    }

    /// Read one field at the cursor.
    pub fn read(
        self,
        cursor: &mut Cursor<'_>,
        field: &'static str,
    ) -> Result<Value, ProtocolError> {
        let offset = cursor.position();
        let value = match self {
            FieldType::U8 => Value::U8(cursor.take(1, field)?.get_u8()),
            FieldType::I8 => Value::I8(cursor.take(1, field)?.get_i8()),
            FieldType::U16 => Value::U16(cursor.take(2, field)?.get_u16_le()),
            FieldType::I16 => Value::I16(cursor.take(2, field)?.get_i16_le()),
            FieldType::U32 => Value::U32(cursor.take(4, field)?.get_u32_le()),
            FieldType::Enum(table) => {
                let code = cursor.take(1, field)?.get_u8();
                let name = table.lookup(code).ok_or(ProtocolError::UnknownEnumCode {
                    table: table.name,
                    field,
                    offset,
                    value: code,
                })?;
                Value::Enum { code, name }
            }
            FieldType::Address => {
                let mut addr = [0u8; BD_ADDR_LEN];
                addr.copy_from_slice(cursor.take(BD_ADDR_LEN, field)?);
                Value::Address(BdAddr(addr))
            }
            FieldType::Array => {
                let len = cursor.take(1, field)?.get_u8() as usize;
                Value::Bytes(cursor.take(len, field)?.to_vec())
            }
            FieldType::Text(width) => {
                let raw = cursor.take(width, field)?;
                let end = raw.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
                let text = std::str::from_utf8(&raw[..end])
                    .map_err(|_| ProtocolError::InvalidText { field, offset })?;
                Value::Text(text.to_string())
            }
            FieldType::Remainder => {
                let len = cursor.remaining();
                Value::Bytes(cursor.take(len, field)?.to_vec())
            }
        };
        Ok(value)
    }

    /// Write one field value.
    ///
    /// `message` and `field` only label the error when the value does not
    /// match this type.
    pub fn write(
        self,
        value: &Value,
        buf: &mut BytesMut,
        message: &'static str,
        field: &'static str,
    ) -> Result<(), ProtocolError> {
        match (self, value) {
            (FieldType::U8, Value::U8(v)) => buf.put_u8(*v),
            (FieldType::I8, Value::I8(v)) => buf.put_i8(*v),
            (FieldType::U16, Value::U16(v)) => buf.put_u16_le(*v),
            (FieldType::I16, Value::I16(v)) => buf.put_i16_le(*v),
            (FieldType::U32, Value::U32(v)) => buf.put_u32_le(*v),
            (FieldType::Enum(_), Value::Enum { code, .. }) => buf.put_u8(*code),
            (FieldType::Address, Value::Address(addr)) => buf.put_slice(addr.as_bytes()),
            (FieldType::Array, Value::Bytes(bytes)) => {
                if bytes.len() > MAX_ARRAY_LEN {
                    return Err(ProtocolError::FieldTooLong {
                        field,
                        len: bytes.len(),
                        max: MAX_ARRAY_LEN,
                    });
                }
                buf.put_u8(bytes.len() as u8);
                buf.put_slice(bytes);
            }
            (FieldType::Text(width), Value::Text(text)) => {
                let bytes = text.as_bytes();
                if bytes.contains(&0) {
                    return Err(ProtocolError::TextContainsNul { field });
                }
                if bytes.len() > width {
                    return Err(ProtocolError::FieldTooLong {
                        field,
                        len: bytes.len(),
                        max: width,
                    });
                }
                buf.put_slice(bytes);
                buf.put_bytes(0, width - bytes.len());
            }
            (FieldType::Remainder, Value::Bytes(bytes)) => buf.put_slice(bytes),
            _ => return Err(ProtocolError::LayoutMismatch { message, field }),
        }
        Ok(())
    }

    /// BGAPI type name, as used in protocol documentation.
    pub fn type_name(self) -> String {
        match self {
            FieldType::U8 => "uint8".to_string(),
            FieldType::I8 => "int8".to_string(),
            FieldType::U16 => "uint16".to_string(),
            FieldType::I16 => "int16".to_string(),
            FieldType::U32 => "uint32".to_string(),
            FieldType::Enum(table) => table.name.to_string(),
            FieldType::Address => "bd_addr".to_string(),
            FieldType::Array => "uint8array".to_string(),
            FieldType::Text(width) => format!("text[{}]", width),
            FieldType::Remainder => "remainder".to_string(),
        }
    }
}

/// A decoded field value, independent of the message it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    /// Enumerated code and its variant name.
    Enum { code: u8, name: &'static str },
    Address(BdAddr),
    Bytes(Vec<u8>),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::U8(v) => write!(f, "{}", v),
            Value::I8(v) => write!(f, "{}", v),
            Value::U16(v) => write!(f, "{}", v),
            Value::I16(v) => write!(f, "{}", v),
            Value::U32(v) => write!(f, "{}", v),
            Value::Enum { name, .. } => f.write_str(name),
            Value::Address(addr) => write!(f, "{}", addr),
            Value::Bytes(bytes) => {
                f.write_str("[")?;
                for (i, b) in bytes.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{:02X}", b)?;
                }
                f.write_str("]")
            }
            Value::Text(text) => write!(f, "{:?}", text),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::U8(v) => serializer.serialize_u8(*v),
            Value::I8(v) => serializer.serialize_i8(*v),
            Value::U16(v) => serializer.serialize_u16(*v),
            Value::I16(v) => serializer.serialize_i16(*v),
            Value::U32(v) => serializer.serialize_u32(*v),
            Value::Enum { name, .. } => serializer.serialize_str(name),
            Value::Address(addr) => addr.serialize(serializer),
            Value::Bytes(bytes) => bytes.serialize(serializer),
            Value::Text(text) => serializer.serialize_str(text),
        }
    }
}

/// Read position over one immutable frame.
#[derive(Debug)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Start reading `buf` at `pos`.
    pub fn new(buf: &'a [u8], pos: usize) -> Self {
        Self { buf, pos }
    }

    /// Current offset from the start of the frame.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    /// Consume exactly `n` bytes or fail without moving.
    pub fn take(&mut self, n: usize, field: &'static str) -> Result<&'a [u8], ProtocolError> {
        if self.remaining() < n {
            return Err(ProtocolError::MalformedFrame {
                field,
                offset: self.pos,
                needed: n,
                available: self.remaining(),
            });
        }
        let start = self.pos;
        self.pos += n;
        Ok(&self.buf[start..self.pos])
    }
}

/// Conversion between a Rust field type and its generic [`Value`].
///
/// Implemented for the integer primitives, `Vec<u8>` (`uint8array`),
/// [`BdAddr`], [`FixedText`](crate::types::FixedText),
/// [`Remainder`](crate::types::Remainder) and every `wire_enum!` type.
pub trait WireField: Sized {
    /// Wire layout of this type.
    const FIELD_TYPE: FieldType;

    /// Extract the typed value; `None` if the value has another shape.
    fn from_value(value: Value) -> Option<Self>;

    fn to_value(&self) -> Value;
}

macro_rules! primitive_wire_field {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl WireField for $ty {
                const FIELD_TYPE: FieldType = FieldType::$variant;

                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(v),
                        _ => None,
                    }
                }

                fn to_value(&self) -> Value {
                    Value::$variant(*self)
                }
            }
        )*
    };
}

primitive_wire_field! {
    u8 => U8,
    i8 => I8,
    u16 => U16,
    i16 => I16,
    u32 => U32,
}

impl WireField for Vec<u8> {
    const FIELD_TYPE: FieldType = FieldType::Array;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::Bytes(self.clone())
    }
}

/// Hands decoded values to a typed constructor in layout order.
#[derive(Debug)]
pub struct ValueReader {
    layout: &'static MessageLayout,
    values: std::vec::IntoIter<Value>,
    index: usize,
}

impl ValueReader {
    pub fn new(layout: &'static MessageLayout, values: Vec<Value>) -> Self {
        Self {
            layout,
            values: values.into_iter(),
            index: 0,
        }
    }

    /// Take the next value as `T`.
    pub fn next<T: WireField>(&mut self) -> Result<T, ProtocolError> {
        let field = self
            .layout
            .fields
            .get(self.index)
            .map_or("?", |spec| spec.name);
        self.index += 1;
        self.values
            .next()
            .and_then(T::from_value)
            .ok_or(ProtocolError::LayoutMismatch {
                message: self.layout.name,
                field,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResponseCode;

    fn read(ty: FieldType, bytes: &[u8]) -> Result<(Value, usize), ProtocolError> {
        let mut cursor = Cursor::new(bytes, 0);
        let value = ty.read(&mut cursor, "field")?;
        Ok((value, cursor.position()))
    }

    fn write(ty: FieldType, value: &Value) -> Result<Vec<u8>, ProtocolError> {
        let mut buf = BytesMut::new();
        ty.write(value, &mut buf, "Test", "field")?;
        Ok(buf.to_vec())
    }

    #[test]
    fn test_integers_little_endian() {
        assert_eq!(read(FieldType::U16, &[0x34, 0x12]).unwrap(), (Value::U16(0x1234), 2));
        assert_eq!(
            read(FieldType::U32, &[0x78, 0x56, 0x34, 0x12, 0xFF]).unwrap(),
            (Value::U32(0x1234_5678), 4)
        );
        assert_eq!(read(FieldType::I8, &[0xC4]).unwrap(), (Value::I8(-60), 1));
        assert_eq!(read(FieldType::I16, &[0xFE, 0xFF]).unwrap(), (Value::I16(-2), 2));
        assert_eq!(write(FieldType::U16, &Value::U16(0x1234)).unwrap(), vec![0x34, 0x12]);
    }

    #[test]
    fn test_underrun_reports_position() {
        let mut cursor = Cursor::new(&[0x00, 0x05, 0x07, 0x01], 3);
        let err = FieldType::U16.read(&mut cursor, "handle").unwrap_err();
        assert_eq!(
            err,
            ProtocolError::MalformedFrame {
                field: "handle",
                offset: 3,
                needed: 2,
                available: 1,
            }
        );
        // A failed read does not move the cursor.
        assert_eq!(cursor.position(), 3);
    }

    #[test]
    fn test_enum_code_table() {
        let ty = FieldType::Enum(&ResponseCode::CODE_TABLE);
        assert_eq!(
            read(ty, &[0x86]).unwrap().0,
            Value::Enum { code: 0x86, name: "NotConnected" }
        );
        assert_eq!(
            read(ty, &[0x10]).unwrap_err(),
            ProtocolError::UnknownEnumCode {
                table: "ResponseCode",
                field: "field",
                offset: 0,
                value: 0x10,
            }
        );
    }

    #[test]
    fn test_array_is_length_prefixed() {
        let (value, consumed) = read(FieldType::Array, &[0x03, 0xAA, 0xBB, 0xCC, 0xDD]).unwrap();
        assert_eq!(value, Value::Bytes(vec![0xAA, 0xBB, 0xCC]));
        assert_eq!(consumed, 4);

        let err = read(FieldType::Array, &[0x05, 0xAA]).unwrap_err();
        assert!(err.is_underrun());

        let too_long = Value::Bytes(vec![0; 256]);
        assert!(matches!(
            write(FieldType::Array, &too_long),
            Err(ProtocolError::FieldTooLong { len: 256, max: 255, .. })
        ));
    }

    #[test]
    fn test_text_padding() {
        let (value, consumed) = read(FieldType::Text(6), b"BLE\0\0\0").unwrap();
        assert_eq!(value, Value::Text("BLE".to_string()));
        assert_eq!(consumed, 6);
        assert_eq!(write(FieldType::Text(6), &value).unwrap(), b"BLE\0\0\0".to_vec());

        assert_eq!(
            read(FieldType::Text(2), &[0xFF, 0xFE]).unwrap_err(),
            ProtocolError::InvalidText { field: "field", offset: 0 }
        );
        assert!(matches!(
            write(FieldType::Text(2), &Value::Text("abc".to_string())),
            Err(ProtocolError::FieldTooLong { len: 3, max: 2, .. })
        ));
    }

    #[test]
    fn test_text_with_nul_rejected() {
        // Padding is stripped on read, so an embedded NUL could not survive.
        for text in ["ab\0", "\0", "a\0b"] {
            assert_eq!(
                write(FieldType::Text(4), &Value::Text(text.to_string())).unwrap_err(),
                ProtocolError::TextContainsNul { field: "field" }
            );
        }
        assert_eq!(
            write(FieldType::Text(4), &Value::Text("abcd".to_string())).unwrap(),
            b"abcd".to_vec()
        );
    }

    #[test]
    fn test_remainder_takes_everything() {
        let mut cursor = Cursor::new(&[1, 2, 3, 4], 1);
        let value = FieldType::Remainder.read(&mut cursor, "data").unwrap();
        assert_eq!(value, Value::Bytes(vec![2, 3, 4]));
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_write_type_mismatch() {
        assert_eq!(
            write(FieldType::U8, &Value::U16(1)).unwrap_err(),
            ProtocolError::LayoutMismatch { message: "Test", field: "field" }
        );
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Bytes(vec![0x01, 0xAB]).to_string(), "[01 AB]");
        assert_eq!(Value::Enum { code: 0, name: "Success" }.to_string(), "Success");
        assert_eq!(Value::Text("hi".to_string()).to_string(), "\"hi\"");
    }
}
