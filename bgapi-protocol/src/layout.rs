//! Static per-message field layouts.
//!
//! A message set is a list of [`MessageLayout`]s, each an ordered list of
//! named fields. The codec decodes any frame by walking the layout that
//! matches its (class, method) key, so message types carry no decoding
//! code of their own.

use crate::error::ProtocolError;
use crate::field::{FieldType, Value};
use crate::types::MessageKind;

/// One named field of a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
}

/// Wire layout of one message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageLayout {
    pub name: &'static str,
    pub kind: MessageKind,
    pub class: u8,
    pub method: u8,
    /// Fields in wire order.
    pub fields: &'static [FieldSpec],
}

impl MessageLayout {
    /// Smallest payload that can satisfy this layout.
    pub fn min_payload_len(&self) -> usize {
        self.fields.iter().map(|f| f.ty.min_len()).sum()
    }

    /// Returns true when every field has a fixed width.
    pub fn is_fixed_size(&self) -> bool {
        self.fields
            .iter()
            .all(|f| !matches!(f.ty, FieldType::Array | FieldType::Remainder))
    }
}

/// A family of typed messages sharing one kind and one layout table.
///
/// Implemented by `define_messages!`; see [`crate::messages`] for the
/// BGAPI sets.
pub trait MessageSet: Sized {
    /// Kind shared by every message of the set.
    const KIND: MessageKind;

    /// Layout table, one entry per variant.
    const LAYOUTS: &'static [MessageLayout];

    /// (class, method) key of this message.
    fn class_method(&self) -> (u8, u8);

    /// Build the typed message from values decoded with `layout`.
    fn from_values(layout: &'static MessageLayout, values: Vec<Value>)
        -> Result<Self, ProtocolError>;

    /// Field values in layout order.
    fn to_values(&self) -> Vec<Value>;

    /// Find the layout registered for a key.
    fn lookup(class: u8, method: u8) -> Option<&'static MessageLayout> {
        Self::LAYOUTS
            .iter()
            .find(|l| l.class == class && l.method == method)
    }

    /// Layout of this message.
    fn layout(&self) -> Result<&'static MessageLayout, ProtocolError> {
        let (class, method) = self.class_method();
        Self::lookup(class, method).ok_or(ProtocolError::UnknownMessageType {
            kind: Self::KIND,
            class,
            method,
        })
    }

    /// Variant name of this message.
    fn name(&self) -> &'static str {
        self.layout().map_or("Unknown", |l| l.name)
    }
}

/// Check that a layout table is usable by the codec: unique keys, and a
/// remainder field only in last position.
pub fn validate_layouts(layouts: &[MessageLayout]) -> Result<(), String> {
    for (i, layout) in layouts.iter().enumerate() {
        if let Some(other) = layouts[..i]
            .iter()
            .find(|l| l.class == layout.class && l.method == layout.method)
        {
            return Err(format!(
                "{} and {} share class=0x{:02X} method=0x{:02X}",
                other.name, layout.name, layout.class, layout.method
            ));
        }
        let last = layout.fields.len().saturating_sub(1);
        for (j, field) in layout.fields.iter().enumerate() {
            if field.ty == FieldType::Remainder && j != last {
                return Err(format!(
                    "{}: remainder field '{}' is not last",
                    layout.name, field.name
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[FieldSpec] = &[
        FieldSpec { name: "connection", ty: FieldType::U8 },
        FieldSpec { name: "handle", ty: FieldType::U16 },
        FieldSpec { name: "value", ty: FieldType::Array },
    ];

    #[test]
    fn test_min_payload_len() {
        let layout = MessageLayout {
            name: "Sample",
            kind: MessageKind::Event,
            class: 0x04,
            method: 0x05,
            fields: FIELDS,
        };
        assert_eq!(layout.min_payload_len(), 4);
        assert!(!layout.is_fixed_size());
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let a = MessageLayout {
            name: "A",
            kind: MessageKind::Response,
            class: 1,
            method: 2,
            fields: &[],
        };
        let b = MessageLayout { name: "B", ..a };
        assert!(validate_layouts(&[a]).is_ok());
        let err = validate_layouts(&[a, b]).unwrap_err();
        assert!(err.contains("A and B"));
    }

    #[test]
    fn test_validate_rejects_inner_remainder() {
        let layout = MessageLayout {
            name: "Bad",
            kind: MessageKind::Response,
            class: 1,
            method: 1,
            fields: &[
                FieldSpec { name: "data", ty: FieldType::Remainder },
                FieldSpec { name: "tail", ty: FieldType::U8 },
            ],
        };
        assert!(validate_layouts(&[layout]).is_err());
    }
}
