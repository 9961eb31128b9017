//! Declaration macros for enumerated wire types and message sets.

/// Declares a one-byte enumerated wire type.
///
/// Generates the enum, its code table, `TryFrom<u8>`, `From<_> for u8`,
/// `Display` and the [`WireField`](crate::field::WireField) impl that lets
/// the type appear in a message declaration.
#[macro_export]
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $code:literal
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant = $code,
            )*
        }

        impl $name {
            /// Code table used when this type is decoded generically.
            pub const CODE_TABLE: $crate::field::EnumTable = $crate::field::EnumTable {
                name: stringify!($name),
                entries: &[ $( ($code, stringify!($variant)) ),* ],
            };

            /// Variant name as it appears in dumps.
            pub fn name(self) -> &'static str {
                match self {
                    $( $name::$variant => stringify!($variant), )*
                }
            }
        }

        impl ::std::convert::TryFrom<u8> for $name {
            type Error = u8;

            fn try_from(value: u8) -> ::std::result::Result<Self, u8> {
                match value {
                    $( $code => Ok($name::$variant), )*
                    _ => Err(value),
                }
            }
        }

        impl ::std::convert::From<$name> for u8 {
            fn from(value: $name) -> Self {
                value as u8
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }

        impl $crate::field::WireField for $name {
            const FIELD_TYPE: $crate::field::FieldType =
                $crate::field::FieldType::Enum(&$name::CODE_TABLE);

            fn from_value(value: $crate::field::Value) -> ::std::option::Option<Self> {
                match value {
                    $crate::field::Value::Enum { code, .. } => {
                        <$name as ::std::convert::TryFrom<u8>>::try_from(code).ok()
                    }
                    _ => None,
                }
            }

            fn to_value(&self) -> $crate::field::Value {
                $crate::field::Value::Enum {
                    code: *self as u8,
                    name: self.name(),
                }
            }
        }
    };
}

/// Declares a message set: one enum variant per (class, method) key.
///
/// The same declaration produces the typed enum and the static layout
/// table the generic codec walks, so the two cannot drift apart. Field
/// types must implement [`WireField`](crate::field::WireField).
///
/// ```
/// use bgapi_protocol::define_messages;
/// use bgapi_protocol::ResponseCode;
///
/// define_messages! {
///     /// Responses of a tiny example protocol.
///     pub enum Reply: Response {
///         /// Reply to a counter query.
///         Counter = (0x01, 0x02) {
///             result: ResponseCode,
///             value: u16,
///         },
///     }
/// }
/// ```
#[macro_export]
macro_rules! define_messages {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $kind:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = ($class:literal, $method:literal) {
                    $(
                        $(#[$fmeta:meta])*
                        $field:ident : $fty:ty
                    ),* $(,)?
                }
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant {
                    $(
                        $(#[$fmeta])*
                        $field: $fty,
                    )*
                },
            )*
        }

        impl $crate::layout::MessageSet for $name {
            const KIND: $crate::types::MessageKind = $crate::types::MessageKind::$kind;

            const LAYOUTS: &'static [$crate::layout::MessageLayout] = &[
                $(
                    $crate::layout::MessageLayout {
                        name: stringify!($variant),
                        kind: $crate::types::MessageKind::$kind,
                        class: $class,
                        method: $method,
                        fields: &[
                            $(
                                $crate::layout::FieldSpec {
                                    name: stringify!($field),
                                    ty: <$fty as $crate::field::WireField>::FIELD_TYPE,
                                },
                            )*
                        ],
                    },
                )*
            ];

            fn class_method(&self) -> (u8, u8) {
                match self {
                    $( $name::$variant { .. } => ($class, $method), )*
                }
            }

            fn from_values(
                layout: &'static $crate::layout::MessageLayout,
                values: ::std::vec::Vec<$crate::field::Value>,
            ) -> ::std::result::Result<Self, $crate::error::ProtocolError> {
                #[allow(unused_mut, unused_variables)]
                let mut values = $crate::field::ValueReader::new(layout, values);
                match (layout.class, layout.method) {
                    $(
                        ($class, $method) => Ok($name::$variant {
                            $( $field: values.next::<$fty>()?, )*
                        }),
                    )*
                    (class, method) => Err($crate::error::ProtocolError::UnknownMessageType {
                        kind: $crate::types::MessageKind::$kind,
                        class,
                        method,
                    }),
                }
            }

            fn to_values(&self) -> ::std::vec::Vec<$crate::field::Value> {
                match self {
                    $(
                        $name::$variant { $( $field ),* } => ::std::vec![
                            $( $crate::field::WireField::to_value($field) ),*
                        ],
                    )*
                }
            }
        }
    };
}
