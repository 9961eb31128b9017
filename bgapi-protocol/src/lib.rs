//! Frame codec for the BlueGiga BGAPI binary protocol.
//!
//! This crate decodes BGAPI frames exchanged between a host and a
//! Bluetooth Smart module into typed messages, and encodes typed messages
//! back into frames.
//!
//! # Frame Format
//!
//! ```text
//! +--------+--------+--------+----------------------+
//! | Header | Class  | Method |       Payload        |
//! | bit7=E |   u8   |   u8   | fields of the layout |
//! +--------+--------+--------+----------------------+
//! | 1 byte | 1 byte | 1 byte |      (variable)      |
//! ```
//!
//! The payload layout is fixed per (kind, class, method). Layouts live in
//! static tables generated by [`define_messages!`], and one generic
//! routine walks them, so new message types need no decoding code.
//!
//! # Example
//!
//! ```rust
//! use bgapi_protocol::{decode_message, encode_message, Message, Response, ResponseCode};
//!
//! let frame = [0x00, 0x05, 0x07, 0x00, 0x03];
//! let msg = decode_message(&frame).unwrap();
//! assert!(!msg.is_event());
//! assert_eq!(
//!     msg,
//!     Message::Response(Response::SmWhitelistBonds {
//!         result: ResponseCode::Success,
//!         count: 3,
//!     })
//! );
//!
//! let encoded = encode_message(&msg).unwrap();
//! assert_eq!(&encoded[..], &frame[..]);
//! ```
//!
//! # Serial Streams
//!
//! On a serial link frames carry a 4 byte header with the payload length.
//! [`BgApiCodec`] reassembles them for `tokio_util::codec::FramedRead`:
//!
//! ```rust
//! use bgapi_protocol::{decode_message, BgApiCodec};
//! use bytes::BytesMut;
//! use tokio_util::codec::Decoder;
//!
//! let mut codec = BgApiCodec::new();
//! let mut buf = BytesMut::from(&[0x80, 0x02, 0x00, 0x06, 0x81, 0x01][..]);
//! let wire = codec.decode(&mut buf).unwrap().unwrap();
//! assert!(decode_message(&wire.frame).unwrap().is_event());
//! ```

#[macro_use]
mod macros;

pub mod codec;
pub mod config;
pub mod error;
pub mod field;
pub mod framing;
pub mod layout;
pub mod messages;
pub mod types;

pub use codec::{
    decode_command, decode_command_with, decode_frame, decode_header, decode_message,
    decode_message_with, describe, describe_message, encode_command, encode_frame,
    encode_message, DecodedFrame, FrameHeader,
};
pub use config::{DecodeOptions, TrailingBytes};
pub use error::{CodecError, ProtocolError, ResponseCode};
pub use field::{FieldType, Value};
pub use framing::{
    decode_wire_header, BgApiCodec, WireFrame, WireHeader, MAX_PAYLOAD_SIZE,
    TECHNOLOGY_BLUETOOTH_SMART, TECHNOLOGY_WIFI, WIRE_HEADER_SIZE,
};
pub use layout::{FieldSpec, MessageLayout, MessageSet};
pub use messages::{Command, Event, Response};
pub use types::{
    AddressType, AttributeChangeReason, AttributeValueType, BdAddr, FixedText,
    GapConnectableMode, GapDiscoverMode, GapDiscoverableMode, Message, MessageKind, Remainder,
    ScanResponseType, SmpIoCapabilities, EVENT_FLAG, HEADER_SIZE,
};
