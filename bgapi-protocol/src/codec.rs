//! Codec for encoding and decoding BGAPI frames.
//!
//! Frame format:
//! ```text
//! +--------+--------+--------+----------------------+
//! | Header | Class  | Method |       Payload        |
//! | bit7=E |   u8   |   u8   | fields of the layout |
//! +--------+--------+--------+----------------------+
//! | 1 byte | 1 byte | 1 byte |      (variable)      |
//! ```
//!
//! The payload layout is looked up from (kind, class, method) and decoded
//! field by field with one cursor. Encoding walks the same layout.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};
use log::trace;
use serde::{Serialize, Serializer};

use crate::config::{DecodeOptions, TrailingBytes};
use crate::error::ProtocolError;
use crate::field::{Cursor, Value};
use crate::layout::{MessageLayout, MessageSet};
use crate::messages::{Command, Event, Response};
use crate::types::{Message, MessageKind, EVENT_FLAG, HEADER_SIZE, ROUTING_MASK};

/// Codec frame prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Bit 7 of the header byte.
    pub is_event: bool,
    /// Header bits 0..6. Ignored by the decoder.
    pub routing: u8,
    pub class: u8,
    pub method: u8,
}

/// Read the header byte, class and method of a frame.
///
/// Routing bits are returned but never checked, and the encoders write
/// them as zero: re-encoding a frame that carried routing bits differs
/// from the input in byte 0 only.
pub fn decode_header(frame: &[u8]) -> Result<FrameHeader, ProtocolError> {
    let mut cursor = Cursor::new(frame, 0);
    let header = cursor.take(1, "header")?[0];
    let class = cursor.take(1, "class")?[0];
    let method = cursor.take(1, "method")?[0];

    Ok(FrameHeader {
        is_event: header & EVENT_FLAG != 0,
        routing: header & ROUTING_MASK,
        class,
        method,
    })
}

/// Decode one frame against the layout table of `T`.
///
/// The event flag is reported in the returned header; it does not select
/// the table. Use [`decode_message`] for device-to-host traffic, where it
/// does.
pub fn decode_frame<T: MessageSet>(
    frame: &[u8],
    options: &DecodeOptions,
) -> Result<(FrameHeader, T), ProtocolError> {
    let header = decode_header(frame)?;
    let message = decode_payload::<T>(&header, frame, options)?;
    Ok((header, message))
}

fn decode_payload<T: MessageSet>(
    header: &FrameHeader,
    frame: &[u8],
    options: &DecodeOptions,
) -> Result<T, ProtocolError> {
    let layout = T::lookup(header.class, header.method).ok_or(
        ProtocolError::UnknownMessageType {
            kind: T::KIND,
            class: header.class,
            method: header.method,
        },
    )?;

    let mut cursor = Cursor::new(frame, HEADER_SIZE);
    let mut values = Vec::with_capacity(layout.fields.len());
    for spec in layout.fields {
        values.push(spec.ty.read(&mut cursor, spec.name)?);
    }

    let remaining = cursor.remaining();
    if remaining > 0 {
        match options.trailing_bytes {
            TrailingBytes::Reject => {
                return Err(ProtocolError::TrailingBytes {
                    offset: cursor.position(),
                    remaining,
                });
            }
            TrailingBytes::Ignore => {
                trace!("{}: ignoring {} trailing bytes", layout.name, remaining);
            }
        }
    }

    T::from_values(layout, values)
}

/// Decode a device-to-host frame with strict options.
pub fn decode_message(frame: &[u8]) -> Result<Message, ProtocolError> {
    decode_message_with(frame, &DecodeOptions::default())
}

/// Decode a device-to-host frame: events when the event flag is set,
/// responses otherwise.
pub fn decode_message_with(
    frame: &[u8],
    options: &DecodeOptions,
) -> Result<Message, ProtocolError> {
    let header = decode_header(frame)?;
    if header.is_event {
        decode_payload::<Event>(&header, frame, options).map(Message::Event)
    } else {
        decode_payload::<Response>(&header, frame, options).map(Message::Response)
    }
}

/// Decode a host-to-device frame with strict options.
pub fn decode_command(frame: &[u8]) -> Result<Command, ProtocolError> {
    decode_command_with(frame, &DecodeOptions::default())
}

/// Decode a host-to-device frame. Commands never carry the event flag.
pub fn decode_command_with(
    frame: &[u8],
    options: &DecodeOptions,
) -> Result<Command, ProtocolError> {
    let header = decode_header(frame)?;
    if header.is_event {
        return Err(ProtocolError::UnexpectedEvent {
            class: header.class,
            method: header.method,
        });
    }
    decode_payload::<Command>(&header, frame, options)
}

/// Encode a typed message into a codec frame.
///
/// Header routing bits are written as zero.
pub fn encode_frame<T: MessageSet>(is_event: bool, msg: &T) -> Result<Bytes, ProtocolError> {
    let layout = msg.layout()?;
    let values = msg.to_values();

    let mut frame = BytesMut::with_capacity(HEADER_SIZE + layout.min_payload_len());
    frame.put_u8(if is_event { EVENT_FLAG } else { 0 });
    frame.put_u8(layout.class);
    frame.put_u8(layout.method);
    encode_fields(layout, &values, &mut frame)?;

    Ok(frame.freeze())
}

fn encode_fields(
    layout: &MessageLayout,
    values: &[Value],
    buf: &mut BytesMut,
) -> Result<(), ProtocolError> {
    if values.len() != layout.fields.len() {
        return Err(ProtocolError::LayoutMismatch {
            message: layout.name,
            field: "*",
        });
    }
    for (spec, value) in layout.fields.iter().zip(values) {
        spec.ty.write(value, buf, layout.name, spec.name)?;
    }
    Ok(())
}

/// Encode a device-to-host message.
pub fn encode_message(msg: &Message) -> Result<Bytes, ProtocolError> {
    match msg {
        Message::Response(rsp) => encode_frame(false, rsp),
        Message::Event(evt) => encode_frame(true, evt),
    }
}

/// Encode a host-to-device command.
pub fn encode_command(cmd: &Command) -> Result<Bytes, ProtocolError> {
    encode_frame(false, cmd)
}

/// Generic view of a decoded message: name, key and named field values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedFrame {
    pub name: &'static str,
    pub kind: MessageKind,
    pub class: u8,
    pub method: u8,
    pub is_event: bool,
    #[serde(serialize_with = "fields_as_map")]
    pub fields: Vec<(&'static str, Value)>,
}

fn fields_as_map<S: Serializer>(
    fields: &[(&'static str, Value)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(fields.iter().map(|(name, value)| (name, value)))
}

impl DecodedFrame {
    /// Look up a field value by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, value)| value)
    }
}

impl fmt::Display for DecodedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{:02X}:{:02X}]",
            self.kind, self.name, self.class, self.method
        )?;
        for (name, value) in &self.fields {
            write!(f, " {}={}", name, value)?;
        }
        Ok(())
    }
}

/// Describe a typed message field by field.
pub fn describe<T: MessageSet>(is_event: bool, msg: &T) -> Result<DecodedFrame, ProtocolError> {
    let layout = msg.layout()?;
    let values = msg.to_values();
    if values.len() != layout.fields.len() {
        return Err(ProtocolError::LayoutMismatch {
            message: layout.name,
            field: "*",
        });
    }

    Ok(DecodedFrame {
        name: layout.name,
        kind: layout.kind,
        class: layout.class,
        method: layout.method,
        is_event,
        fields: layout.fields.iter().map(|f| f.name).zip(values).collect(),
    })
}

/// Describe a device-to-host message.
pub fn describe_message(msg: &Message) -> Result<DecodedFrame, ProtocolError> {
    match msg {
        Message::Response(rsp) => describe(false, rsp),
        Message::Event(evt) => describe(true, evt),
    }
}
