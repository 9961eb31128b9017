//! Shared type definitions for the BGAPI frame codec.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::field::{FieldType, Value, WireField};
use crate::layout::MessageSet;
use crate::messages::{Event, Response};

/// Codec frame prefix: header byte, command class, command method.
pub const HEADER_SIZE: usize = 3;

/// Event flag in the header byte.
pub const EVENT_FLAG: u8 = 0x80;

/// Header bits below the event flag. They belong to the framing layer and
/// are written as zero by the codec.
pub const ROUTING_MASK: u8 = 0x7F;

/// Bluetooth device address length.
pub const BD_ADDR_LEN: usize = 6;

/// Maximum length of a `uint8array` field.
pub const MAX_ARRAY_LEN: usize = u8::MAX as usize;

/// Direction/role of a message within a protocol.
///
/// BGAPI reuses (class, method) numbers across kinds: a command, its
/// response and an unrelated event can all share one pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Host to device request.
    Command,
    /// Device reply to a command.
    Response,
    /// Unsolicited device notification.
    Event,
}

impl MessageKind {
    /// Returns true for the kind carried with the event flag set.
    pub fn is_event(self) -> bool {
        self == MessageKind::Event
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            MessageKind::Command => "command",
            MessageKind::Response => "response",
            MessageKind::Event => "event",
        })
    }
}

/// Bluetooth device address.
///
/// Stored in wire order (least significant byte first) and displayed in
/// the usual most-significant-first colon notation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BdAddr(pub [u8; BD_ADDR_LEN]);

impl BdAddr {
    /// Build an address from its display order (`[0xAA, ..]` for `AA:..`).
    pub fn from_display_order(mut bytes: [u8; BD_ADDR_LEN]) -> Self {
        bytes.reverse();
        BdAddr(bytes)
    }

    /// Address bytes in wire order.
    pub fn as_bytes(&self) -> &[u8; BD_ADDR_LEN] {
        &self.0
    }
}

impl fmt::Display for BdAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            b[5], b[4], b[3], b[2], b[1], b[0]
        )
    }
}

impl Serialize for BdAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl WireField for BdAddr {
    const FIELD_TYPE: FieldType = FieldType::Address;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Address(addr) => Some(addr),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::Address(*self)
    }
}

/// Fixed-width text field of `N` bytes, NUL padded on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FixedText<const N: usize>(pub String);

impl<const N: usize> FixedText<N> {
    pub fn new(text: impl Into<String>) -> Self {
        FixedText(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<const N: usize> WireField for FixedText<N> {
    const FIELD_TYPE: FieldType = FieldType::Text(N);

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Text(text) => Some(FixedText(text)),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::Text(self.0.clone())
    }
}

/// Byte run covering the rest of the payload. Only valid as a last field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Remainder(pub Vec<u8>);

impl WireField for Remainder {
    const FIELD_TYPE: FieldType = FieldType::Remainder;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bytes(bytes) => Some(Remainder(bytes)),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::Bytes(self.0.clone())
    }
}

/// A decoded device-to-host message: either a response or an event.
///
/// Which table a frame is looked up in depends only on the event flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Reply to a command (event flag clear).
    Response(Response),
    /// Unsolicited notification (event flag set).
    Event(Event),
}

impl Message {
    /// Returns true if this message was carried with the event flag.
    pub fn is_event(&self) -> bool {
        matches!(self, Message::Event(_))
    }

    /// Returns the message kind.
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Response(_) => MessageKind::Response,
            Message::Event(_) => MessageKind::Event,
        }
    }

    /// Returns the (class, method) key for this message.
    pub fn class_method(&self) -> (u8, u8) {
        match self {
            Message::Response(rsp) => rsp.class_method(),
            Message::Event(evt) => evt.class_method(),
        }
    }
}

impl From<Response> for Message {
    fn from(value: Response) -> Self {
        Message::Response(value)
    }
}

impl From<Event> for Message {
    fn from(value: Event) -> Self {
        Message::Event(value)
    }
}

wire_enum! {
    /// Bluetooth address type.
    pub enum AddressType {
        /// Public device address.
        Public = 0,
        /// Random device address.
        Random = 1,
    }
}

wire_enum! {
    /// GAP discoverable mode used when advertising.
    pub enum GapDiscoverableMode {
        /// Not discoverable.
        NonDiscoverable = 0,
        /// Discoverable using limited scanning mode.
        LimitedDiscoverable = 1,
        /// Discoverable using general scanning mode.
        GeneralDiscoverable = 2,
        /// Same as non-discoverable, advertising data is broadcast.
        Broadcast = 3,
        /// User defined advertisement data.
        UserData = 4,
        /// Enhanced broadcasting flag.
        EnhancedBroadcasting = 0x80,
    }
}

wire_enum! {
    /// GAP connectable mode used when advertising.
    pub enum GapConnectableMode {
        /// Not connectable.
        NonConnectable = 0,
        /// Directed connectable.
        DirectedConnectable = 1,
        /// Undirected connectable.
        UndirectedConnectable = 2,
        /// Scannable, non-connectable.
        ScannableNonConnectable = 3,
    }
}

wire_enum! {
    /// GAP discover procedure mode.
    pub enum GapDiscoverMode {
        /// Discover only limited discoverable devices.
        Limited = 0,
        /// Discover limited and generic discoverable devices.
        Generic = 1,
        /// Discover all devices.
        Observation = 2,
    }
}

wire_enum! {
    /// Origin of an attribute value reported by the attribute client.
    pub enum AttributeValueType {
        /// Value was read.
        Read = 0,
        /// Value was notified.
        Notify = 1,
        /// Value was indicated.
        Indicate = 2,
        /// Value was read by type.
        ReadByType = 3,
        /// Value was read as a blob.
        ReadBlob = 4,
        /// Value was indicated and the remote expects a confirmation.
        IndicateRspReq = 5,
    }
}

wire_enum! {
    /// Reason a local attribute value changed.
    pub enum AttributeChangeReason {
        /// Remote device wrote with a write request.
        WriteRequest = 0,
        /// Remote device wrote with a write command.
        WriteCommand = 1,
        /// Write request to a user attribute; the host must answer it.
        WriteRequestUser = 2,
    }
}

wire_enum! {
    /// Security manager input/output capabilities.
    pub enum SmpIoCapabilities {
        DisplayOnly = 0,
        DisplayYesNo = 1,
        KeyboardOnly = 2,
        NoInputNoOutput = 3,
        KeyboardDisplay = 4,
    }
}

wire_enum! {
    /// Advertising packet type reported in scan responses.
    pub enum ScanResponseType {
        /// Connectable advertisement packet.
        ConnectableAdvertisement = 0,
        /// Non connectable advertisement packet.
        NonConnectableAdvertisement = 2,
        /// Scan response packet.
        ScanResponse = 4,
        /// Discoverable advertisement packet.
        DiscoverableAdvertisement = 6,
    }
}
