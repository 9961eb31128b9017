//! Error types for the BGAPI frame codec.

use thiserror::Error;

use crate::types::MessageKind;

/// Protocol-level errors raised while decoding or encoding a single frame.
///
/// Every variant carries the position or key that caused it, so a caller
/// can log a useful diagnostic and then drop the frame.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The frame is shorter than its declared layout requires.
    #[error("Malformed frame: field '{field}' at offset {offset} needs {needed} bytes, {available} available")]
    MalformedFrame {
        field: &'static str,
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// No layout is registered for this (class, method) pair.
    #[error("Unknown {kind} message type: class=0x{class:02X} method=0x{method:02X}")]
    UnknownMessageType {
        kind: MessageKind,
        class: u8,
        method: u8,
    },

    /// An enumerated field holds a value outside its code table.
    #[error("Unknown {table} code 0x{value:02X} in field '{field}' at offset {offset}")]
    UnknownEnumCode {
        table: &'static str,
        field: &'static str,
        offset: usize,
        value: u8,
    },

    /// Bytes remain after every declared field was consumed.
    #[error("Trailing bytes: {remaining} bytes left at offset {offset}")]
    TrailingBytes { offset: usize, remaining: usize },

    /// A fixed-width text field is not valid UTF-8.
    #[error("Invalid text in field '{field}' at offset {offset}")]
    InvalidText { field: &'static str, offset: usize },

    /// A fixed-width text value holds a NUL, which decoding would strip.
    #[error("Text in field '{field}' contains NUL")]
    TextContainsNul { field: &'static str },

    /// A command frame arrived with the event flag set.
    #[error("Unexpected event flag on command class=0x{class:02X} method=0x{method:02X}")]
    UnexpectedEvent { class: u8, method: u8 },

    /// A field value does not fit its declared wire width.
    #[error("Field '{field}' too long: {len} bytes (max: {max})")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// Frame payload exceeds what the wire header can describe.
    #[error("Frame too large: {0} bytes (max: {1})")]
    FrameTooLarge(usize, usize),

    /// Technology type does not fit the 4 bit wire header field.
    #[error("Invalid technology type: {0} (max: 15)")]
    InvalidTechnology(u8),

    /// A typed message and its layout table disagree on a field.
    #[error("Layout mismatch in {message}: field '{field}'")]
    LayoutMismatch {
        message: &'static str,
        field: &'static str,
    },
}

impl ProtocolError {
    /// Returns true if the error was caused by a short buffer.
    pub fn is_underrun(&self) -> bool {
        matches!(self, ProtocolError::MalformedFrame { .. })
    }
}

/// Errors raised by the stream framer.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Underlying transport failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream carried a frame the codec rejects.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

wire_enum! {
    /// Command result code carried by BGAPI responses and some events.
    ///
    /// Encoded as one byte on the wire. The values are the low byte of the
    /// BGAPI error class 0x01xx; zero means success.
    pub enum ResponseCode {
        /// Operation succeeded.
        Success = 0x00,
        /// Command contained an invalid parameter.
        InvalidParameter = 0x80,
        /// Device is in the wrong state to accept the command.
        WrongState = 0x81,
        /// Device ran out of memory.
        OutOfMemory = 0x82,
        /// Feature is not implemented.
        NotImplemented = 0x83,
        /// Command was not recognised.
        InvalidCommand = 0x84,
        /// Command or procedure timed out.
        Timeout = 0x85,
        /// Connection handle is not connected.
        NotConnected = 0x86,
        /// Command would overflow a buffer.
        Flow = 0x87,
        /// User attribute was accessed through the API.
        UserAttribute = 0x88,
        /// License key is invalid.
        InvalidLicenseKey = 0x89,
        /// Command maximum length exceeded.
        CommandTooLong = 0x8A,
        /// Bonding procedure cannot start, all bond slots are used.
        OutOfBonds = 0x8B,
        /// Script overflow.
        ScriptOverflow = 0x8C,
    }
}

impl ResponseCode {
    /// Returns true if this code indicates success.
    pub fn is_success(self) -> bool {
        self == ResponseCode::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_code_conversion() {
        assert_eq!(ResponseCode::try_from(0x00), Ok(ResponseCode::Success));
        assert_eq!(ResponseCode::try_from(0x85), Ok(ResponseCode::Timeout));
        assert_eq!(ResponseCode::try_from(0x42), Err(0x42));
        assert_eq!(u8::from(ResponseCode::OutOfBonds), 0x8B);
        assert!(ResponseCode::Success.is_success());
        assert!(!ResponseCode::WrongState.is_success());
    }

    #[test]
    fn test_error_display() {
        let err = ProtocolError::UnknownMessageType {
            kind: MessageKind::Response,
            class: 0x05,
            method: 0x7F,
        };
        assert_eq!(
            err.to_string(),
            "Unknown response message type: class=0x05 method=0x7F"
        );

        let err = ProtocolError::MalformedFrame {
            field: "count",
            offset: 4,
            needed: 1,
            available: 0,
        };
        assert!(err.is_underrun());
        assert_eq!(
            err.to_string(),
            "Malformed frame: field 'count' at offset 4 needs 1 bytes, 0 available"
        );
    }
}
