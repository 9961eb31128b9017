//! Serial stream framing.
//!
//! On the serial link every frame carries a 4 byte BGAPI header:
//! ```text
//! byte 0: | E | technology (4 bits) | length bits 8..10 |
//! byte 1: length bits 0..7
//! byte 2: class
//! byte 3: method
//! ```
//! [`BgApiCodec`] strips the length and technology bits and hands out the
//! 3 byte prefixed codec frames the rest of the crate decodes.

use bytes::{BufMut, Bytes, BytesMut};
use log::trace;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::decode_header;
use crate::error::{CodecError, ProtocolError};
use crate::types::{EVENT_FLAG, HEADER_SIZE};

/// Wire header size: 1 (flags and length high) + 1 (length low) + 1 (class) + 1 (method).
pub const WIRE_HEADER_SIZE: usize = 4;

/// Largest payload an 11-bit length can describe.
pub const MAX_PAYLOAD_SIZE: usize = 0x07FF;

/// Technology type of Bluetooth Smart devices.
pub const TECHNOLOGY_BLUETOOTH_SMART: u8 = 0;

/// Technology type of Wi-Fi devices.
pub const TECHNOLOGY_WIFI: u8 = 1;

const TECHNOLOGY_SHIFT: u8 = 3;
const TECHNOLOGY_MASK: u8 = 0x0F;
const LENGTH_HIGH_MASK: u8 = 0x07;

/// Parsed BGAPI wire header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireHeader {
    pub is_event: bool,
    pub technology: u8,
    pub payload_len: usize,
    pub class: u8,
    pub method: u8,
}

/// Decode a wire header. Returns `Ok(None)` if more data is needed.
pub fn decode_wire_header(buf: &[u8]) -> Result<Option<WireHeader>, ProtocolError> {
    if buf.len() < WIRE_HEADER_SIZE {
        return Ok(None);
    }

    let flags = buf[0];
    let payload_len = (((flags & LENGTH_HIGH_MASK) as usize) << 8) | buf[1] as usize;

    Ok(Some(WireHeader {
        is_event: flags & EVENT_FLAG != 0,
        technology: (flags >> TECHNOLOGY_SHIFT) & TECHNOLOGY_MASK,
        payload_len,
        class: buf[2],
        method: buf[3],
    }))
}

/// One frame as carried on the serial link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireFrame {
    /// Technology type from the wire header.
    pub technology: u8,
    /// Codec frame: event flag, class, method, payload.
    pub frame: Bytes,
}

impl WireFrame {
    /// Wrap a Bluetooth Smart codec frame.
    pub fn bluetooth(frame: Bytes) -> Self {
        Self {
            technology: TECHNOLOGY_BLUETOOTH_SMART,
            frame,
        }
    }
}

/// BGAPI stream codec for use with `FramedRead` / `FramedWrite`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BgApiCodec;

impl BgApiCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for BgApiCodec {
    type Item = WireFrame;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<WireFrame>, CodecError> {
        let header = match decode_wire_header(src)? {
            Some(header) => header,
            None => return Ok(None),
        };

        let total_len = WIRE_HEADER_SIZE + header.payload_len;
        if src.len() < total_len {
            src.reserve(total_len - src.len());
            return Ok(None);
        }

        let wire = src.split_to(total_len);
        trace!(
            "wire frame: technology={} class=0x{:02X} method=0x{:02X} len={}",
            header.technology,
            header.class,
            header.method,
            header.payload_len
        );

        let mut frame = BytesMut::with_capacity(HEADER_SIZE + header.payload_len);
        frame.put_u8(if header.is_event { EVENT_FLAG } else { 0 });
        frame.put_u8(header.class);
        frame.put_u8(header.method);
        frame.put_slice(&wire[WIRE_HEADER_SIZE..]);

        Ok(Some(WireFrame {
            technology: header.technology,
            frame: frame.freeze(),
        }))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<WireFrame>, CodecError> {
        if let Some(frame) = self.decode(buf)? {
            return Ok(Some(frame));
        }
        if buf.is_empty() {
            return Ok(None);
        }

        // The stream ended inside a frame.
        let available = buf.len();
        let (field, needed) = match decode_wire_header(buf)? {
            Some(header) => ("payload", WIRE_HEADER_SIZE + header.payload_len),
            None => ("wire header", WIRE_HEADER_SIZE),
        };
        buf.clear();
        Err(ProtocolError::MalformedFrame {
            field,
            offset: 0,
            needed,
            available,
        }
        .into())
    }
}

impl Encoder<WireFrame> for BgApiCodec {
    type Error = CodecError;

    fn encode(&mut self, item: WireFrame, dst: &mut BytesMut) -> Result<(), CodecError> {
        if item.technology > TECHNOLOGY_MASK {
            return Err(ProtocolError::InvalidTechnology(item.technology).into());
        }
        let header = decode_header(&item.frame)?;
        let payload = &item.frame[HEADER_SIZE..];
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(ProtocolError::FrameTooLarge(payload.len(), MAX_PAYLOAD_SIZE).into());
        }

        let mut flags = item.technology << TECHNOLOGY_SHIFT;
        flags |= (payload.len() >> 8) as u8 & LENGTH_HIGH_MASK;
        if header.is_event {
            flags |= EVENT_FLAG;
        }

        dst.reserve(WIRE_HEADER_SIZE + payload.len());
        dst.put_u8(flags);
        dst.put_u8(payload.len() as u8);
        dst.put_u8(header.class);
        dst.put_u8(header.method);
        dst.put_slice(payload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_message, encode_message};
    use crate::error::ResponseCode;
    use crate::messages::Response;
    use crate::types::Message;

    #[test]
    fn test_decode_wire_header() {
        assert_eq!(decode_wire_header(&[0x80, 0x10, 0x06]).unwrap(), None);

        let header = decode_wire_header(&[0x8D, 0x10, 0x06, 0x00]).unwrap().unwrap();
        assert_eq!(
            header,
            WireHeader {
                is_event: true,
                technology: TECHNOLOGY_WIFI,
                payload_len: 0x510,
                class: 0x06,
                method: 0x00,
            }
        );
    }

    #[test]
    fn test_split_delivery() {
        let mut codec = BgApiCodec::new();
        let mut buf = BytesMut::new();

        buf.extend_from_slice(&[0x00, 0x02]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
        buf.extend_from_slice(&[0x05, 0x07, 0x00]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
        buf.extend_from_slice(&[0x03]);

        let wire = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(wire.technology, TECHNOLOGY_BLUETOOTH_SMART);
        assert_eq!(&wire.frame[..], &[0x00, 0x05, 0x07, 0x00, 0x03][..]);
        assert!(buf.is_empty());

        assert_eq!(
            decode_message(&wire.frame).unwrap(),
            Message::Response(Response::SmWhitelistBonds {
                result: ResponseCode::Success,
                count: 3,
            })
        );
    }

    #[test]
    fn test_multiple_frames_in_one_buffer() {
        let mut codec = BgApiCodec::new();
        let mut buf = BytesMut::from(
            &[
                0x00, 0x00, 0x00, 0x01, // SystemHello response
                0x80, 0x02, 0x00, 0x06, 0x81, 0x01, // SystemProtocolError event
                0x00, 0x02, 0x05, // start of a third frame
            ][..],
        );

        let first = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&first.frame[..], &[0x00, 0x00, 0x01][..]);
        let second = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&second.frame[..], &[0x80, 0x00, 0x06, 0x81, 0x01][..]);
        assert!(decode_message(&second.frame).unwrap().is_event());

        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn test_length_high_bits() {
        let mut codec = BgApiCodec::new();
        let payload = vec![0xAB; 0x123];
        let mut frame = vec![0x80, 0x04, 0x05];
        frame.extend_from_slice(&payload);

        let mut buf = BytesMut::new();
        codec
            .encode(WireFrame::bluetooth(Bytes::from(frame.clone())), &mut buf)
            .unwrap();
        assert_eq!(&buf[..4], &[0x81, 0x23, 0x04, 0x05][..]);
        assert_eq!(buf.len(), WIRE_HEADER_SIZE + payload.len());

        let decoded = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&decoded.frame[..], &frame[..]);
    }

    #[test]
    fn test_technology_roundtrip() {
        let mut codec = BgApiCodec::new();
        let mut buf = BytesMut::new();
        let item = WireFrame {
            technology: TECHNOLOGY_WIFI,
            frame: Bytes::from_static(&[0x00, 0x01, 0x02]),
        };
        codec.encode(item.clone(), &mut buf).unwrap();
        assert_eq!(&buf[..], &[0x08, 0x00, 0x01, 0x02][..]);
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), item);
    }

    #[test]
    fn test_oversize_rejected() {
        let mut codec = BgApiCodec::new();
        let mut frame = vec![0x00, 0x02, 0x00];
        frame.resize(HEADER_SIZE + MAX_PAYLOAD_SIZE + 1, 0);

        let mut buf = BytesMut::new();
        let err = codec
            .encode(WireFrame::bluetooth(Bytes::from(frame)), &mut buf)
            .unwrap_err();
        assert!(matches!(
            err,
            CodecError::Protocol(ProtocolError::FrameTooLarge(2048, MAX_PAYLOAD_SIZE))
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_technology_out_of_range_rejected() {
        let mut codec = BgApiCodec::new();
        let mut buf = BytesMut::new();
        let item = WireFrame {
            technology: 16,
            frame: Bytes::from_static(&[0x00, 0x01, 0x02]),
        };
        let err = codec.encode(item, &mut buf).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Protocol(ProtocolError::InvalidTechnology(16))
        ));
        assert!(buf.is_empty());

        let item = WireFrame {
            technology: 15,
            frame: Bytes::from_static(&[0x00, 0x01, 0x02]),
        };
        codec.encode(item, &mut buf).unwrap();
        assert_eq!(buf[0], 0x78);
    }

    #[test]
    fn test_eof_inside_frame() {
        let mut codec = BgApiCodec::new();

        let mut buf = BytesMut::from(&[0x00, 0x02, 0x05, 0x07, 0x00][..]);
        let err = codec.decode_eof(&mut buf).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Protocol(ProtocolError::MalformedFrame {
                field: "payload",
                needed: 6,
                available: 5,
                ..
            })
        ));
        assert!(buf.is_empty());

        let mut buf = BytesMut::from(&[0x00, 0x02][..]);
        let err = codec.decode_eof(&mut buf).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Protocol(ProtocolError::MalformedFrame {
                field: "wire header",
                needed: 4,
                available: 2,
                ..
            })
        ));

        let mut buf = BytesMut::from(&[0x00, 0x00, 0x00, 0x01][..]);
        assert!(codec.decode_eof(&mut buf).unwrap().is_some());
        assert!(codec.decode_eof(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_encode_rejects_short_frame() {
        let mut codec = BgApiCodec::new();
        let mut buf = BytesMut::new();
        let err = codec
            .encode(WireFrame::bluetooth(Bytes::from_static(&[0x00, 0x05])), &mut buf)
            .unwrap_err();
        assert!(matches!(err, CodecError::Protocol(ref e) if e.is_underrun()));
    }

    #[test]
    fn test_encoded_message_through_codec() {
        let msg = Message::Response(Response::SmWhitelistBonds {
            result: ResponseCode::Success,
            count: 3,
        });
        let mut codec = BgApiCodec::new();
        let mut buf = BytesMut::new();
        codec
            .encode(WireFrame::bluetooth(encode_message(&msg).unwrap()), &mut buf)
            .unwrap();
        assert_eq!(&buf[..], &[0x00, 0x02, 0x05, 0x07, 0x00, 0x03][..]);

        let wire = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(decode_message(&wire.frame).unwrap(), msg);
    }
}
