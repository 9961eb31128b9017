//! Decoder configuration.

use serde::{Deserialize, Serialize};

/// What to do with payload bytes left after the last declared field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailingBytes {
    /// Fail with `ProtocolError::TrailingBytes`.
    #[default]
    Reject,
    /// Drop the extra bytes.
    Ignore,
}

/// Options for the decode functions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeOptions {
    #[serde(default)]
    pub trailing_bytes: TrailingBytes,
}

impl DecodeOptions {
    /// Strict decoding: trailing bytes are an error.
    pub fn strict() -> Self {
        Self::default()
    }

    /// Lenient decoding: trailing bytes are ignored.
    pub fn lenient() -> Self {
        Self {
            trailing_bytes: TrailingBytes::Ignore,
        }
    }
}
