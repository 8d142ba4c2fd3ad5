use thiserror::Error;

/// Protocol-level error type for JT/T 808.
///
/// Every failure the codec can produce is a variant here; nothing panics
/// across the public boundary. Framing errors keep their cause distinct so
/// that a server loop can decide between dropping a frame and dropping a
/// connection.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Frame shorter than the minimum header-bearing frame (15 bytes).
    #[error("Frame too short: {actual} bytes, minimum {minimum}")]
    FrameTooShort { actual: usize, minimum: usize },

    /// First or last byte of the frame is not the 0x7E flag.
    #[error("Missing 0x7E frame flags")]
    MissingFlags,

    /// Malformed 0x7D escape sequence in the payload.
    #[error("Unescape failure: {0}")]
    UnescapeFailure(String),

    /// Recomputed XOR checksum disagrees with the trailer byte.
    #[error("Checksum mismatch: expected {expected:#04X}, calculated {calculated:#04X}")]
    ChecksumMismatch { expected: u8, calculated: u8 },

    /// Message header could not be decoded (bad BCD, inconsistent lengths).
    #[error("Header parse error: {0}")]
    HeaderParse(String),

    /// No handler registered for the message ID.
    #[error("No handler registered for message {0:#06X}")]
    UnregisteredMessage(u16),

    /// A registered decoder reported a length/TLV/consistency error.
    #[error("Body decode failure for message {msg_id:#06X}: {reason}")]
    BodyDecode { msg_id: u16, reason: String },

    /// A registered encoder failed (e.g. oversize body without segmentation).
    #[error("Body encode failure for message {msg_id:#06X}: {reason}")]
    BodyEncode { msg_id: u16, reason: String },

    /// `append` was called for a message ID that already has a handler.
    #[error("Handler already registered for message {0:#06X}")]
    DuplicateHandler(u16),

    /// Semantic error in caller-supplied values (bad phone digits, oversize
    /// parameter value, malformed time string).
    #[error("Semantic error: {0}")]
    Semantic(String),
}

impl ProtocolError {
    /// Numeric code compatible with the classic C return values.
    ///
    /// `0` is success and never produced here; everything without a classic
    /// equivalent maps to the catch-all `-1`.
    pub fn code(&self) -> i32 {
        match self {
            ProtocolError::MissingFlags | ProtocolError::UnescapeFailure(_) => -3,
            ProtocolError::ChecksumMismatch { .. } => -4,
            ProtocolError::FrameTooShort { .. } | ProtocolError::HeaderParse(_) => -5,
            ProtocolError::UnregisteredMessage(_) => -6,
            _ => -1,
        }
    }
}
