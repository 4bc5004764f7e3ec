use core::fmt;

/// Errors produced while encoding or decoding a pagination cursor.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CursorError {
    /// The payload could not be serialized.
    ///
    /// Not expected for plain `{created_at, id}` payloads.
    #[error("failed to encode cursor: {0}")]
    Encode(#[source] serde_json::Error),

    /// The token is not a cursor this codec produced, or its payload failed
    /// validation.
    #[error("invalid cursor: {reason}")]
    InvalidCursor { reason: InvalidReason },
}

impl CursorError {
    /// Returns `true` for caller-correctable token errors.
    pub fn is_invalid_cursor(&self) -> bool {
        matches!(self, Self::InvalidCursor { .. })
    }
}

/// What was wrong with a rejected cursor token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum InvalidReason {
    /// Not URL-safe unpadded base64.
    Encoding,
    /// Decoded bytes do not deserialize into the payload type.
    Structure,
    /// The payload deserialized but the codec's validator rejected it.
    Rejected(&'static str),
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encoding => f.write_str("bad encoding"),
            Self::Structure => f.write_str("bad structure"),
            Self::Rejected(why) => f.write_str(why),
        }
    }
}

/// Errors produced while reading page parameters from a request.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum PageError {
    /// `limit` is not an integer, or is less than 1.
    #[error("invalid limit {value:?}")]
    InvalidLimit { value: String },
}
