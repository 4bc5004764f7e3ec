use core::fmt;
use core::marker::PhantomData;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Serialize, de::DeserializeOwned};

use crate::cursor::{CursorError, InvalidReason};

/// Checks a decoded payload. `Err` carries a short static reason.
pub type Validator<T> = fn(&T) -> Result<(), &'static str>;

/// Opaque token codec for keyset pagination.
///
/// A token is the payload serialized as JSON and then encoded as URL-safe
/// base64 without padding. Clients must treat tokens as opaque and pass them
/// back unchanged.
///
/// The codec is stateless; `new` and `with_validator` are `const`, so codecs
/// are usually declared as `static`s next to the handler that uses them.
///
/// # Example
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use storeid::CursorCodec;
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// struct Offset {
///     position: u32,
/// }
///
/// static CODEC: CursorCodec<Offset> = CursorCodec::with_validator(|c| {
///     if c.position == 0 { Err("missing position") } else { Ok(()) }
/// });
///
/// let token = CODEC.encode(&Offset { position: 7 }).unwrap();
/// assert_eq!(CODEC.decode(&token).unwrap(), Some(Offset { position: 7 }));
/// assert_eq!(CODEC.decode("").unwrap(), None);
/// assert!(CODEC.decode("garbage!").is_err());
/// ```
pub struct CursorCodec<T> {
    validate: Option<Validator<T>>,
    _payload: PhantomData<fn() -> T>,
}

impl<T> CursorCodec<T> {
    /// A codec that accepts any payload that deserializes.
    pub const fn new() -> Self {
        Self {
            validate: None,
            _payload: PhantomData,
        }
    }

    /// A codec that runs `validate` on every successfully decoded payload.
    pub const fn with_validator(validate: Validator<T>) -> Self {
        Self {
            validate: Some(validate),
            _payload: PhantomData,
        }
    }
}

impl<T> CursorCodec<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Encodes `payload` into an opaque token.
    ///
    /// Encoding is deterministic for a given payload.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::Encode`] if the payload fails to serialize.
    pub fn encode(&self, payload: &T) -> Result<String, CursorError> {
        let bytes = serde_json::to_vec(payload).map_err(CursorError::Encode)?;
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Decodes a token.
    ///
    /// `""` means "no cursor supplied" and yields `Ok(None)`: the caller
    /// starts from the beginning of the collection.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::InvalidCursor`] if the token is not valid
    /// base64, does not deserialize into `T`, or fails the validator.
    pub fn decode(&self, token: &str) -> Result<Option<T>, CursorError> {
        if token.is_empty() {
            return Ok(None);
        }

        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| reject(InvalidReason::Encoding))?;
        let payload: T =
            serde_json::from_slice(&bytes).map_err(|_| reject(InvalidReason::Structure))?;

        if let Some(validate) = self.validate {
            validate(&payload).map_err(|why| reject(InvalidReason::Rejected(why)))?;
        }
        Ok(Some(payload))
    }
}

fn reject(reason: InvalidReason) -> CursorError {
    #[cfg(feature = "tracing")]
    tracing::debug!(%reason, "rejected pagination cursor");
    CursorError::InvalidCursor { reason }
}

impl<T> Default for CursorCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for CursorCodec<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for CursorCodec<T> {}

impl<T> fmt::Debug for CursorCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorCodec")
            .field("payload", &core::any::type_name::<T>())
            .field("validated", &self.validate.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Position {
        offset: u32,
    }

    static PLAIN: CursorCodec<Position> = CursorCodec::new();
    static CHECKED: CursorCodec<Position> = CursorCodec::with_validator(|p| {
        if p.offset == 0 {
            Err("missing offset")
        } else {
            Ok(())
        }
    });

    fn reason(err: CursorError) -> InvalidReason {
        match err {
            CursorError::InvalidCursor { reason } => reason,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn token_is_unpadded_url_safe_json() {
        let token = PLAIN.encode(&Position { offset: 3 }).unwrap();
        assert_eq!(token, URL_SAFE_NO_PAD.encode(br#"{"offset":3}"#));
        assert!(!token.contains('='));
    }

    #[test]
    fn encoding_is_deterministic() {
        let a = PLAIN.encode(&Position { offset: 99 }).unwrap();
        let b = PLAIN.encode(&Position { offset: 99 }).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_token_is_no_cursor() {
        assert_eq!(PLAIN.decode("").unwrap(), None);
        assert_eq!(CHECKED.decode("").unwrap(), None);
    }

    #[test]
    fn garbage_is_invalid_encoding() {
        let err = PLAIN.decode("%%% not a cursor %%%").unwrap_err();
        assert!(err.is_invalid_cursor());
        assert_eq!(reason(err), InvalidReason::Encoding);
    }

    #[test]
    fn padded_token_is_rejected() {
        let padded = base64::engine::general_purpose::URL_SAFE.encode(br#"{"offset":10}"#);
        assert!(padded.ends_with('='));
        assert_eq!(reason(PLAIN.decode(&padded).unwrap_err()), InvalidReason::Encoding);
    }

    #[test]
    fn wrong_shape_is_invalid_structure() {
        for json in [&b"not json"[..], br#"{"offset":"three"}"#, br#"{}"#, br#"[]"#] {
            let token = URL_SAFE_NO_PAD.encode(json);
            assert_eq!(reason(PLAIN.decode(&token).unwrap_err()), InvalidReason::Structure);
        }
    }

    #[test]
    fn validator_rejection_is_invalid_cursor() {
        let token = CHECKED.encode(&Position { offset: 0 }).unwrap();
        let err = CHECKED.decode(&token).unwrap_err();
        assert_eq!(err.to_string(), "invalid cursor: missing offset");
        assert_eq!(reason(err), InvalidReason::Rejected("missing offset"));

        // Without a validator the same token is accepted.
        assert_eq!(PLAIN.decode(&token).unwrap(), Some(Position { offset: 0 }));
    }

    #[test]
    fn round_trip_with_validator() {
        for offset in [1, 42, u32::MAX] {
            let token = CHECKED.encode(&Position { offset }).unwrap();
            assert_eq!(CHECKED.decode(&token).unwrap(), Some(Position { offset }));
        }
    }
}
