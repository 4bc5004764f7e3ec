use crate::cursor::{CursorError, PageError};
use crate::generator::GeneratorError;
use crate::gid::GidError;

/// A result type defaulting to the crate-wide [`enum@Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors `storeid` can produce.
///
/// Each module reports its own error type; this enum unifies them for callers
/// that mix GIDs, cursors, and generators behind one `?`.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Generator(#[from] GeneratorError),

    #[error(transparent)]
    Gid(#[from] GidError),

    #[error(transparent)]
    Cursor(#[from] CursorError),

    #[error(transparent)]
    Page(#[from] PageError),
}

impl Error {
    /// Returns `true` for errors caused by client input (a bad GID, a bad
    /// cursor token, or a bad page limit) as opposed to configuration.
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::Generator(_) => false,
            Self::Gid(_) | Self::Page(_) => true,
            Self::Cursor(e) => e.is_invalid_cursor(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Gid, KeysetCursor, LockGenerator};

    fn parse_then_page(gid: &str, token: &str) -> Result<u64> {
        let gid = Gid::parse(gid)?;
        KeysetCursor::<u64>::codec().decode(token)?;
        Ok(gid.id())
    }

    #[test]
    fn question_mark_converts_module_errors() {
        assert_eq!(parse_then_page("gid://mystoreos/Product/9", "").unwrap(), 9);

        let err = parse_then_page("Product/9", "").unwrap_err();
        assert!(matches!(err, Error::Gid(GidError::MissingPrefix)));
        assert!(err.is_client_error());

        let err = parse_then_page("gid://mystoreos/Product/9", "***").unwrap_err();
        assert!(matches!(err, Error::Cursor(_)));
        assert!(err.is_client_error());
    }

    #[test]
    fn generator_errors_are_not_client_errors() {
        let err = Error::from(LockGenerator::new(4096).err().unwrap());
        assert!(!err.is_client_error());
        assert_eq!(
            err.to_string(),
            "machine tag 4096 is out of range (must be 0..=1023)"
        );
    }

    #[test]
    fn messages_pass_through() {
        let err = Error::from(GidError::MalformedBody);
        assert_eq!(err.to_string(), GidError::MalformedBody.to_string());
    }
}
