/// Reasons a GID string fails to parse.
///
/// Each variant names one specific defect so callers can report precise
/// diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum GidError {
    /// The text does not start with `gid://mystoreos/`.
    #[error("invalid GID: missing prefix {prefix}", prefix = crate::gid::PREFIX)]
    MissingPrefix,

    /// The text after the prefix is not `<EntityType>/<id>`.
    #[error("invalid GID: expected format {prefix}EntityType/id", prefix = crate::gid::PREFIX)]
    MalformedBody,

    /// The entity type segment is not in the allow-list.
    #[error("invalid GID: unknown entity type {entity_type:?}")]
    UnknownEntityType { entity_type: String },

    /// The id segment is not a base-10 `u64`.
    #[error("invalid GID: invalid ID {segment:?}")]
    InvalidId { segment: String },

    /// Compact text is not URL-safe unpadded base64 of UTF-8 bytes.
    #[error("invalid GID: {reason}")]
    InvalidEncoding { reason: String },
}
