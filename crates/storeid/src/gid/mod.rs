//! Typed global identifiers (GIDs).
//!
//! A GID pairs an [`EntityType`] with a raw `u64` (usually minted by an
//! [`IdGenerator`](crate::IdGenerator)) and gives it a stable external text
//! form, `gid://mystoreos/<EntityType>/<id>`, plus a compact URL-safe base64
//! form of that text.

mod entity;
mod error;
mod global_id;
pub mod serde;

pub use entity::*;
pub use error::*;
pub use global_id::*;

/// URI scheme of canonical GID text.
pub const SCHEME: &str = "gid";

/// Application namespace of canonical GID text.
pub const NAMESPACE: &str = "mystoreos";

/// `gid://`, used to tell canonical text apart from the compact form.
pub const SCHEME_PREFIX: &str = "gid://";

/// The full prefix every canonical GID starts with: `gid://mystoreos/`.
pub const PREFIX: &str = "gid://mystoreos/";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_scheme_and_namespace() {
        assert_eq!(PREFIX, format!("{SCHEME}://{NAMESPACE}/"));
        assert!(PREFIX.starts_with(SCHEME_PREFIX));
    }
}
