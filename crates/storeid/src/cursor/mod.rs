//! Opaque cursors and keyset pagination.
//!
//! [`CursorCodec`] turns any serde payload into a URL-safe token and back.
//! [`KeysetCursor`] is the standard payload for collections ordered by
//! `(created_at DESC, id DESC)`, and [`PageParams`] / [`PageResponse`] cover
//! the request and response ends of a list endpoint.

mod codec;
mod error;
mod keyset;
mod page;
#[cfg(test)]
mod tests;

pub use codec::*;
pub use error::*;
pub use keyset::*;
pub use page::*;
