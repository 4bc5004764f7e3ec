//! Identity and pagination building blocks for the mystoreos admin API.
//!
//! - [`SnowflakeId`] and the [`IdGenerator`] implementations mint roughly
//!   time-ordered 64-bit IDs: 41 bits of milliseconds since
//!   [`STORE_EPOCH`], a 10-bit machine tag, and a 12-bit per-millisecond
//!   sequence.
//! - [`Gid`] gives a raw ID a typed external name,
//!   `gid://mystoreos/<EntityType>/<id>`, with a compact base64 form.
//! - [`CursorCodec`], [`KeysetCursor`], and [`PageResponse`] implement opaque
//!   cursor tokens and keyset pagination over `(created_at, id)`.
//!
//! ## Features
//!
//! - `tracing`: emit `tracing` events for clock regressions, sequence
//!   exhaustion, and rejected cursors.
//! - `parking-lot`: use `parking_lot::Mutex` in [`LockGenerator`].
//! - `cache-padded`: pad generator state to a cache line.
//!
//! ## Example
//!
//! ```
//! use storeid::{Gid, IdGenerator, LockGenerator};
//!
//! let generator = LockGenerator::new(7)?;
//! let id = generator.generate_id();
//! assert_eq!(id.machine_tag(), 7);
//!
//! let gid = Gid::product(id.to_raw());
//! assert_eq!(Gid::parse(&gid.to_string())?, gid);
//! # Ok::<(), storeid::Error>(())
//! ```

pub mod cursor;
mod error;
pub mod generator;
pub mod gid;
mod id;
mod time;

pub use crate::cursor::{
    CursorCodec, CursorError, CursorKey, InvalidReason, KeysetCursor, PageError, PageInfo,
    PageLimits, PageParams, PageResponse,
};
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::gid::{EntityType, Gid, GidError, NAMESPACE, PREFIX, SCHEME};
pub use crate::id::*;
pub use crate::time::*;
