mod atomic;
mod error;
mod interface;
mod lock;
mod mutex;

pub use atomic::*;
pub use error::*;
pub use interface::{ClockRegression, IdGenerator};
pub use lock::*;

/// The default process-wide generator: mutex-guarded, reading the system
/// clock relative to [`STORE_EPOCH`](crate::STORE_EPOCH).
pub type Generator = LockGenerator<crate::WallClock>;
