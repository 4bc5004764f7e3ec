use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Store epoch: Monday, January 1, 2024 00:00:00 UTC
///
/// Every [`SnowflakeId`] timestamp is measured in milliseconds from this
/// instant.
///
/// [`SnowflakeId`]: crate::SnowflakeId
pub const STORE_EPOCH: Duration = Duration::from_millis(1_704_067_200_000);

/// A trait for time sources that return a wall-clock timestamp relative to a
/// fixed origin.
///
/// This abstraction allows you to plug in the real system clock or a mocked
/// time source in tests. The unit is expected to be **milliseconds**.
///
/// # Example
///
/// ```
/// use storeid::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the configured epoch.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for std::sync::Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

/// A time source backed by [`SystemTime::now`], offset from a fixed epoch.
///
/// Every call reads the system clock, so NTP corrections and manual
/// adjustments are observed as they happen, including backward steps. How a
/// generator reacts to a backward step is controlled by
/// [`ClockRegression`](crate::ClockRegression).
///
/// A system time earlier than the epoch reads as `0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WallClock {
    epoch_millis: u64,
}

impl Default for WallClock {
    /// Constructs a wall clock aligned to [`STORE_EPOCH`].
    fn default() -> Self {
        Self::with_epoch(STORE_EPOCH)
    }
}

impl WallClock {
    /// Constructs a wall clock using `epoch` (a [`Duration`] since
    /// 1970-01-01 UTC) as the origin (t = 0).
    pub const fn with_epoch(epoch: Duration) -> Self {
        Self {
            epoch_millis: epoch.as_millis() as u64,
        }
    }

    /// Returns the configured epoch as milliseconds since the Unix epoch.
    pub const fn epoch_millis(&self) -> u64 {
        self.epoch_millis
    }
}

impl TimeSource for WallClock {
    fn current_millis(&self) -> u64 {
        let unix_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64);
        unix_millis.saturating_sub(self.epoch_millis)
    }
}
