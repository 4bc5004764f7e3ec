use portable_atomic::{AtomicU64, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    SnowflakeId,
    generator::{
        ClockRegression, GeneratorError, IdGenerator,
        error::check_machine_tag,
        interface::{Step, advance},
    },
    time::{TimeSource, WallClock},
};

/// State word before the first ID is issued.
const NEVER: u64 = u64::MAX;

const fn pack(timestamp: u64, sequence: u64) -> u64 {
    (timestamp << SnowflakeId::SEQUENCE_BITS) | sequence
}

const fn unpack(word: u64) -> (Option<u64>, u64) {
    if word == NEVER {
        (None, 0)
    } else {
        (
            Some(word >> SnowflakeId::SEQUENCE_BITS),
            word & SnowflakeId::SEQUENCE_MASK,
        )
    }
}

/// A lock-free Snowflake ID generator suitable for multi-threaded
/// environments.
///
/// The `(last_timestamp, sequence)` pair is packed into a single
/// [`AtomicU64`] and advanced with compare-and-swap, so concurrent callers
/// never block each other. A caller that loses a race re-reads the state and
/// the clock and tries again.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Strictly increasing IDs while the clock does not move backward
/// - ❌ Fair access: a contended caller may retry several times
///
/// ## See Also
/// - [`LockGenerator`](crate::LockGenerator)
pub struct AtomicGenerator<T = WallClock>
where
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<AtomicU64>,
    #[cfg(not(feature = "cache-padded"))]
    state: AtomicU64,
    machine_tag: u16,
    regression: ClockRegression,
    time: T,
}

impl AtomicGenerator<WallClock> {
    /// Creates a generator that reads the system clock relative to
    /// [`STORE_EPOCH`](crate::STORE_EPOCH).
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::InvalidMachineTag`] if `machine_tag` is
    /// greater than 1023.
    pub fn new(machine_tag: u16) -> Result<Self, GeneratorError> {
        Self::with_clock(machine_tag, WallClock::default())
    }
}

impl<T> AtomicGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator driven by a custom [`TimeSource`].
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::InvalidMachineTag`] if `machine_tag` is
    /// greater than 1023.
    pub fn with_clock(machine_tag: u16, time: T) -> Result<Self, GeneratorError> {
        let machine_tag = check_machine_tag(machine_tag)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(machine_tag, "atomic generator initialized");

        Ok(Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(AtomicU64::new(NEVER)),
            #[cfg(not(feature = "cache-padded"))]
            state: AtomicU64::new(NEVER),
            machine_tag,
            regression: ClockRegression::default(),
            time,
        })
    }

    /// Sets how the generator reacts to the clock moving backward.
    #[must_use]
    pub fn with_regression(mut self, regression: ClockRegression) -> Self {
        self.regression = regression;
        self
    }

    pub fn machine_tag(&self) -> u16 {
        self.machine_tag
    }

    pub fn regression(&self) -> ClockRegression {
        self.regression
    }

    /// Generates the next ID.
    ///
    /// Spins while the current millisecond's sequence is exhausted (or while
    /// the clock is behind under [`ClockRegression::Stall`]) and while other
    /// callers win the compare-and-swap.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn generate(&self) -> u64 {
        loop {
            // The clock is read after the state so that a state written by a
            // faster caller is never paired with an older reading.
            let current = self.state.load(Ordering::Acquire);
            let now = self.time.current_millis() & SnowflakeId::TIMESTAMP_MASK;
            let (last, sequence) = unpack(current);

            let (timestamp, sequence) = match advance(last, sequence, now, self.regression) {
                Step::Ready {
                    timestamp,
                    sequence,
                } => (timestamp, sequence),
                Step::Rewound {
                    timestamp,
                    last: _last,
                } => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        machine_tag = self.machine_tag,
                        now = timestamp,
                        last = _last,
                        "clock moved backward; resetting sequence"
                    );
                    (timestamp, 0)
                }
                Step::Wait(_) => {
                    core::hint::spin_loop();
                    continue;
                }
            };

            if self
                .state
                .compare_exchange(
                    current,
                    pack(timestamp, sequence),
                    Ordering::AcqRel,
                    Ordering::Acquire,
                )
                .is_ok()
            {
                return SnowflakeId::new(timestamp, u64::from(self.machine_tag), sequence)
                    .to_raw();
            }
            core::hint::spin_loop();
        }
    }
}

impl<T> IdGenerator for AtomicGenerator<T>
where
    T: TimeSource + Send + Sync,
{
    fn machine_tag(&self) -> u16 {
        self.machine_tag()
    }

    fn generate(&self) -> u64 {
        self.generate()
    }
}
