use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

#[cfg(feature = "tracing")]
use crate::generator::interface::Wait;
#[cfg(not(feature = "parking-lot"))]
use crate::generator::mutex::PoisonError;
use crate::{
    SnowflakeId,
    generator::{
        ClockRegression, GeneratorError, IdGenerator,
        error::check_machine_tag,
        interface::{Step, advance},
        mutex::{Mutex, MutexGuard},
    },
    time::{TimeSource, WallClock},
};

#[derive(Debug, Default)]
struct State {
    last_timestamp: Option<u64>,
    sequence: u64,
}

/// A lock-based Snowflake ID generator suitable for multi-threaded
/// environments.
///
/// The `(last_timestamp, sequence)` state sits behind a single mutex; each
/// call to [`generate`](Self::generate) reads the clock, advances the state
/// and packs the ID inside one critical section. Cloning the generator shares
/// the same state.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Strictly increasing IDs while the clock does not move backward
/// - ✅ Fair hand-off between contending threads
///
/// ## See Also
/// - [`AtomicGenerator`](crate::AtomicGenerator)
#[derive(Clone)]
pub struct LockGenerator<T = WallClock>
where
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: Arc<crossbeam_utils::CachePadded<Mutex<State>>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Arc<Mutex<State>>,
    machine_tag: u16,
    regression: ClockRegression,
    time: T,
}

impl LockGenerator<WallClock> {
    /// Creates a generator that reads the system clock relative to
    /// [`STORE_EPOCH`](crate::STORE_EPOCH).
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::InvalidMachineTag`] if `machine_tag` is
    /// greater than 1023.
    ///
    /// # Example
    /// ```
    /// use storeid::{IdGenerator, LockGenerator, extract_machine_tag};
    ///
    /// let generator = LockGenerator::new(42).unwrap();
    /// let a = generator.generate();
    /// let b = generator.generate();
    ///
    /// assert!(a < b);
    /// assert_eq!(extract_machine_tag(a), 42);
    /// assert!(LockGenerator::new(1024).is_err());
    /// ```
    pub fn new(machine_tag: u16) -> Result<Self, GeneratorError> {
        Self::with_clock(machine_tag, WallClock::default())
    }
}

impl<T> LockGenerator<T>
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
        tracing::debug!(machine_tag, "lock generator initialized");

        Ok(Self {
            #[cfg(feature = "cache-padded")]
            state: Arc::new(crossbeam_utils::CachePadded::new(Mutex::new(State::default()))),
            #[cfg(not(feature = "cache-padded"))]
            state: Arc::new(Mutex::new(State::default())),
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
    /// If the sequence for the current millisecond is exhausted (or the clock
    /// is behind and the policy is [`ClockRegression::Stall`]), the call
    /// spins with the lock held until the clock advances.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn generate(&self) -> u64 {
        let mut state = self.lock();
        let mut spinning = false;

        loop {
            let now = self.time.current_millis() & SnowflakeId::TIMESTAMP_MASK;
            match advance(state.last_timestamp, state.sequence, now, self.regression) {
                Step::Ready {
                    timestamp,
                    sequence,
                } => return self.commit(&mut state, timestamp, sequence),
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
                    return self.commit(&mut state, timestamp, 0);
                }
                Step::Wait(_reason) => {
                    if !spinning {
                        spinning = true;
                        #[cfg(feature = "tracing")]
                        match _reason {
                            Wait::Exhausted => tracing::debug!(
                                machine_tag = self.machine_tag,
                                "sequence exhausted; waiting for next millisecond"
                            ),
                            Wait::Behind => tracing::warn!(
                                machine_tag = self.machine_tag,
                                "clock behind last timestamp; stalling"
                            ),
                        }
                    }
                    core::hint::spin_loop();
                }
            }
        }
    }

    fn commit(&self, state: &mut State, timestamp: u64, sequence: u64) -> u64 {
        state.last_timestamp = Some(timestamp);
        state.sequence = sequence;
        SnowflakeId::new(timestamp, u64::from(self.machine_tag), sequence).to_raw()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        #[cfg(feature = "parking-lot")]
        {
            self.state.lock()
        }
        // Every write to `State` completes before the guard drops, so a
        // poisoned lock still holds a consistent state.
        #[cfg(not(feature = "parking-lot"))]
        {
            self.state.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }
}

impl<T> IdGenerator for LockGenerator<T>
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
