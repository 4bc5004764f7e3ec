use core::cmp::Ordering;

use crate::SnowflakeId;

/// A minimal interface for minting Snowflake IDs.
///
/// One generator is built per process from configuration and handed to every
/// component that needs fresh identifiers, either as a generic parameter or as
/// `&dyn IdGenerator` / `Arc<dyn IdGenerator>`.
///
/// Running two generators with the same machine tag at the same time breaks
/// uniqueness. Nothing detects this at runtime.
pub trait IdGenerator: Send + Sync {
    /// The machine tag embedded in every ID this generator produces.
    fn machine_tag(&self) -> u16;

    /// Generates the next ID as a raw `u64`.
    ///
    /// Never fails. When the 4096 sequence values of the current millisecond
    /// are used up, the call spins until the clock ticks over.
    fn generate(&self) -> u64;

    /// Generates the next ID wrapped in its [`SnowflakeId`] layout.
    fn generate_id(&self) -> SnowflakeId {
        SnowflakeId::from_raw(self.generate())
    }
}

impl<G: IdGenerator + ?Sized> IdGenerator for &G {
    fn machine_tag(&self) -> u16 {
        (**self).machine_tag()
    }

    fn generate(&self) -> u64 {
        (**self).generate()
    }
}

impl<G: IdGenerator + ?Sized> IdGenerator for std::sync::Arc<G> {
    fn machine_tag(&self) -> u16 {
        (**self).machine_tag()
    }

    fn generate(&self) -> u64 {
        (**self).generate()
    }
}

/// How a generator reacts when the clock reads earlier than the last
/// timestamp it issued.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ClockRegression {
    /// Reset the sequence and issue IDs at the earlier timestamp.
    ///
    /// IDs stay unique only if the regressed milliseconds were not already
    /// used, and an ID issued after the regression compares lower than the
    /// ones issued before it. A millisecond whose sequence is spent is
    /// still waited out first.
    #[default]
    Follow,
    /// Spin until the clock catches up with the last issued timestamp.
    ///
    /// Keeps IDs strictly increasing at the cost of stalling the caller for
    /// the duration of the regression.
    Stall,
}

/// One transition of the `(last_timestamp, sequence)` state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    /// Issue `(timestamp, sequence)` and store it as the new state.
    Ready { timestamp: u64, sequence: u64 },
    /// Same as `Ready`, but the clock moved backward to get here.
    Rewound { timestamp: u64, last: u64 },
    /// Re-read the clock and try again.
    Wait(Wait),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Wait {
    /// Every sequence value of `last` is spent.
    Exhausted,
    /// The clock is behind `last` and the policy is [`ClockRegression::Stall`].
    Behind,
}

/// Computes the next state from the previous one and the current clock
/// reading `now`.
pub(crate) fn advance(
    last: Option<u64>,
    sequence: u64,
    now: u64,
    regression: ClockRegression,
) -> Step {
    let Some(last) = last else {
        return Step::Ready {
            timestamp: now,
            sequence: 0,
        };
    };

    // A spent millisecond stays spent even if the clock steps back while
    // waiting it out.
    if sequence >= SnowflakeId::SEQUENCE_MASK && now <= last {
        return Step::Wait(Wait::Exhausted);
    }

    match now.cmp(&last) {
        Ordering::Equal => Step::Ready {
            timestamp: now,
            sequence: sequence + 1,
        },
        Ordering::Greater => Step::Ready {
            timestamp: now,
            sequence: 0,
        },
        Ordering::Less => match regression {
            ClockRegression::Follow => Step::Rewound {
                timestamp: now,
                last,
            },
            ClockRegression::Stall => Step::Wait(Wait::Behind),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_call_starts_at_sequence_zero() {
        let step = advance(None, 0, 7, ClockRegression::Follow);
        assert_eq!(
            step,
            Step::Ready {
                timestamp: 7,
                sequence: 0
            }
        );
    }

    #[test]
    fn same_millisecond_increments_sequence() {
        let step = advance(Some(7), 41, 7, ClockRegression::Follow);
        assert_eq!(
            step,
            Step::Ready {
                timestamp: 7,
                sequence: 42
            }
        );
    }

    #[test]
    fn exhausted_sequence_waits() {
        let step = advance(Some(7), SnowflakeId::SEQUENCE_MASK, 7, ClockRegression::Follow);
        assert_eq!(step, Step::Wait(Wait::Exhausted));
    }

    #[test]
    fn exhausted_sequence_waits_through_regression() {
        for regression in [ClockRegression::Follow, ClockRegression::Stall] {
            assert_eq!(
                advance(Some(7), SnowflakeId::SEQUENCE_MASK, 6, regression),
                Step::Wait(Wait::Exhausted)
            );
            assert_eq!(
                advance(Some(7), SnowflakeId::SEQUENCE_MASK, 8, regression),
                Step::Ready {
                    timestamp: 8,
                    sequence: 0
                }
            );
        }
    }

    #[test]
    fn new_millisecond_resets_sequence() {
        let step = advance(Some(7), 99, 8, ClockRegression::Follow);
        assert_eq!(
            step,
            Step::Ready {
                timestamp: 8,
                sequence: 0
            }
        );
    }

    #[test]
    fn regression_follows_or_stalls() {
        assert_eq!(
            advance(Some(7), 3, 5, ClockRegression::Follow),
            Step::Rewound {
                timestamp: 5,
                last: 7
            }
        );
        assert_eq!(
            advance(Some(7), 3, 5, ClockRegression::Stall),
            Step::Wait(Wait::Behind)
        );
    }
}
