use core::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::time::STORE_EPOCH;

/// A 64-bit Snowflake ID using the store layout
///
/// - 1 bit reserved
/// - 41 bits timestamp (ms since [`STORE_EPOCH`])
/// - 10 bits machine tag
/// - 12 bits sequence
///
/// ```text
///  Bit Index:  63           63 62            22 21              12 11             0
///              +--------------+----------------+------------------+---------------+
///  Field:      | reserved (1) | timestamp (41) | machine tag (10) | sequence (12) |
///              +--------------+----------------+------------------+---------------+
///              |<----------- MSB ----------- 64 bits ----------- LSB ------------->|
/// ```
///
/// Ordering compares the raw integer, so IDs sort by timestamp, then machine
/// tag, then sequence.
///
/// # Example
///
/// ```
/// use storeid::SnowflakeId;
///
/// let id = SnowflakeId::from_components(1000, 2, 1);
/// assert_eq!(id.timestamp(), 1000);
/// assert_eq!(id.machine_tag(), 2);
/// assert_eq!(id.sequence(), 1);
/// assert_eq!(id.to_raw(), (1000 << 22) | (2 << 12) | 1);
/// ```
#[derive(
    Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct SnowflakeId {
    id: u64,
}

impl SnowflakeId {
    /// Number of bits in the timestamp field.
    pub const TIMESTAMP_BITS: u32 = 41;

    /// Number of bits in the machine tag field.
    pub const MACHINE_TAG_BITS: u32 = 10;

    /// Number of bits in the sequence field.
    pub const SEQUENCE_BITS: u32 = 12;

    /// Bitmask for extracting the 41-bit timestamp field. Occupies bits 22
    /// through 62.
    pub const TIMESTAMP_MASK: u64 = (1 << Self::TIMESTAMP_BITS) - 1;

    /// Bitmask for extracting the 10-bit machine tag field. Occupies bits 12
    /// through 21.
    pub const MACHINE_TAG_MASK: u64 = (1 << Self::MACHINE_TAG_BITS) - 1;

    /// Bitmask for extracting the 12-bit sequence field. Occupies bits 0
    /// through 11.
    pub const SEQUENCE_MASK: u64 = (1 << Self::SEQUENCE_BITS) - 1;

    /// Number of bits to shift the timestamp to its correct position (bit 22).
    pub const TIMESTAMP_SHIFT: u32 = Self::MACHINE_TAG_BITS + Self::SEQUENCE_BITS;

    /// Number of bits to shift the machine tag to its correct position (bit 12).
    pub const MACHINE_TAG_SHIFT: u32 = Self::SEQUENCE_BITS;

    /// Largest machine tag a generator may be configured with.
    pub const MAX_MACHINE_TAG: u16 = Self::MACHINE_TAG_MASK as u16;

    /// Largest per-millisecond sequence value.
    pub const MAX_SEQUENCE: u16 = Self::SEQUENCE_MASK as u16;

    /// Packs the three fields into an ID. Each field is masked to its width.
    pub const fn new(timestamp: u64, machine_tag: u64, sequence: u64) -> Self {
        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let machine_tag = (machine_tag & Self::MACHINE_TAG_MASK) << Self::MACHINE_TAG_SHIFT;
        let sequence = sequence & Self::SEQUENCE_MASK;
        Self {
            id: timestamp | machine_tag | sequence,
        }
    }

    /// Packs the three fields into an ID.
    ///
    /// In debug builds this asserts that every field fits its width; release
    /// builds mask silently like [`SnowflakeId::new`].
    pub fn from_components(timestamp: u64, machine_tag: u64, sequence: u64) -> Self {
        debug_assert!(timestamp <= Self::TIMESTAMP_MASK, "timestamp overflow");
        debug_assert!(machine_tag <= Self::MACHINE_TAG_MASK, "machine_tag overflow");
        debug_assert!(sequence <= Self::SEQUENCE_MASK, "sequence overflow");
        Self::new(timestamp, machine_tag, sequence)
    }

    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Extracts the timestamp (ms since [`STORE_EPOCH`]) from the packed ID.
    pub const fn timestamp(&self) -> u64 {
        (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    /// Extracts the machine tag from the packed ID.
    pub const fn machine_tag(&self) -> u16 {
        ((self.id >> Self::MACHINE_TAG_SHIFT) & Self::MACHINE_TAG_MASK) as u16
    }

    /// Extracts the sequence number from the packed ID.
    pub const fn sequence(&self) -> u16 {
        (self.id & Self::SEQUENCE_MASK) as u16
    }

    /// Returns `true` if the reserved high bit is clear.
    pub const fn is_valid(&self) -> bool {
        self.id >> 63 == 0
    }

    /// Converts the embedded timestamp back into wall-clock time.
    pub fn time(&self) -> SystemTime {
        UNIX_EPOCH + STORE_EPOCH + Duration::from_millis(self.timestamp())
    }

    /// Returns the ID as a zero-padded 20-digit string.
    pub fn to_padded_string(&self) -> String {
        format!("{:020}", self.id)
    }
}

impl From<u64> for SnowflakeId {
    fn from(raw: u64) -> Self {
        Self::from_raw(raw)
    }
}

impl From<SnowflakeId> for u64 {
    fn from(id: SnowflakeId) -> Self {
        id.to_raw()
    }
}

impl fmt::Display for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SnowflakeId {{")?;
        writeln!(f, "    raw id      : 0x{:016x} ({})", self.id, self.id)?;
        writeln!(f, "    timestamp   : {}", self.timestamp())?;
        writeln!(f, "    machine tag : {}", self.machine_tag())?;
        writeln!(f, "    sequence    : {}", self.sequence())?;
        write!(f, "}}")
    }
}

/// Extracts the wall-clock time embedded in a raw generated ID.
pub fn extract_time(id: u64) -> SystemTime {
    SnowflakeId::from_raw(id).time()
}

/// Extracts the machine tag embedded in a raw generated ID.
pub const fn extract_machine_tag(id: u64) -> u16 {
    SnowflakeId::from_raw(id).machine_tag()
}

/// Extracts the per-millisecond sequence embedded in a raw generated ID.
pub const fn extract_sequence(id: u64) -> u16 {
    SnowflakeId::from_raw(id).sequence()
}
