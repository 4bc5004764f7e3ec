use core::fmt;
use core::marker::PhantomData;

use chrono::{DateTime, Utc};
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{self, DeserializeOwned, IgnoredAny, MapAccess, Visitor},
};

use crate::cursor::CursorCodec;
use crate::{Gid, SnowflakeId};

/// A primary key usable as the tie-breaker of a keyset cursor.
///
/// Keys are compared with [`Ord`], which must agree with the order the
/// backing store sorts them in.
pub trait CursorKey: Clone + Ord + Serialize + DeserializeOwned {
    /// Returns `true` for the zero value of the key, which a cursor never
    /// carries.
    fn is_absent(&self) -> bool;
}

impl CursorKey for u64 {
    fn is_absent(&self) -> bool {
        *self == 0
    }
}

impl CursorKey for i64 {
    fn is_absent(&self) -> bool {
        *self == 0
    }
}

impl CursorKey for String {
    fn is_absent(&self) -> bool {
        self.is_empty()
    }
}

impl CursorKey for SnowflakeId {
    fn is_absent(&self) -> bool {
        self.to_raw() == 0
    }
}

impl CursorKey for Gid {
    fn is_absent(&self) -> bool {
        false
    }
}

/// Position in a collection ordered by `(created_at DESC, id DESC)`.
///
/// The next page holds the rows with `(created_at, id)` strictly less than
/// the cursor's pair, see [`KeysetCursor::precedes`].
///
/// The payload is always a JSON object. Array input such as
/// `["2024-05-01T12:00:00Z", 5]` is rejected, and unknown fields are
/// ignored.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use storeid::KeysetCursor;
///
/// let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
/// let cursor = KeysetCursor::new(at, 42_u64);
///
/// let token = KeysetCursor::codec().encode(&cursor).unwrap();
/// assert_eq!(KeysetCursor::codec().decode(&token).unwrap(), Some(cursor.clone()));
///
/// assert!(cursor.precedes(&at, &41));
/// assert!(!cursor.precedes(&at, &42));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct KeysetCursor<K = u64> {
    pub created_at: DateTime<Utc>,
    pub id: K,
}

impl<K: CursorKey> KeysetCursor<K> {
    pub const fn new(created_at: DateTime<Utc>, id: K) -> Self {
        Self { created_at, id }
    }

    /// The codec for `KeysetCursor<K>`, validating with
    /// [`KeysetCursor::validate`].
    pub const fn codec() -> CursorCodec<Self> {
        CursorCodec::with_validator(Self::validate)
    }

    /// Rejects an unset `created_at` and an absent `id`.
    ///
    /// Any time at or before the Unix epoch counts as unset, which covers
    /// both `1970-01-01T00:00:00Z` and `0001-01-01T00:00:00Z`.
    ///
    /// # Errors
    ///
    /// Returns a short reason naming the missing field.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.created_at <= DateTime::UNIX_EPOCH {
            return Err("missing created_at");
        }
        if self.id.is_absent() {
            return Err("missing id");
        }
        Ok(())
    }

    /// Returns `true` if a row at `(created_at, id)` belongs after this
    /// cursor in descending order.
    pub fn precedes(&self, created_at: &DateTime<Utc>, id: &K) -> bool {
        (created_at, id) < (&self.created_at, &self.id)
    }
}

const FIELDS: &[&str] = &["created_at", "id"];

#[derive(Deserialize)]
#[serde(field_identifier, rename_all = "snake_case")]
enum Field {
    CreatedAt,
    Id,
    #[serde(other)]
    Ignored,
}

impl<'de, K> Deserialize<'de> for KeysetCursor<K>
where
    K: Deserialize<'de>,
{
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CursorVisitor<K>(PhantomData<K>);

        impl<'de, K> Visitor<'de> for CursorVisitor<K>
        where
            K: Deserialize<'de>,
        {
            type Value = KeysetCursor<K>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a cursor object with `created_at` and `id`")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut created_at = None;
                let mut id = None;
                while let Some(field) = map.next_key()? {
                    match field {
                        Field::CreatedAt if created_at.is_some() => {
                            return Err(de::Error::duplicate_field("created_at"));
                        }
                        Field::CreatedAt => created_at = Some(map.next_value()?),
                        Field::Id if id.is_some() => {
                            return Err(de::Error::duplicate_field("id"));
                        }
                        Field::Id => id = Some(map.next_value()?),
                        Field::Ignored => {
                            map.next_value::<IgnoredAny>()?;
                        }
                    }
                }
                Ok(KeysetCursor {
                    created_at: created_at.ok_or_else(|| de::Error::missing_field("created_at"))?,
                    id: id.ok_or_else(|| de::Error::missing_field("id"))?,
                })
            }
        }

        d.deserialize_struct("KeysetCursor", FIELDS, CursorVisitor(PhantomData))
    }
}
