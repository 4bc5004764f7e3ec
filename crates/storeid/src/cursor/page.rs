use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::cursor::{CursorCodec, CursorError, PageError};

/// Page size bounds for a list endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PageLimits {
    /// Used when the request carries no `limit`.
    pub default: usize,
    /// Larger requested limits are clamped to this.
    pub max: usize,
}

impl PageLimits {
    pub const DEFAULT_LIMIT: usize = 50;
    pub const MAX_LIMIT: usize = 100;

    pub const fn new(default: usize, max: usize) -> Self {
        Self { default, max }
    }
}

impl Default for PageLimits {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIMIT, Self::MAX_LIMIT)
    }
}

/// The `limit` and `cursor` of a list request, after validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageParams {
    pub limit: usize,
    /// Raw cursor token; empty when the request starts at the first page.
    pub cursor: String,
}

impl PageParams {
    /// Reads page parameters from raw query values.
    ///
    /// A missing or empty `limit` takes `limits.default`; a limit above
    /// `limits.max` is clamped. The cursor is kept as-is and decoded later
    /// with [`PageParams::decode_cursor`].
    ///
    /// # Errors
    ///
    /// Returns [`PageError::InvalidLimit`] if `limit` is not an integer or
    /// is less than 1.
    pub fn from_query(
        limit: Option<&str>,
        cursor: Option<&str>,
        limits: PageLimits,
    ) -> Result<Self, PageError> {
        let limit = match limit.filter(|raw| !raw.is_empty()) {
            None => limits.default,
            Some(raw) => parse_limit(raw)?,
        };
        Ok(Self {
            limit: limit.min(limits.max),
            cursor: cursor.unwrap_or_default().to_owned(),
        })
    }

    /// Number of rows to request from storage: one more than the page size,
    /// so that a full page also reveals whether another one follows.
    pub const fn fetch_limit(&self) -> usize {
        self.limit.saturating_add(1)
    }

    /// Decodes the request cursor. `Ok(None)` means start from the top.
    ///
    /// # Errors
    ///
    /// See [`CursorCodec::decode`].
    pub fn decode_cursor<C>(&self, codec: &CursorCodec<C>) -> Result<Option<C>, CursorError>
    where
        C: Serialize + DeserializeOwned,
    {
        codec.decode(&self.cursor)
    }
}

fn parse_limit(raw: &str) -> Result<usize, PageError> {
    let invalid = || PageError::InvalidLimit {
        value: raw.to_owned(),
    };
    let n: i64 = raw.parse().map_err(|_| invalid())?;
    if n < 1 {
        return Err(invalid());
    }
    Ok(usize::try_from(n).unwrap_or(usize::MAX))
}

/// Pagination block of a list response.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageInfo {
    pub limit: usize,
    pub has_more: bool,
    /// Token for the next page, or `""` on the last page.
    pub next_cursor: String,
}

impl PageInfo {
    /// A page with nothing after it.
    pub fn last(limit: usize) -> Self {
        Self {
            limit,
            has_more: false,
            next_cursor: String::new(),
        }
    }
}

/// A list response: `{"data": [...], "page": {...}}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub data: Vec<T>,
    pub page: PageInfo,
}

impl<T> PageResponse<T> {
    /// Builds a page from rows fetched with [`PageParams::fetch_limit`].
    ///
    /// When `rows` holds more than `limit` items the surplus is dropped,
    /// `has_more` is set, and `next_cursor` encodes `key_of` applied to the
    /// last row kept.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::Encode`] if the cursor fails to serialize.
    pub fn from_rows<C, F>(
        mut rows: Vec<T>,
        limit: usize,
        codec: &CursorCodec<C>,
        key_of: F,
    ) -> Result<Self, CursorError>
    where
        C: Serialize + DeserializeOwned,
        F: FnOnce(&T) -> C,
    {
        if rows.len() <= limit {
            return Ok(Self {
                data: rows,
                page: PageInfo::last(limit),
            });
        }

        rows.truncate(limit);
        let next_cursor = match rows.last() {
            Some(row) => codec.encode(&key_of(row))?,
            None => String::new(),
        };
        Ok(Self {
            data: rows,
            page: PageInfo {
                limit,
                has_more: !next_cursor.is_empty(),
                next_cursor,
            },
        })
    }

    /// Converts each row, keeping the pagination block.
    pub fn map<U, F>(self, f: F) -> PageResponse<U>
    where
        F: FnMut(T) -> U,
    {
        PageResponse {
            data: self.data.into_iter().map(f).collect(),
            page: self.page,
        }
    }
}
