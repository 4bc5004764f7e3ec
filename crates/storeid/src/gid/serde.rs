//! `#[serde(with = "...")]` helpers for [`Gid`](crate::Gid) fields.
//!
//! `Gid` already serializes as its canonical string. These modules cover the
//! compact form and the "absent GID is an empty string" convention of stored
//! rows.

use serde::{Deserialize, Deserializer, Serializer};

use crate::gid::{Gid, GidError};

fn read_str<'de, D: Deserializer<'de>>(d: D) -> Result<std::borrow::Cow<'de, str>, D::Error> {
    <std::borrow::Cow<'de, str>>::deserialize(d)
}

fn custom<E: serde::de::Error>(err: GidError) -> E {
    E::custom(err)
}

/// Serialize a [`Gid`] as canonical text.
pub mod as_canonical {
    use super::{Deserializer, Gid, Serializer, custom, read_str};

    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S: Serializer>(gid: &Gid, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(gid)
    }

    /// # Errors
    ///
    /// Returns an error if the input is not a string or not a canonical GID.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Gid, D::Error> {
        Gid::parse(&read_str(d)?).map_err(custom)
    }
}

/// Serialize a [`Gid`] as compact (URL-safe base64) text.
pub mod as_compact {
    use super::{Deserializer, Gid, Serializer, custom, read_str};

    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S: Serializer>(gid: &Gid, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&gid.to_compact())
    }

    /// # Errors
    ///
    /// Returns an error if the input is not a string or not a compact GID.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Gid, D::Error> {
        Gid::parse_compact(&read_str(d)?).map_err(custom)
    }
}

/// Serialize an `Option<Gid>` as canonical text, with `None` as `""`.
pub mod option_canonical {
    use super::{Deserializer, Gid, Serializer, custom, read_str};

    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S: Serializer>(gid: &Option<Gid>, s: S) -> Result<S::Ok, S::Error> {
        match gid {
            Some(gid) => s.collect_str(gid),
            None => s.serialize_str(""),
        }
    }

    /// # Errors
    ///
    /// Returns an error if the input is not a string, or is a non-empty
    /// string that is not a canonical GID.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Gid>, D::Error> {
        let text = read_str(d)?;
        if text.is_empty() {
            return Ok(None);
        }
        Gid::parse(&text).map(Some).map_err(custom)
    }
}
