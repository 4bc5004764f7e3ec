use core::fmt;
use core::str::FromStr;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};

use crate::gid::{EntityType, GidError, PREFIX};

/// A typed, namespaced global identifier: an [`EntityType`] plus a raw
/// `u64`.
///
/// Two text forms are supported, both lossless:
///
/// - canonical: `gid://mystoreos/<EntityType>/<decimal id>` ([`Display`],
///   [`Gid::to_canonical`], [`Gid::parse`])
/// - compact: URL-safe unpadded base64 of the canonical text
///   ([`Gid::to_compact`], [`Gid::parse_compact`])
///
/// An absent GID is `Option<Gid>::None`; see
/// [`gid::serde::option_canonical`](crate::gid::serde::option_canonical) for
/// mapping it to an empty string on the wire.
///
/// # Example
///
/// ```
/// use storeid::{EntityType, Gid};
///
/// let gid = Gid::product(123456789);
/// assert_eq!(gid.to_string(), "gid://mystoreos/Product/123456789");
/// assert_eq!(Gid::parse(&gid.to_canonical()).unwrap(), gid);
/// assert_eq!(Gid::parse_compact(&gid.to_compact()).unwrap(), gid);
/// assert_eq!(gid.entity_type(), EntityType::Product);
/// ```
///
/// [`Display`]: core::fmt::Display
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Gid {
    entity_type: EntityType,
    id: u64,
}

impl Gid {
    pub const fn new(entity_type: EntityType, id: u64) -> Self {
        Self { entity_type, id }
    }

    pub const fn product(id: u64) -> Self {
        Self::new(EntityType::Product, id)
    }

    pub const fn product_variant(id: u64) -> Self {
        Self::new(EntityType::ProductVariant, id)
    }

    pub const fn store(id: u64) -> Self {
        Self::new(EntityType::Store, id)
    }

    pub const fn tenant(id: u64) -> Self {
        Self::new(EntityType::Tenant, id)
    }

    pub const fn user(id: u64) -> Self {
        Self::new(EntityType::User, id)
    }

    pub const fn role(id: u64) -> Self {
        Self::new(EntityType::Role, id)
    }

    pub const fn permission(id: u64) -> Self {
        Self::new(EntityType::Permission, id)
    }

    pub const fn custom_domain(id: u64) -> Self {
        Self::new(EntityType::CustomDomain, id)
    }

    pub const fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Returns the canonical text form, `gid://mystoreos/<EntityType>/<id>`.
    pub fn to_canonical(&self) -> String {
        self.to_string()
    }

    /// Returns the compact form: URL-safe base64, without padding, of the
    /// canonical text.
    pub fn to_compact(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.to_canonical())
    }

    /// Parses canonical GID text.
    ///
    /// # Errors
    ///
    /// Checks are applied in this order:
    /// - [`GidError::MissingPrefix`] if `s` does not start with
    ///   `gid://mystoreos/`
    /// - [`GidError::MalformedBody`] unless the rest is exactly two non-empty
    ///   `/`-separated segments
    /// - [`GidError::UnknownEntityType`] if the first segment is not an
    ///   [`EntityType`]
    /// - [`GidError::InvalidId`] if the second segment is not a base-10 `u64`
    pub fn parse(s: &str) -> Result<Self, GidError> {
        let body = s.strip_prefix(PREFIX).ok_or(GidError::MissingPrefix)?;

        let mut segments = body.split('/');
        let (Some(tag), Some(id), None) = (segments.next(), segments.next(), segments.next())
        else {
            return Err(GidError::MalformedBody);
        };
        if tag.is_empty() || id.is_empty() {
            return Err(GidError::MalformedBody);
        }

        let entity_type = tag.parse()?;
        let id = parse_decimal(id)?;
        Ok(Self::new(entity_type, id))
    }

    /// Parses the compact (base64) form.
    ///
    /// # Errors
    ///
    /// Returns [`GidError::InvalidEncoding`] when `s` is not URL-safe
    /// unpadded base64 or does not decode to UTF-8, otherwise any error of
    /// [`Gid::parse`].
    pub fn parse_compact(s: &str) -> Result<Self, GidError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(s)
            .map_err(|e| GidError::InvalidEncoding {
                reason: format!("base64 decode failed: {e}"),
            })?;
        let text = String::from_utf8(bytes).map_err(|e| GidError::InvalidEncoding {
            reason: format!("decoded bytes are not UTF-8: {e}"),
        })?;
        Self::parse(&text)
    }

    /// Parses either form: canonical text when it carries the `gid://`
    /// scheme, compact otherwise.
    ///
    /// # Errors
    ///
    /// See [`Gid::parse`] and [`Gid::parse_compact`].
    pub fn parse_any(s: &str) -> Result<Self, GidError> {
        if s.starts_with(crate::gid::SCHEME_PREFIX) {
            Self::parse(s)
        } else {
            Self::parse_compact(s)
        }
    }

    /// Parses canonical GID text, panicking on failure.
    ///
    /// Intended for literals in tests and static tables.
    ///
    /// # Panics
    ///
    /// Panics if `s` is not a valid canonical GID.
    #[track_caller]
    pub fn must_parse(s: &str) -> Self {
        match Self::parse(s) {
            Ok(gid) => gid,
            Err(e) => panic!("{e}"),
        }
    }
}

/// Digits only: `u64::from_str` would also take a leading `+`.
fn parse_decimal(segment: &str) -> Result<u64, GidError> {
    let invalid = || GidError::InvalidId {
        segment: segment.to_owned(),
    };
    if !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    segment.parse().map_err(|_| invalid())
}

impl fmt::Display for Gid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{}/{}", self.entity_type, self.id)
    }
}

impl FromStr for Gid {
    type Err = GidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for Gid {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Gid {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let text = <std::borrow::Cow<'de, str>>::deserialize(d)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
