use core::fmt;
use core::str::FromStr;

use crate::gid::GidError;

/// The kind of thing a [`Gid`](crate::Gid) names.
///
/// Membership is closed: parsing rejects any tag not listed in
/// [`EntityType::ALL`]. Tags are case-sensitive and match the variant names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityType {
    Product,
    ProductVariant,
    Store,
    Tenant,
    User,
    Role,
    Permission,
    CustomDomain,
}

impl EntityType {
    /// Every accepted entity type, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Product,
        Self::ProductVariant,
        Self::Store,
        Self::Tenant,
        Self::User,
        Self::Role,
        Self::Permission,
        Self::CustomDomain,
    ];

    /// The tag used in canonical GID text.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Product => "Product",
            Self::ProductVariant => "ProductVariant",
            Self::Store => "Store",
            Self::Tenant => "Tenant",
            Self::User => "User",
            Self::Role => "Role",
            Self::Permission => "Permission",
            Self::CustomDomain => "CustomDomain",
        }
    }

    /// Looks up a tag in the allow-list.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|entity| entity.as_str() == tag)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = GidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| GidError::UnknownEntityType {
            entity_type: s.to_owned(),
        })
    }
}

impl serde::Serialize for EntityType {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for EntityType {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let tag = <std::borrow::Cow<'de, str>>::deserialize(d)?;
        tag.parse().map_err(serde::de::Error::custom)
    }
}
