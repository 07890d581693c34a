//! [`User`] definitions.

pub mod identity;
pub mod login;
pub mod registration;
pub mod session;

use std::{str::FromStr, sync::LazyLock};

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use self::{identity::Identity, session::Session};

/// Registered account of a person using the platform.
#[derive(Clone, Debug)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// [`Name`] of this [`User`].
    pub name: Name,

    /// [`Email`] of this [`User`].
    pub email: Email,

    /// [`DateTime`] when this [`User`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`User`] was deleted.
    pub deleted_at: Option<DeletionDateTime>,
}

impl User {
    /// Returns the [`Identity`] a [`Session`] of this [`User`] carries.
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity::Registered {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// ID of a [`User`] or of a guest.
///
/// Both kinds of IDs share the same space, because content created by a
/// guest is attributed to the guest's ID and later reassigned to the
/// [`User`] the guest turns into.
#[derive(
    AsRef,
    Clone,
    Debug,
    Deserialize,
    Display,
    Eq,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[as_ref(str)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    /// Prefix of every generated guest [`Id`].
    pub const GUEST_PREFIX: &'static str = "user-";

    /// Maximum length of an [`Id`].
    const MAX_LEN: usize = 64;

    /// Creates a new random [`Id`] for a [`User`] account.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Creates a new random [`Id`] for a guest.
    #[must_use]
    pub fn new_guest() -> Self {
        Self(format!("{}{}", Self::GUEST_PREFIX, Uuid::new_v4().simple()))
    }

    /// Checks whether the given `id` is a valid [`Id`].
    fn check(id: impl AsRef<str>) -> bool {
        let id = id.as_ref();
        !id.is_empty()
            && id.len() <= Self::MAX_LEN
            && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for Id {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::check(s)
            .then(|| Self(s.to_owned()))
            .ok_or("invalid `user::Id`")
    }
}

/// Name of a [`User`], or a display name entered by a guest.
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, PartialEq, Serialize,
)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[serde(transparent)]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.chars().count() <= 100
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Email address of a [`User`].
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, PartialEq, Serialize,
)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`] if the given `address` is valid.
    ///
    /// The address is normalized to lowercase, so the same mailbox always
    /// maps to the same [`User`].
    #[must_use]
    pub fn new(address: impl AsRef<str>) -> Option<Self> {
        let address = address.as_ref().trim().to_lowercase();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Email`] format: a local part and a
        /// dotted domain, no whitespace, at most 254 characters.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[^\s@]{1,64}@[^\s@.]+(\.[^\s@.]+)+$")
                .expect("valid regex")
        });

        let address = address.as_ref();
        address.len() <= 254 && REGEX.is_match(address)
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// [`DateTime`] when a [`User`] was created.
pub type CreationDateTime = DateTimeOf<(User, unit::Creation)>;

/// [`DateTime`] when a [`User`] was deleted.
pub type DeletionDateTime = DateTimeOf<(User, unit::Deletion)>;

#[cfg(test)]
mod spec {
    use super::{Email, Id, Name};

    #[test]
    fn guest_ids_are_prefixed_and_unique() {
        let (a, b) = (Id::new_guest(), Id::new_guest());

        assert!(a.as_ref().starts_with(Id::GUEST_PREFIX));
        assert!(a.as_ref().len() > Id::GUEST_PREFIX.len());
        assert_ne!(a, b);
    }

    #[test]
    fn parses_id() {
        assert!("user-3f2a9c".parse::<Id>().is_ok());
        assert!(Id::new().to_string().parse::<Id>().is_ok());

        assert!("".parse::<Id>().is_err());
        assert!("user 1".parse::<Id>().is_err());
        assert!("x".repeat(65).parse::<Id>().is_err());
    }

    #[test]
    fn validates_name() {
        assert!(Name::new("Alice").is_some());

        assert!(Name::new("").is_none());
        assert!(Name::new(" Alice").is_none());
        assert!(Name::new("a".repeat(101)).is_none());
    }

    #[test]
    fn normalizes_email() {
        assert_eq!(
            Email::new(" Alice@Example.COM ").unwrap().to_string(),
            "alice@example.com",
        );

        assert!(Email::new("alice").is_none());
        assert!(Email::new("alice@localhost").is_none());
        assert!(Email::new("al ice@example.com").is_none());
    }
}
