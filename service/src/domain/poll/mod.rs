//! [`Poll`] definitions.

pub mod comment;
pub mod participant;
pub mod unsubscribe;

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user;

pub use self::{comment::Comment, participant::Participant};

/// Poll people answer to find a time to meet.
#[derive(Clone, Debug)]
pub struct Poll {
    /// ID of this [`Poll`].
    pub id: Id,

    /// [`Title`] of this [`Poll`].
    pub title: Title,

    /// ID of whoever created this [`Poll`], a guest or a [`User`].
    ///
    /// [`User`]: crate::domain::User
    pub user_id: user::Id,

    /// Indicator whether the owner is notified about new [`Participant`]s.
    pub notifications: bool,

    /// [`DateTime`] when this [`Poll`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Poll`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[serde(transparent)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

/// Title of a [`Poll`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Title(String);

impl Title {
    /// Maximum number of characters in a [`Title`].
    const MAX_LEN: usize = 100;

    /// Creates a new [`Title`] if the given `title` is valid.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Option<Self> {
        let title = title.into();
        Self::check(&title).then_some(Self(title))
    }

    /// Checks whether the given `title` is a valid [`Title`].
    fn check(title: impl AsRef<str>) -> bool {
        let title = title.as_ref();
        title.trim() == title
            && !title.is_empty()
            && title.chars().count() <= Self::MAX_LEN
    }
}

impl FromStr for Title {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `poll::Title`")
    }
}

/// [`DateTime`] when a [`Poll`] was created.
pub type CreationDateTime = DateTimeOf<(Poll, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::Title;

    #[test]
    fn validates_title() {
        assert!(Title::new("Team lunch").is_some());

        assert!(Title::new("").is_none());
        assert!(Title::new("Team lunch ").is_none());
        assert!(Title::new("x".repeat(101)).is_none());
    }
}
