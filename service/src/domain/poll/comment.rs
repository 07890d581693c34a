//! [`Comment`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use uuid::Uuid;

use crate::domain::{poll, user};
#[cfg(doc)]
use crate::domain::{Poll, User};

/// Comment left on a [`Poll`].
#[derive(Clone, Debug)]
pub struct Comment {
    /// ID of this [`Comment`].
    pub id: Id,

    /// ID of the [`Poll`] this [`Comment`] is left on.
    pub poll_id: poll::Id,

    /// Name the author signed this [`Comment`] with.
    pub author_name: user::Name,

    /// [`Content`] of this [`Comment`].
    pub content: Content,

    /// ID of the guest or [`User`] who left this [`Comment`], if any.
    pub user_id: Option<user::Id>,

    /// [`DateTime`] when this [`Comment`] was left.
    pub created_at: CreationDateTime,
}

/// ID of a [`Comment`].
#[derive(
    Clone, Copy, Debug, Display, Eq, From, FromStr, Hash, Into, PartialEq,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
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

/// Text of a [`Comment`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Content(String);

impl Content {
    /// Maximum number of characters in a [`Content`].
    const MAX_LEN: usize = 2000;

    /// Creates a new [`Content`] if the given `text` is valid.
    ///
    /// Surrounding whitespace is trimmed.
    #[must_use]
    pub fn new(text: impl AsRef<str>) -> Option<Self> {
        let text = text.as_ref().trim();
        (!text.is_empty() && text.chars().count() <= Self::MAX_LEN)
            .then(|| Self(text.to_owned()))
    }
}

impl FromStr for Content {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `comment::Content`")
    }
}

/// [`DateTime`] when a [`Comment`] was left.
pub type CreationDateTime = DateTimeOf<(Comment, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::Content;

    #[test]
    fn trims_content() {
        assert_eq!(
            Content::new("  see you there \n").unwrap().to_string(),
            "see you there",
        );

        assert!(Content::new(" \n ").is_none());
        assert!(Content::new("x".repeat(2001)).is_none());
    }
}
