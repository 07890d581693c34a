//! [`Participant`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use uuid::Uuid;

use crate::domain::{poll, user};
#[cfg(doc)]
use crate::domain::{Poll, User};

/// Person answering a [`Poll`].
#[derive(Clone, Debug)]
pub struct Participant {
    /// ID of this [`Participant`].
    pub id: Id,

    /// ID of the [`Poll`] this [`Participant`] answers.
    pub poll_id: poll::Id,

    /// Name this [`Participant`] entered.
    pub name: user::Name,

    /// ID of the guest or [`User`] who added this [`Participant`], if any.
    pub user_id: Option<user::Id>,

    /// [`DateTime`] when this [`Participant`] was added.
    pub created_at: CreationDateTime,
}

/// ID of a [`Participant`].
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

/// [`DateTime`] when a [`Participant`] was added.
pub type CreationDateTime = DateTimeOf<(Participant, unit::Creation)>;
