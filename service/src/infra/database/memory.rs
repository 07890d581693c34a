//! In-memory [`Database`] implementation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use common::operations::{By, Commit, Insert, Select, Transact, Update};
use derive_more::{Display, Error as StdError};
use tracerr::Traced;

use crate::{
    domain::{
        content,
        poll::{self, Comment, Participant},
        user, Poll, User,
    },
    infra::{
        database::{self, USERS_EMAIL_CONSTRAINT},
        Database,
    },
};

/// In-memory [`Database`].
///
/// Clones share the same state. Operations apply immediately, so
/// [`Commit`]ting is a no-op and nothing is ever rolled back.
#[derive(Clone, Debug, Default)]
pub struct Memory(Arc<Mutex<State>>);

/// State of the [`Memory`] database.
#[derive(Debug, Default)]
struct State {
    /// Stored [`User`]s, including the deleted ones.
    users: Vec<User>,

    /// Stored [`Poll`]s.
    polls: Vec<Poll>,

    /// Stored [`Participant`]s, in insertion order.
    participants: Vec<Participant>,

    /// Stored [`Comment`]s, in insertion order.
    comments: Vec<Comment>,

    /// Number of operations executed so far.
    operations: usize,
}

impl Memory {
    /// Returns the number of operations executed on this [`Memory`] so far.
    #[must_use]
    pub fn operations(&self) -> usize {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).operations
    }

    /// Locks the [`State`] for a new operation.
    fn state(&self) -> MutexGuard<'_, State> {
        let mut state = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        state.operations += 1;
        state
    }
}

/// [`Memory`] database [`Error`].
///
/// [`Error`]: std::error::Error
#[derive(Clone, Debug, Display, StdError)]
pub enum Error {
    /// Unique constraint is violated.
    #[display("`{_0}` unique constraint is violated")]
    UniqueViolation(#[error(not(source))] &'static str),
}

impl Error {
    /// Checks if this [`Error`] is a unique violation of the specified
    /// `constraint`, or of any one if [`None`].
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        match self {
            Self::UniqueViolation(c) => constraint.map_or(true, |n| n == *c),
        }
    }
}

impl Database<Transact> for Memory {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        drop(self.state());
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        drop(self.state());
        Ok(())
    }
}

impl Database<Select<By<Option<User>, user::Id>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .state()
            .users
            .iter()
            .find(|u| u.id == id && u.deleted_at.is_none())
            .cloned())
    }
}

impl Database<Select<By<Option<User>, user::Email>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();
        Ok(self
            .state()
            .users
            .iter()
            .find(|u| u.email == email && u.deleted_at.is_none())
            .cloned())
    }
}

impl Database<Insert<User>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(user)).await.map_err(tracerr::wrap!())
    }
}

impl Database<Update<User>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(user): Update<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state();

        let occupied = user.deleted_at.is_none()
            && state.users.iter().any(|u| {
                u.id != user.id && u.email == user.email && u.deleted_at.is_none()
            });
        if occupied {
            return Err(tracerr::new!(database::Error::from(
                Error::UniqueViolation(USERS_EMAIL_CONSTRAINT)
            )));
        }

        match state.users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user,
            None => state.users.push(user),
        }
        Ok(())
    }
}

impl Database<Select<By<Option<Poll>, poll::Id>>> for Memory {
    type Ok = Option<Poll>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Poll>, poll::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.state().polls.iter().find(|p| p.id == id).cloned())
    }
}

impl Database<Insert<Poll>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(poll): Insert<Poll>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(poll)).await.map_err(tracerr::wrap!())
    }
}

impl Database<Update<Poll>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(poll): Update<Poll>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state();
        match state.polls.iter_mut().find(|p| p.id == poll.id) {
            Some(existing) => *existing = poll,
            None => state.polls.push(poll),
        }
        Ok(())
    }
}

impl Database<Insert<Participant>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(participant): Insert<Participant>,
    ) -> Result<Self::Ok, Self::Err> {
        self.state().participants.push(participant);
        Ok(())
    }
}

impl Database<Select<By<Vec<Participant>, poll::Id>>> for Memory {
    type Ok = Vec<Participant>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Participant>, poll::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let poll_id = by.into_inner();
        Ok(self
            .state()
            .participants
            .iter()
            .filter(|p| p.poll_id == poll_id)
            .cloned()
            .collect())
    }
}

impl Database<Insert<Comment>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(comment): Insert<Comment>,
    ) -> Result<Self::Ok, Self::Err> {
        self.state().comments.push(comment);
        Ok(())
    }
}

impl Database<Select<By<Vec<Comment>, poll::Id>>> for Memory {
    type Ok = Vec<Comment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Comment>, poll::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let poll_id = by.into_inner();
        Ok(self
            .state()
            .comments
            .iter()
            .filter(|c| c.poll_id == poll_id)
            .cloned()
            .collect())
    }
}

impl Database<Update<content::Reassignment>> for Memory {
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(re): Update<content::Reassignment>,
    ) -> Result<Self::Ok, Self::Err> {
        let content::Reassignment { kind, from, to } = re;

        let mut state = self.state();
        let owners = match kind {
            content::Kind::Participant => state
                .participants
                .iter_mut()
                .map(|p| &mut p.user_id)
                .collect::<Vec<_>>(),
            content::Kind::Comment => state
                .comments
                .iter_mut()
                .map(|c| &mut c.user_id)
                .collect(),
        };

        let mut reassigned = 0;
        for owner in owners {
            if owner.as_ref().is_some_and(|id| from.contains(id)) {
                *owner = Some(to.clone());
                reassigned += 1;
            }
        }
        Ok(reassigned)
    }
}
