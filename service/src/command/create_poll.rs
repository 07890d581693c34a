//! [`Command`] for creating a new [`Poll`].

use common::{operations::Insert, DateTime};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{poll, user, Poll},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Poll`].
#[derive(Clone, Debug)]
pub struct CreatePoll {
    /// [`poll::Title`] of the new [`Poll`].
    pub title: poll::Title,

    /// ID of the guest or [`User`] creating the [`Poll`].
    ///
    /// [`User`]: crate::domain::User
    pub user_id: user::Id,

    /// Indicator whether the owner wants to be notified about new
    /// participants.
    pub notifications: bool,
}

impl<Db, Ml> Command<CreatePoll> for Service<Db, Ml>
where
    Db: Database<Insert<Poll>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Poll;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreatePoll) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreatePoll {
            title,
            user_id,
            notifications,
        } = cmd;

        let poll = Poll {
            id: poll::Id::new(),
            title,
            user_id,
            notifications,
            created_at: DateTime::now().coerce(),
        };
        self.database()
            .execute(Insert(poll.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(poll)
    }
}

/// Error of [`CreatePoll`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}
