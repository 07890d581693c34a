//! [`Command`] for disabling notifications about a [`Poll`].

use common::operations::{By, Select, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        poll::{self, unsubscribe},
        Poll,
    },
    infra::{database, Database},
    seal::UnsealError,
    Service,
};

use super::Command;

/// [`Command`] for disabling notifications about a [`Poll`] by an
/// unsubscribe link.
///
/// Following the same link again is not an error.
#[derive(Clone, Debug, From)]
pub struct DisableNotifications {
    /// [`unsubscribe::Token`] of the followed link.
    pub token: unsubscribe::Token,
}

impl<Db, Ml> Command<DisableNotifications> for Service<Db, Ml>
where
    Db: Database<
            Select<By<Option<Poll>, poll::Id>>,
            Ok = Option<Poll>,
            Err = Traced<database::Error>,
        > + Database<Update<Poll>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Poll;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DisableNotifications,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let unsubscribe::Claims { poll_id } = self
            .unseal(&cmd.token)
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut poll = self
            .database()
            .execute(Select(By::new(poll_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PollNotExists(poll_id))
            .map_err(tracerr::wrap!())?;

        if poll.notifications {
            poll.notifications = false;
            self.database()
                .execute(Update(poll.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            tracing::info!(poll.id = %poll.id, "disabled `Poll` notifications");
        }

        Ok(poll)
    }
}

/// Error of [`DisableNotifications`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Unsubscribe link is invalid.
    #[display("Invalid unsubscribe link: {_0}")]
    InvalidToken(UnsealError),

    /// [`Poll`] doesn't exist.
    #[display("`Poll(id: {_0})` does not exist")]
    #[from(ignore)]
    PollNotExists(#[error(not(source))] poll::Id),
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Insert, Select},
        DateTime,
    };

    use crate::{
        domain::{
            poll::{self, unsubscribe},
            user, Poll,
        },
        infra::{database::Memory, Database as _},
        spec::{service, service_with_secret},
        Command as _,
    };

    use super::{DisableNotifications, ExecutionError};

    #[tokio::test]
    async fn disables_idempotently() {
        let db = Memory::default();
        let svc = service(db.clone());
        let poll = Poll {
            id: poll::Id::new(),
            title: poll::Title::new("Team lunch").unwrap(),
            user_id: user::Id::new(),
            notifications: true,
            created_at: DateTime::now().coerce(),
        };
        db.execute(Insert(poll.clone())).await.unwrap();
        let token = svc
            .seal(unsubscribe::Claims { poll_id: poll.id }, None)
            .unwrap();

        for _ in 0..2 {
            let updated = svc
                .execute(DisableNotifications {
                    token: token.clone(),
                })
                .await
                .unwrap();
            assert!(!updated.notifications);
        }

        let stored = db
            .execute(Select(By::<Option<Poll>, _>::new(poll.id)))
            .await
            .unwrap()
            .unwrap();
        assert!(!stored.notifications);
    }

    #[tokio::test]
    async fn rejects_foreign_token() {
        let db = Memory::default();
        let token = service_with_secret(db.clone(), "other")
            .seal(unsubscribe::Claims { poll_id: poll::Id::new() }, None)
            .unwrap();

        let err = service(db)
            .execute(DisableNotifications { token })
            .await
            .unwrap_err();

        assert!(matches!(err.into_inner(), ExecutionError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn requires_existing_poll() {
        let svc = service(Memory::default());
        let token = svc
            .seal(unsubscribe::Claims { poll_id: poll::Id::new() }, None)
            .unwrap();

        let err = svc
            .execute(DisableNotifications { token })
            .await
            .unwrap_err();

        assert!(matches!(err.into_inner(), ExecutionError::PollNotExists(_)));
    }
}
