//! [`Command`] for commenting on a [`Poll`].

use common::{
    operations::{By, Insert, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::{
        poll::{self, comment, Comment},
        user, Poll,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for commenting on a [`Poll`].
#[derive(Clone, Debug)]
pub struct AddComment {
    /// ID of the [`Poll`] to comment on.
    pub poll_id: poll::Id,

    /// Name to sign the [`Comment`] with.
    pub author_name: user::Name,

    /// [`comment::Content`] of the [`Comment`].
    pub content: comment::Content,

    /// ID of the guest or [`User`] commenting, if any.
    pub user_id: Option<user::Id>,
}

impl<Db, Ml> Command<AddComment> for Service<Db, Ml>
where
    Db: Database<
            Select<By<Option<Poll>, poll::Id>>,
            Ok = Option<Poll>,
            Err = Traced<database::Error>,
        > + Database<Insert<Comment>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Comment;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: AddComment) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AddComment {
            poll_id,
            author_name,
            content,
            user_id,
        } = cmd;

        drop(
            self.database()
                .execute(Select(By::new(poll_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::PollNotExists(poll_id))
                .map_err(tracerr::wrap!())?,
        );

        let comment = Comment {
            id: comment::Id::new(),
            poll_id,
            author_name,
            content,
            user_id,
            created_at: DateTime::now().coerce(),
        };
        self.database()
            .execute(Insert(comment.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(comment)
    }
}

/// Error of [`AddComment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Poll`] doesn't exist.
    #[display("`Poll(id: {_0})` does not exist")]
    #[from(ignore)]
    PollNotExists(#[error(not(source))] poll::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::CreatePoll,
        domain::{
            poll::{self, comment},
            user,
        },
        infra::database::Memory,
        spec::service,
        Command as _,
    };

    use super::{AddComment, ExecutionError};

    fn add(poll_id: poll::Id) -> AddComment {
        AddComment {
            poll_id,
            author_name: user::Name::new("Bob").unwrap(),
            content: comment::Content::new("Works for me").unwrap(),
            user_id: Some("user-g1".parse().unwrap()),
        }
    }

    #[tokio::test]
    async fn attributes_comment() {
        let svc = service(Memory::default());
        let poll = svc
            .execute(CreatePoll {
                title: poll::Title::new("Team lunch").unwrap(),
                user_id: "user-owner".parse().unwrap(),
                notifications: false,
            })
            .await
            .unwrap();

        let comment = svc.execute(add(poll.id)).await.unwrap();

        assert_eq!(comment.poll_id, poll.id);
        assert_eq!(comment.user_id, Some("user-g1".parse().unwrap()));
    }

    #[tokio::test]
    async fn requires_existing_poll() {
        let svc = service(Memory::default());

        let err = svc.execute(add(poll::Id::new())).await.unwrap_err();

        assert!(matches!(err.into_inner(), ExecutionError::PollNotExists(_)));
    }
}
