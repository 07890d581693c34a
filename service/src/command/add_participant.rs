//! [`Command`] for answering a [`Poll`].

use common::{
    operations::{By, Deliver, Insert, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        email::{NewParticipant, Template as _},
        poll::{self, participant, unsubscribe, Participant},
        user, Email, Poll, User,
    },
    infra::{database, mailer, Database, Mailer},
    Service,
};

use super::Command;

/// [`Command`] for answering a [`Poll`].
///
/// The owner of the [`Poll`] is notified by email, unless the owner is a
/// guest or has disabled notifications. A failed notification doesn't fail
/// the [`Command`].
#[derive(Clone, Debug)]
pub struct AddParticipant {
    /// ID of the [`Poll`] to answer.
    pub poll_id: poll::Id,

    /// Name of the new [`Participant`].
    pub name: user::Name,

    /// ID of the guest or [`User`] answering, if any.
    pub user_id: Option<user::Id>,
}

impl<Db, Ml> Command<AddParticipant> for Service<Db, Ml>
where
    Db: Database<
            Select<By<Option<Poll>, poll::Id>>,
            Ok = Option<Poll>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Insert<Participant>, Ok = (), Err = Traced<database::Error>>,
    Ml: Mailer<Deliver<Email>, Ok = (), Err = Traced<mailer::Error>>,
{
    type Ok = Participant;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AddParticipant,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AddParticipant {
            poll_id,
            name,
            user_id,
        } = cmd;

        let poll = self
            .database()
            .execute(Select(By::new(poll_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PollNotExists(poll_id))
            .map_err(tracerr::wrap!())?;

        let participant = Participant {
            id: participant::Id::new(),
            poll_id,
            name,
            user_id,
            created_at: DateTime::now().coerce(),
        };
        self.database()
            .execute(Insert(participant.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        if poll.notifications {
            if let Err(e) = self.notify_owner(&poll, &participant).await {
                tracing::error!(
                    poll.id = %poll.id,
                    "failed to notify `Poll` owner: {e}",
                );
            }
        }

        Ok(participant)
    }
}

impl<Db, Ml> Service<Db, Ml>
where
    Db: Database<
        Select<By<Option<User>, user::Id>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
    Ml: Mailer<Deliver<Email>, Ok = (), Err = Traced<mailer::Error>>,
{
    /// Emails the owner of the provided [`Poll`] about the new
    /// [`Participant`].
    ///
    /// Guest owners have no address to email, so nothing is sent to them.
    async fn notify_owner(
        &self,
        poll: &Poll,
        participant: &Participant,
    ) -> Result<(), Traced<NotificationError>> {
        use NotificationError as E;

        let Some(owner) = self
            .database()
            .execute(Select(By::new(poll.user_id.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
        else {
            return Ok(());
        };

        let token = self
            .seal(unsubscribe::Claims { poll_id: poll.id }, None)
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let message = NewParticipant {
            name: owner.name,
            participant_name: participant.name.clone(),
            poll_url: self.config().url(format!("poll/{}", poll.id)),
            unsubscribe_url: self.config().url(format!(
                "auth/disable-notifications?token={token}",
            )),
            support_email: self.config().support_email.clone(),
        }
        .render(owner.email);

        self.mailer()
            .execute(Deliver(message))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`AddParticipant`] [`Command`] execution.
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

/// Error of notifying a [`Poll`] owner about a new [`Participant`].
#[derive(Debug, Display, Error, From)]
enum NotificationError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Mailer`] error.
    #[display("`Mailer` operation failed: {_0}")]
    Mail(mailer::Error),

    /// Failed to seal the unsubscribe link.
    #[display("Failed to seal unsubscribe link: {_0}")]
    Seal(crate::seal::SealError),
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Insert, Select},
        DateTime,
    };

    use crate::{
        domain::{
            poll::{self, unsubscribe, Participant},
            user, Poll, User,
        },
        infra::{database::Memory, Database as _},
        spec::{service, service_with_outbox, token_from, Outbox},
        Command as _,
    };

    use super::{AddParticipant, ExecutionError};

    async fn seed(db: &Memory, notifications: bool) -> (User, Poll) {
        let owner = User {
            id: user::Id::new(),
            name: user::Name::new("Alice").unwrap(),
            email: user::Email::new("alice@example.com").unwrap(),
            created_at: DateTime::now().coerce(),
            deleted_at: None,
        };
        db.execute(Insert(owner.clone())).await.unwrap();
        let poll = Poll {
            id: poll::Id::new(),
            title: poll::Title::new("Team lunch").unwrap(),
            user_id: owner.id.clone(),
            notifications,
            created_at: DateTime::now().coerce(),
        };
        db.execute(Insert(poll.clone())).await.unwrap();
        (owner, poll)
    }

    fn answer(poll: &Poll, name: &str) -> AddParticipant {
        AddParticipant {
            poll_id: poll.id,
            name: user::Name::new(name).unwrap(),
            user_id: Some("user-g1".parse().unwrap()),
        }
    }

    #[tokio::test]
    async fn notifies_registered_owner() {
        let db = Memory::default();
        let outbox = Outbox::default();
        let svc = service_with_outbox(db.clone(), outbox.clone());
        let (owner, poll) = seed(&db, true).await;

        let participant =
            svc.execute(answer(&poll, "Bob & <Co>")).await.unwrap();

        assert_eq!(participant.poll_id, poll.id);
        let stored = db
            .execute(Select(By::<Vec<Participant>, _>::new(poll.id)))
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].user_id, Some("user-g1".parse().unwrap()));

        let sent = outbox.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, owner.email);
        assert_eq!(sent[0].subject, "Bob & <Co> has voted on your poll");
        assert!(sent[0].html.contains("Bob &amp; &lt;Co&gt;"));
        assert!(sent[0]
            .html
            .contains(&format!("https://meet.example.com/poll/{}", poll.id)));
        let claims = svc
            .unseal(&unsubscribe::Token::new(token_from(&sent[0])))
            .unwrap();
        assert_eq!(claims.poll_id, poll.id);
    }

    #[tokio::test]
    async fn skips_disabled_notifications() {
        let db = Memory::default();
        let outbox = Outbox::default();
        let svc = service_with_outbox(db.clone(), outbox.clone());
        let (_, poll) = seed(&db, false).await;

        _ = svc.execute(answer(&poll, "Bob")).await.unwrap();

        assert!(outbox.sent().is_empty());
    }

    #[tokio::test]
    async fn skips_guest_owner() {
        let db = Memory::default();
        let outbox = Outbox::default();
        let svc = service_with_outbox(db.clone(), outbox.clone());
        let poll = Poll {
            id: poll::Id::new(),
            title: poll::Title::new("Team lunch").unwrap(),
            user_id: user::Id::new_guest(),
            notifications: true,
            created_at: DateTime::now().coerce(),
        };
        db.execute(Insert(poll.clone())).await.unwrap();

        _ = svc.execute(answer(&poll, "Bob")).await.unwrap();

        assert!(outbox.sent().is_empty());
    }

    #[tokio::test]
    async fn survives_delivery_failure() {
        let db = Memory::default();
        let svc = service_with_outbox(db.clone(), Outbox::broken());
        let (_, poll) = seed(&db, true).await;

        _ = svc.execute(answer(&poll, "Bob")).await.unwrap();

        let stored = db
            .execute(Select(By::<Vec<Participant>, _>::new(poll.id)))
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn requires_existing_poll() {
        let svc = service(Memory::default());
        let poll = Poll {
            id: poll::Id::new(),
            title: poll::Title::new("Gone").unwrap(),
            user_id: user::Id::new_guest(),
            notifications: false,
            created_at: DateTime::now().coerce(),
        };

        let err = svc.execute(answer(&poll, "Bob")).await.unwrap_err();

        assert!(matches!(err.into_inner(), ExecutionError::PollNotExists(_)));
    }
}
