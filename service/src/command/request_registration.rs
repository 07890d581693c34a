//! [`Command`] for requesting a registration link.

use common::operations::{By, Deliver, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        email::{RegistrationLink, Template as _},
        user::{self, registration},
        Email, User,
    },
    infra::{database, mailer, Database, Mailer},
    seal::SealError,
    Service,
};

use super::Command;

/// [`Command`] for emailing a registration link to a new [`User`].
#[derive(Clone, Debug)]
pub struct RequestRegistration {
    /// [`user::Name`] of the new [`User`].
    pub name: user::Name,

    /// [`user::Email`] of the new [`User`].
    pub email: user::Email,

    /// ID of the guest registering, if any.
    pub guest_id: Option<user::Id>,
}

impl<Db, Ml> Command<RequestRegistration> for Service<Db, Ml>
where
    Db: Database<
        Select<By<Option<User>, user::Email>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
    Ml: Mailer<Deliver<Email>, Ok = (), Err = Traced<mailer::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RequestRegistration,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RequestRegistration {
            name,
            email,
            guest_id,
        } = cmd;

        let existing = self
            .database()
            .execute(Select(By::new(email.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if existing.is_some() {
            return Err(tracerr::new!(E::EmailOccupied(email)));
        }

        let token = self
            .seal(
                registration::Claims {
                    name: name.clone(),
                    email: email.clone(),
                    guest_id,
                },
                Some(self.config().verification_ttl),
            )
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let message = RegistrationLink {
            name,
            link: self.config().url(format!("auth/register?token={token}")),
        }
        .render(email);
        self.mailer()
            .execute(Deliver(message))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`RequestRegistration`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`user::Email`] is already used by another [`User`].
    #[display("`{_0}` email is occupied")]
    #[from(ignore)]
    EmailOccupied(#[error(not(source))] user::Email),

    /// [`Mailer`] error.
    #[display("`Mailer` operation failed: {_0}")]
    Mail(mailer::Error),

    /// Failed to seal the registration link.
    #[display("Failed to seal registration link: {_0}")]
    Seal(SealError),
}

#[cfg(test)]
mod spec {
    use common::{operations::Insert, DateTime};

    use crate::{
        domain::{
            user::{self, registration},
            User,
        },
        infra::{database::Memory, Database as _},
        spec::{service_with_outbox, token_from, Outbox},
        Command as _,
    };

    use super::{ExecutionError, RequestRegistration};

    fn request() -> RequestRegistration {
        RequestRegistration {
            name: user::Name::new("Bob").unwrap(),
            email: user::Email::new("bob@example.com").unwrap(),
            guest_id: Some("user-g1".parse().unwrap()),
        }
    }

    #[tokio::test]
    async fn emails_registration_link() {
        let outbox = Outbox::default();
        let svc = service_with_outbox(Memory::default(), outbox.clone());

        svc.execute(request()).await.unwrap();

        let sent = outbox.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to.to_string(), "bob@example.com");
        assert!(sent[0]
            .html
            .contains("https://meet.example.com/auth/register?token="));
        let claims = svc
            .unseal(&registration::Token::new(token_from(&sent[0])))
            .unwrap();
        assert_eq!(claims.name.to_string(), "Bob");
        assert_eq!(claims.guest_id, request().guest_id);
    }

    #[tokio::test]
    async fn rejects_occupied_email() {
        let db = Memory::default();
        let outbox = Outbox::default();
        let svc = service_with_outbox(db.clone(), outbox.clone());
        db.execute(Insert(User {
            id: user::Id::new(),
            name: user::Name::new("Robert").unwrap(),
            email: user::Email::new("bob@example.com").unwrap(),
            created_at: DateTime::now().coerce(),
            deleted_at: None,
        }))
        .await
        .unwrap();

        let err = svc.execute(request()).await.unwrap_err();

        assert!(matches!(err.into_inner(), ExecutionError::EmailOccupied(_)));
        assert!(outbox.sent().is_empty());
    }
}
