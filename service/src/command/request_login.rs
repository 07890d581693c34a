//! [`Command`] for requesting a login link.

use common::operations::{By, Deliver, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        email::{LoginLink, Template as _},
        user::{self, login},
        Email, User,
    },
    infra::{database, mailer, Database, Mailer},
    seal::SealError,
    Service,
};

use super::Command;

/// [`Command`] for emailing a login link to a [`User`].
#[derive(Clone, Debug)]
pub struct RequestLogin {
    /// [`user::Email`] of the [`User`] to log in as.
    pub email: user::Email,

    /// ID of the guest requesting the link, if any.
    pub guest_id: Option<user::Id>,
}

impl<Db, Ml> Command<RequestLogin> for Service<Db, Ml>
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

    async fn execute(&self, cmd: RequestLogin) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RequestLogin { email, guest_id } = cmd;

        let user = self
            .database()
            .execute(Select(By::new(email.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(email))
            .map_err(tracerr::wrap!())?;

        let token = self
            .seal(
                login::Claims {
                    user_id: user.id.clone(),
                    guest_id,
                },
                Some(self.config().verification_ttl),
            )
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let email = LoginLink {
            name: user.name,
            link: self.config().url(format!("auth/login?token={token}")),
        }
        .render(user.email);
        self.mailer()
            .execute(Deliver(email))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`RequestLogin`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Mailer`] error.
    #[display("`Mailer` operation failed: {_0}")]
    Mail(mailer::Error),

    /// Failed to seal the login link.
    #[display("Failed to seal login link: {_0}")]
    Seal(SealError),

    /// [`User`] with the provided [`user::Email`] does not exist.
    #[display("`User(email: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Email),
}
