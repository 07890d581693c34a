//! [`Command`] for registering a new [`User`] by a registration link.

use common::{
    operations::{By, Insert, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::Session;
use crate::{
    domain::{
        user::{self, registration, Identity},
        User,
    },
    infra::{database, Database},
    seal::UnsealError,
    Service,
};

use super::{merge_guests_into_user, Command, MergeGuestsIntoUser};

/// [`Command`] for registering a new [`User`] by a registration link.
///
/// Content of the registering guests is merged into the new [`User`] the same
/// way [`AuthenticateUser`] does.
///
/// [`AuthenticateUser`]: super::AuthenticateUser
#[derive(Clone, Debug)]
pub struct RegisterUser {
    /// [`registration::Token`] of the followed link.
    pub token: registration::Token,

    /// [`Identity`] of the current [`Session`].
    pub current: Identity,
}

impl<Db, Ml> Command<RegisterUser> for Service<Db, Ml>
where
    Db: Database<
            Select<By<Option<User>, user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Insert<User>, Ok = (), Err = Traced<database::Error>>,
    Self: Command<
        MergeGuestsIntoUser,
        Ok = u64,
        Err = Traced<merge_guests_into_user::ExecutionError>,
    >,
{
    /// [`Identity`] to store in the [`Session`].
    type Ok = Identity;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: RegisterUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RegisterUser { token, current } = cmd;

        let registration::Claims {
            name,
            email,
            guest_id,
        } = self
            .unseal(&token)
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let existing = self
            .database()
            .execute(Select(By::new(email.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if existing.is_some() {
            return Err(tracerr::new!(E::EmailOccupied(email)));
        }

        let user = User {
            id: user::Id::new(),
            name,
            email,
            created_at: DateTime::now().coerce(),
            deleted_at: None,
        };
        self.database()
            .execute(Insert(user.clone()))
            .await
            .map_err(|e| {
                let e = e.into_inner();
                if e.is_unique_violation(Some(database::USERS_EMAIL_CONSTRAINT))
                {
                    E::EmailOccupied(user.email.clone())
                } else {
                    E::Db(e)
                }
            })
            .map_err(tracerr::wrap!())?;
        tracing::info!(user.id = %user.id, "registered new `User`");

        let guest_ids = guest_id
            .into_iter()
            .chain(current.guest_id().cloned())
            .collect();
        self.execute(MergeGuestsIntoUser {
            user_id: user.id.clone(),
            guest_ids,
        })
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))
        .map(drop)?;

        Ok(user.identity())
    }
}

/// Error of [`RegisterUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`user::Email`] got occupied since the link was issued.
    #[display("`{_0}` email is occupied")]
    #[from(ignore)]
    EmailOccupied(#[error(not(source))] user::Email),

    /// Registration link is invalid or expired.
    #[display("Invalid registration link: {_0}")]
    InvalidToken(UnsealError),

    /// Failed to merge guests into the new [`User`].
    #[display("Failed to merge guests: {_0}")]
    Merge(merge_guests_into_user::ExecutionError),
}
