//! [`Command`] for authenticating a [`User`] by a login link.

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::Session;
use crate::{
    domain::{
        user::{self, login, Identity},
        User,
    },
    infra::{database, Database},
    seal::UnsealError,
    Service,
};

use super::{merge_guests_into_user, Command, MergeGuestsIntoUser};

/// [`Command`] for authenticating a [`User`] by a login link.
///
/// Content of the guest who requested the link, and of the guest following
/// it (if another device is used), is merged into the [`User`].
#[derive(Clone, Debug)]
pub struct AuthenticateUser {
    /// [`login::Token`] of the followed link.
    pub token: login::Token,

    /// [`Identity`] of the current [`Session`].
    pub current: Identity,
}

impl<Db, Ml> Command<AuthenticateUser> for Service<Db, Ml>
where
    Db: Database<
        Select<By<Option<User>, user::Id>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
    Self: Command<
        MergeGuestsIntoUser,
        Ok = u64,
        Err = Traced<merge_guests_into_user::ExecutionError>,
    >,
{
    /// [`Identity`] to store in the [`Session`].
    type Ok = Identity;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthenticateUser,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthenticateUser { token, current } = cmd;

        let login::Claims { user_id, guest_id } = self
            .unseal(&token)
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let user = self
            .database()
            .execute(Select(By::new(user_id.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;

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

/// Error of [`AuthenticateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Login link is invalid or expired.
    #[display("Invalid login link: {_0}")]
    InvalidToken(UnsealError),

    /// Failed to merge guests into the [`User`].
    #[display("Failed to merge guests: {_0}")]
    Merge(merge_guests_into_user::ExecutionError),

    /// [`User`] the login link was issued for does not exist anymore.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{
        operations::{By, Insert, Select},
        DateTime,
    };

    use crate::{
        command::{AddComment, RequestLogin},
        domain::{
            poll::{self, comment, Comment},
            user::{self, login, Identity},
            Poll, User,
        },
        infra::{database::Memory, Database as _},
        spec::{service_with_outbox, token_from, Outbox, TestService},
        Command as _,
    };

    use super::{AuthenticateUser, ExecutionError};

    async fn setup() -> (Memory, Outbox, TestService, User, poll::Id) {
        let db = Memory::default();
        let outbox = Outbox::default();
        let svc = service_with_outbox(db.clone(), outbox.clone());

        let user = User {
            id: "u42".parse().unwrap(),
            name: user::Name::new("Alice").unwrap(),
            email: user::Email::new("alice@example.com").unwrap(),
            created_at: DateTime::now().coerce(),
            deleted_at: None,
        };
        db.execute(Insert(user.clone())).await.unwrap();

        let poll = Poll {
            id: poll::Id::new(),
            title: poll::Title::new("Team lunch").unwrap(),
            user_id: "owner".parse().unwrap(),
            notifications: false,
            created_at: DateTime::now().coerce(),
        };
        db.execute(Insert(poll.clone())).await.unwrap();

        (db, outbox, svc, user, poll.id)
    }

    async fn comment_as(svc: &TestService, poll_id: poll::Id, guest: &Identity) {
        _ = svc
            .execute(AddComment {
                poll_id,
                author_name: user::Name::new("Guest").unwrap(),
                content: comment::Content::new("Friday works").unwrap(),
                user_id: Some(guest.id().clone()),
            })
            .await
            .unwrap();
    }

    async fn comment_owners(db: &Memory, poll_id: poll::Id) -> Vec<String> {
        db.execute(Select(By::<Vec<Comment>, _>::new(poll_id)))
            .await
            .unwrap()
            .into_iter()
            .filter_map(|c| c.user_id.map(String::from))
            .collect()
    }

    #[tokio::test]
    async fn guest_comment_follows_login() {
        let (db, outbox, svc, user, poll_id) = setup().await;
        let g1 = Identity::guest();
        comment_as(&svc, poll_id, &g1).await;

        svc.execute(RequestLogin {
            email: user.email.clone(),
            guest_id: g1.guest_id().cloned(),
        })
        .await
        .unwrap();
        let token = login::Token::new(token_from(&outbox.sent()[0]));
        let identity = svc
            .execute(AuthenticateUser {
                token,
                current: g1.clone(),
            })
            .await
            .unwrap();

        assert_eq!(identity, user.identity());
        assert_eq!(comment_owners(&db, poll_id).await, ["u42"]);
    }

    #[tokio::test]
    async fn merges_guest_of_another_device() {
        let (db, outbox, svc, user, poll_id) = setup().await;
        let (g1, g2) = (Identity::guest(), Identity::guest());
        comment_as(&svc, poll_id, &g1).await;
        comment_as(&svc, poll_id, &g2).await;

        svc.execute(RequestLogin {
            email: user.email.clone(),
            guest_id: g1.guest_id().cloned(),
        })
        .await
        .unwrap();
        let token = login::Token::new(token_from(&outbox.sent()[0]));
        _ = svc
            .execute(AuthenticateUser { token, current: g2 })
            .await
            .unwrap();

        assert_eq!(comment_owners(&db, poll_id).await, ["u42", "u42"]);
    }

    #[tokio::test]
    async fn rejects_expired_link() {
        let (db, _, svc, user, poll_id) = setup().await;
        let g1 = Identity::guest();
        comment_as(&svc, poll_id, &g1).await;
        let token = svc
            .seal_until(
                login::Claims {
                    user_id: user.id,
                    guest_id: g1.guest_id().cloned(),
                },
                Some((DateTime::now() - Duration::from_secs(5)).coerce()),
            )
            .unwrap();

        let err = svc
            .execute(AuthenticateUser {
                token,
                current: g1.clone(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.into_inner(), ExecutionError::InvalidToken(_)));
        assert_eq!(
            comment_owners(&db, poll_id).await,
            [String::from(g1.id().clone())],
        );
    }
}
