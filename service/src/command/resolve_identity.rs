//! [`Command`] for resolving the [`Identity`] behind a [`Session`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        user::{self, session, Identity, Session},
        User,
    },
    infra::{database, Database},
    seal::SealError,
    Service,
};

use super::Command;

/// [`Command`] for resolving the [`Identity`] behind a [`Session`].
///
/// Safe to execute on every request: a resolved [`Session`] of an existing
/// [`Identity`] is left untouched.
#[derive(Clone, Debug, Default, From)]
pub struct ResolveIdentity {
    /// [`session::Token`] the client presented, if any.
    pub token: Option<session::Token>,
}

/// Output of [`ResolveIdentity`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Resolved [`Identity`].
    pub identity: Identity,

    /// [`session::Token`] to hand back to the client, if the [`Session`] has
    /// changed.
    pub persist: Option<session::Token>,
}

impl<Db, Ml> Command<ResolveIdentity> for Service<Db, Ml>
where
    Db: Database<
        Select<By<Option<User>, user::Id>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ResolveIdentity,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let session = cmd
            .token
            .and_then(|token| {
                self.unseal(&token)
                    .inspect_err(|e| {
                        tracing::debug!("discarding `Session`: {e}");
                    })
                    .ok()
            })
            .unwrap_or_default();

        let current = match session.user {
            Some(identity @ Identity::Registered { .. }) => {
                let user = self
                    .database()
                    .execute(Select(By::new(identity.id().clone())))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                if user.is_none() {
                    tracing::info!(
                        user.id = %identity.id(),
                        "`User` no longer exists, downgrading to a guest",
                    );
                }
                user.map(|_| identity)
            }
            guest @ (Some(Identity::Guest { .. }) | None) => guest,
        };
        if let Some(identity) = current {
            return Ok(Output {
                identity,
                persist: None,
            });
        }

        let identity = Identity::guest();
        let token = self
            .seal(Session::new(identity.clone()), None)
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(Output {
            identity,
            persist: Some(token),
        })
    }
}

/// Error of [`ResolveIdentity`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Failed to seal the [`Session`].
    #[display("Failed to seal `Session`: {_0}")]
    Seal(SealError),
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{Insert, Update},
        DateTime,
    };

    use crate::{
        domain::{
            user::{self, Identity, Session},
            User,
        },
        infra::{database::Memory, Database as _},
        spec::{service, TestService},
        Command as _,
    };

    use super::{Output, ResolveIdentity};

    async fn resolve(
        svc: &TestService,
        token: Option<user::session::Token>,
    ) -> Output {
        svc.execute(ResolveIdentity { token }).await.unwrap()
    }

    fn alice() -> User {
        User {
            id: user::Id::new(),
            name: user::Name::new("Alice").unwrap(),
            email: user::Email::new("alice@example.com").unwrap(),
            created_at: DateTime::now().coerce(),
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn creates_guest_without_session() {
        let svc = service(Memory::default());

        let Output { identity, persist } = resolve(&svc, None).await;

        assert!(identity.is_guest());
        assert!(!identity.id().as_ref().is_empty());
        let session: Session = svc.unseal(&persist.unwrap()).unwrap();
        assert_eq!(session.user, Some(identity));
    }

    #[tokio::test]
    async fn keeps_resolved_session() {
        let svc = service(Memory::default());

        let first = resolve(&svc, None).await;
        let second = resolve(&svc, first.persist.clone()).await;
        let third = resolve(&svc, first.persist).await;

        assert_eq!(second.identity, first.identity);
        assert!(second.persist.is_none());
        assert_eq!(third.identity, first.identity);
        assert!(third.persist.is_none());
    }

    #[tokio::test]
    async fn treats_invalid_token_as_no_session() {
        let svc = service(Memory::default());

        let out = resolve(&svc, Some("garbage".parse().unwrap())).await;

        assert!(out.identity.is_guest());
        assert!(out.persist.is_some());
    }

    #[tokio::test]
    async fn keeps_registered_user() {
        let db = Memory::default();
        let svc = service(db.clone());
        let user = alice();
        db.execute(Insert(user.clone())).await.unwrap();
        let token = svc.seal(Session::new(user.identity()), None).unwrap();

        let out = resolve(&svc, Some(token)).await;

        assert_eq!(out.identity, user.identity());
        assert!(out.persist.is_none());
    }

    #[tokio::test]
    async fn downgrades_deleted_user_to_guest() {
        let db = Memory::default();
        let svc = service(db.clone());
        let mut user = alice();
        db.execute(Insert(user.clone())).await.unwrap();
        let token = svc.seal(Session::new(user.identity()), None).unwrap();
        user.deleted_at = Some(DateTime::now().coerce());
        db.execute(Update(user.clone())).await.unwrap();

        let out = resolve(&svc, Some(token)).await;

        assert!(matches!(out.identity, Identity::Guest { .. }));
        assert_ne!(out.identity.id(), &user.id);
        let session: Session = svc.unseal(&out.persist.unwrap()).unwrap();
        assert_eq!(session.user, Some(out.identity));
    }
}
