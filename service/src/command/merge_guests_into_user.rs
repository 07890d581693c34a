//! [`Command`] for merging guests into a [`User`].

use common::operations::{Commit, Transact, Transacted, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::{content, user},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for reassigning all the content attributed to some guests to
/// a [`User`].
///
/// Executing it again is a no-op.
#[derive(Clone, Debug)]
pub struct MergeGuestsIntoUser {
    /// ID of the [`User`] to reassign the content to.
    pub user_id: user::Id,

    /// IDs of the guests to reassign the content of.
    pub guest_ids: Vec<user::Id>,
}

impl<Db, Ml> Command<MergeGuestsIntoUser> for Service<Db, Ml>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Update<content::Reassignment>,
            Ok = u64,
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    /// Number of reassigned rows.
    type Ok = u64;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: MergeGuestsIntoUser,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let MergeGuestsIntoUser {
            user_id,
            mut guest_ids,
        } = cmd;

        guest_ids.retain(|id| *id != user_id);
        guest_ids.sort_unstable();
        guest_ids.dedup();
        if guest_ids.is_empty() {
            return Ok(0);
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut reassigned = 0;
        for &kind in content::Kind::ALL {
            reassigned += tx
                .execute(Update(content::Reassignment {
                    kind,
                    from: guest_ids.clone(),
                    to: user_id.clone(),
                }))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tracing::info!(
            user.id = %user_id,
            guests = guest_ids.len(),
            reassigned,
            "merged guests into `User`",
        );

        Ok(reassigned)
    }
}

/// Error of [`MergeGuestsIntoUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Insert, Select},
        DateTime,
    };

    use crate::{
        domain::{
            poll::{self, comment, participant, Comment, Participant},
            user, Poll,
        },
        infra::{database::Memory, Database as _},
        spec::service,
        Command as _,
    };

    use super::MergeGuestsIntoUser;

    fn id(s: &str) -> user::Id {
        s.parse().unwrap()
    }

    async fn poll(db: &Memory) -> poll::Id {
        let poll = Poll {
            id: poll::Id::new(),
            title: poll::Title::new("Team lunch").unwrap(),
            user_id: id("owner"),
            notifications: false,
            created_at: DateTime::now().coerce(),
        };
        db.execute(Insert(poll.clone())).await.unwrap();
        poll.id
    }

    async fn participate(db: &Memory, poll_id: poll::Id, owner: &str) {
        db.execute(Insert(Participant {
            id: participant::Id::new(),
            poll_id,
            name: user::Name::new("Someone").unwrap(),
            user_id: Some(id(owner)),
            created_at: DateTime::now().coerce(),
        }))
        .await
        .unwrap();
    }

    async fn comment(db: &Memory, poll_id: poll::Id, owner: Option<&str>) {
        db.execute(Insert(Comment {
            id: comment::Id::new(),
            poll_id,
            author_name: user::Name::new("Someone").unwrap(),
            content: comment::Content::new("Works for me").unwrap(),
            user_id: owner.map(id),
            created_at: DateTime::now().coerce(),
        }))
        .await
        .unwrap();
    }

    async fn owners(db: &Memory, poll_id: poll::Id) -> Vec<Option<String>> {
        let participants = db
            .execute(Select(By::<Vec<Participant>, _>::new(poll_id)))
            .await
            .unwrap();
        let comments = db
            .execute(Select(By::<Vec<Comment>, _>::new(poll_id)))
            .await
            .unwrap();
        participants
            .into_iter()
            .map(|p| p.user_id)
            .chain(comments.into_iter().map(|c| c.user_id))
            .map(|id| id.map(String::from))
            .collect()
    }

    #[tokio::test]
    async fn reassigns_every_guest_content() {
        let db = Memory::default();
        let svc = service(db.clone());
        let poll_id = poll(&db).await;
        participate(&db, poll_id, "g1").await;
        participate(&db, poll_id, "g2").await;
        participate(&db, poll_id, "other").await;
        comment(&db, poll_id, Some("g1")).await;
        comment(&db, poll_id, Some("other")).await;
        comment(&db, poll_id, None).await;

        let reassigned = svc
            .execute(MergeGuestsIntoUser {
                user_id: id("u"),
                guest_ids: vec![id("g1"), id("g2")],
            })
            .await
            .unwrap();

        assert_eq!(reassigned, 3);
        assert_eq!(
            owners(&db, poll_id).await,
            [
                Some("u"),
                Some("u"),
                Some("other"),
                Some("u"),
                Some("other"),
                None,
            ]
            .map(|o| o.map(String::from)),
        );
    }

    #[tokio::test]
    async fn rerun_is_noop() {
        let db = Memory::default();
        let svc = service(db.clone());
        let poll_id = poll(&db).await;
        participate(&db, poll_id, "g1").await;
        comment(&db, poll_id, Some("g1")).await;
        let merge = MergeGuestsIntoUser {
            user_id: id("u"),
            guest_ids: vec![id("g1")],
        };

        assert_eq!(svc.execute(merge.clone()).await.unwrap(), 2);
        let before = owners(&db, poll_id).await;
        assert_eq!(svc.execute(merge).await.unwrap(), 0);

        assert_eq!(owners(&db, poll_id).await, before);
    }

    #[tokio::test]
    async fn empty_guests_touch_nothing() {
        let db = Memory::default();
        let svc = service(db.clone());
        let operations = db.operations();

        let reassigned = svc
            .execute(MergeGuestsIntoUser {
                user_id: id("u"),
                guest_ids: vec![],
            })
            .await
            .unwrap();

        assert_eq!(reassigned, 0);
        assert_eq!(db.operations(), operations);
    }
}
