//! [`Query`] collection related to a single [`Poll`].

use common::operations::By;

use crate::domain::{
    poll::{self, Comment, Participant},
    Poll,
};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Poll`] by its [`poll::Id`].
pub type ById = DatabaseQuery<By<Option<Poll>, poll::Id>>;

/// Queries all the [`Participant`]s of a [`Poll`], oldest first.
pub type Participants = DatabaseQuery<By<Vec<Participant>, poll::Id>>;

/// Queries all the [`Comment`]s of a [`Poll`], oldest first.
pub type Comments = DatabaseQuery<By<Vec<Comment>, poll::Id>>;

#[cfg(test)]
mod spec {
    use common::DateTime;

    use crate::{
        command::{AddComment, AddParticipant, CreatePoll},
        domain::{poll, user},
        infra::database::Memory,
        spec::service,
        Query as _,
    };

    use super::{ById, Comments, Participants};

    #[tokio::test]
    async fn lists_poll_content_in_order() {
        let svc = service(Memory::default());
        let poll = svc
            .execute(CreatePoll {
                title: poll::Title::new("Team lunch").unwrap(),
                user_id: user::Id::new_guest(),
                notifications: false,
            })
            .await
            .unwrap();
        for name in ["Bob", "Carol"] {
            _ = svc
                .execute(AddParticipant {
                    poll_id: poll.id,
                    name: user::Name::new(name).unwrap(),
                    user_id: None,
                })
                .await
                .unwrap();
        }
        _ = svc
            .execute(AddComment {
                poll_id: poll.id,
                author_name: user::Name::new("Bob").unwrap(),
                content: poll::comment::Content::new("Works for me").unwrap(),
                user_id: None,
            })
            .await
            .unwrap();

        let found = svc.execute(ById::by(poll.id)).await.unwrap().unwrap();
        assert_eq!(found.title, poll.title);
        assert!(found.created_at <= DateTime::now().coerce());

        let names = svc
            .execute(Participants::by(poll.id))
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name.to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, ["Bob", "Carol"]);

        let comments = svc.execute(Comments::by(poll.id)).await.unwrap();
        assert_eq!(comments.len(), 1);

        assert!(svc
            .execute(ById::by(poll::Id::new()))
            .await
            .unwrap()
            .is_none());
    }
}
