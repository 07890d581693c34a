//! [`Poll`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{
        poll::{self, Comment, Participant},
        Poll,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Option<Poll>, poll::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Poll>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Poll>, poll::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT id, title, user_id, notifications, created_at \
            FROM polls \
            WHERE id = $1::UUID";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| Poll {
                id: row.get("id"),
                title: row.get("title"),
                user_id: row.get("user_id"),
                notifications: row.get("notifications"),
                created_at: row.get("created_at"),
            }))
    }
}

impl<C> Database<Insert<Poll>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Poll>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(poll): Insert<Poll>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(poll)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Poll>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(poll): Update<Poll>,
    ) -> Result<Self::Ok, Self::Err> {
        let Poll {
            id,
            title,
            user_id,
            notifications,
            created_at,
        } = poll;

        const SQL: &str = "\
            INSERT INTO polls (id, title, user_id, notifications, created_at) \
            VALUES (\
                $1::UUID, $2::VARCHAR, $3::VARCHAR, $4::BOOL, $5::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET title = EXCLUDED.title, \
                user_id = EXCLUDED.user_id, \
                notifications = EXCLUDED.notifications";
        self.exec(SQL, &[&id, &title, &user_id, &notifications, &created_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Insert<Participant>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(participant): Insert<Participant>,
    ) -> Result<Self::Ok, Self::Err> {
        let Participant {
            id,
            poll_id,
            name,
            user_id,
            created_at,
        } = participant;

        const SQL: &str = "\
            INSERT INTO participants (id, poll_id, name, user_id, created_at) \
            VALUES (\
                $1::UUID, $2::UUID, $3::VARCHAR, $4::VARCHAR, $5::TIMESTAMPTZ\
            )";
        self.exec(SQL, &[&id, &poll_id, &name, &user_id, &created_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<Vec<Participant>, poll::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Participant>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Participant>, poll::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let poll_id = by.into_inner();

        const SQL: &str = "\
            SELECT id, poll_id, name, user_id, created_at \
            FROM participants \
            WHERE poll_id = $1::UUID \
            ORDER BY created_at, id";
        Ok(self
            .query(SQL, &[&poll_id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| Participant {
                id: row.get("id"),
                poll_id: row.get("poll_id"),
                name: row.get("name"),
                user_id: row.get("user_id"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}

impl<C> Database<Insert<Comment>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(comment): Insert<Comment>,
    ) -> Result<Self::Ok, Self::Err> {
        let Comment {
            id,
            poll_id,
            author_name,
            content,
            user_id,
            created_at,
        } = comment;

        const SQL: &str = "\
            INSERT INTO comments (\
                id, poll_id, author_name, content, user_id, created_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, \
                $3::VARCHAR, $4::TEXT, \
                $5::VARCHAR, $6::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[&id, &poll_id, &author_name, &content, &user_id, &created_at],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Select<By<Vec<Comment>, poll::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Comment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Comment>, poll::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let poll_id = by.into_inner();

        const SQL: &str = "\
            SELECT id, poll_id, author_name, content, user_id, created_at \
            FROM comments \
            WHERE poll_id = $1::UUID \
            ORDER BY created_at, id";
        Ok(self
            .query(SQL, &[&poll_id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| Comment {
                id: row.get("id"),
                poll_id: row.get("poll_id"),
                author_name: row.get("author_name"),
                content: row.get("content"),
                user_id: row.get("user_id"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}
