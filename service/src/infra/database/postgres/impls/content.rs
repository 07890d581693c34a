//! Attributable content [`Database`] implementations.

use common::operations::Update;
use tracerr::Traced;

use crate::{
    domain::content,
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Update<content::Reassignment>> for Postgres<C>
where
    C: Connection,
{
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(re): Update<content::Reassignment>,
    ) -> Result<Self::Ok, Self::Err> {
        let content::Reassignment { kind, from, to } = re;
        if from.is_empty() {
            return Ok(0);
        }

        let sql = format!(
            "UPDATE {table} \
             SET user_id = $1::VARCHAR \
             WHERE user_id = ANY($2::VARCHAR[])",
            table = match kind {
                content::Kind::Participant => "participants",
                content::Kind::Comment => "comments",
            },
        );
        self.exec(sql.as_str(), &[&to, &from])
            .await
            .map_err(tracerr::wrap!())
    }
}
