//! GraphQL [`Query`]s definitions.

use juniper::graphql_object;
use service::{query, Query as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the identity of the current visitor.
    ///
    /// A visitor without a valid session becomes a new guest.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "whoami",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn whoami(ctx: &Context) -> Result<api::Identity, Error> {
        ctx.identity().await.map(Into::into)
    }

    /// Returns the `Poll` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `POLL_NOT_EXISTS` - the `Poll` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "poll",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn poll(
        id: api::poll::Id,
        ctx: &Context,
    ) -> Result<api::Poll, Error> {
        ctx.service()
            .execute(query::poll::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| PollError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }
}

define_error! {
    enum PollError {
        #[code = "POLL_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Poll` with the specified ID does not exist"]
        NotExists,
    }
}
