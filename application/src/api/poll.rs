//! [`Poll`]-related definitions.

use common::DateTime;
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLScalar};
use service::{domain, query, Query as _};
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    AsError, Context, Error,
};

/// A poll people answer to find a time to meet.
#[derive(Clone, Debug, From)]
pub struct Poll(domain::Poll);

/// A poll people answer to find a time to meet.
#[graphql_object(context = Context)]
impl Poll {
    /// Unique identifier of this `Poll`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Poll.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Title of this `Poll`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Poll.title",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn title(&self) -> Title {
        self.0.title.clone().into()
    }

    /// Indicator whether the owner of this `Poll` is notified about new
    /// `Participant`s.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Poll.notifications",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn notifications(&self) -> bool {
        self.0.notifications
    }

    /// Indicator whether this `Poll` was created by the current visitor.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Poll.ownedByMe",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn owned_by_me(&self, ctx: &Context) -> Result<bool, Error> {
        Ok(ctx.identity().await?.owns(Some(&self.0.user_id)))
    }

    /// `DateTime` when this `Poll` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Poll.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }

    /// `Participant`s of this `Poll`, oldest first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Poll.participants",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn participants(
        &self,
        ctx: &Context,
    ) -> Result<Vec<Participant>, Error> {
        ctx.service()
            .execute(query::poll::Participants::by(self.0.id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|ps| ps.into_iter().map(Into::into).collect())
    }

    /// `Comment`s on this `Poll`, oldest first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Poll.comments",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn comments(&self, ctx: &Context) -> Result<Vec<Comment>, Error> {
        ctx.service()
            .execute(query::poll::Comments::by(self.0.id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|cs| cs.into_iter().map(Into::into).collect())
    }
}

/// A person answering a [`Poll`].
#[derive(Clone, Debug, From)]
pub struct Participant(domain::poll::Participant);

/// A person answering a `Poll`.
#[graphql_object(context = Context)]
impl Participant {
    /// Unique identifier of this `Participant`.
    pub fn id(&self) -> ParticipantId {
        self.0.id.into()
    }

    /// Name this `Participant` entered.
    pub fn name(&self) -> api::user::Name {
        self.0.name.clone().into()
    }

    /// Indicator whether this `Participant` was added by the current
    /// visitor.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Participant.ownedByMe",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn owned_by_me(&self, ctx: &Context) -> Result<bool, Error> {
        Ok(ctx.identity().await?.owns(self.0.user_id.as_ref()))
    }

    /// `DateTime` when this `Participant` was added.
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// A comment on a [`Poll`].
#[derive(Clone, Debug, From)]
pub struct Comment(domain::poll::Comment);

/// A comment on a `Poll`.
#[graphql_object(context = Context)]
impl Comment {
    /// Unique identifier of this `Comment`.
    pub fn id(&self) -> CommentId {
        self.0.id.into()
    }

    /// Name this `Comment` is signed with.
    pub fn author_name(&self) -> api::user::Name {
        self.0.author_name.clone().into()
    }

    /// Content of this `Comment`.
    pub fn content(&self) -> CommentContent {
        self.0.content.clone().into()
    }

    /// Indicator whether this `Comment` was written by the current visitor.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Comment.ownedByMe",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn owned_by_me(&self, ctx: &Context) -> Result<bool, Error> {
        Ok(ctx.identity().await?.owns(self.0.user_id.as_ref()))
    }

    /// `DateTime` when this `Comment` was written.
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of a `Poll`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::poll::Id)]
#[into(domain::poll::Id)]
#[graphql(name = "PollId", transparent)]
pub struct Id(Uuid);

/// Title of a `Poll`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "PollTitle", with = scalar::Via::<domain::poll::Title>)]
pub struct Title(domain::poll::Title);

/// Unique identifier of a `Participant`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::poll::participant::Id)]
#[into(domain::poll::participant::Id)]
#[graphql(name = "ParticipantId", transparent)]
pub struct ParticipantId(Uuid);

/// Unique identifier of a `Comment`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::poll::comment::Id)]
#[into(domain::poll::comment::Id)]
#[graphql(name = "CommentId", transparent)]
pub struct CommentId(Uuid);

/// Content of a `Comment`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "CommentContent",
    with = scalar::Via::<domain::poll::comment::Content>,
)]
pub struct CommentContent(domain::poll::comment::Content);

/// Token of an unsubscribe link.
#[derive(AsRef, Clone, Debug, From, GraphQLScalar, Into)]
#[graphql(
    name = "UnsubscribeToken",
    with = scalar::Via::<domain::poll::unsubscribe::Token>,
)]
pub struct UnsubscribeToken(domain::poll::unsubscribe::Token);
