//! GraphQL [`Mutation`]s definitions.

use juniper::graphql_object;
use service::{command, domain::user::Identity, Command as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Destroys the current session.
    ///
    /// The next request starts a session of a new guest.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "logout",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub fn logout(ctx: &Context) -> bool {
        ctx.destroy_session();
        true
    }

    /// Emails a login link to the `RegisteredUser` with the provided email.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `USER_NOT_EXISTS` - no `RegisteredUser` has the provided email.
    #[tracing::instrument(
        skip_all,
        fields(
            email = %email,
            gql.name = "requestLogin",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn request_login(
        email: api::user::Email,
        ctx: &Context,
    ) -> Result<bool, Error> {
        let guest_id = ctx.identity().await?.guest_id().cloned();

        ctx.service()
            .execute(command::RequestLogin {
                email: email.into(),
                guest_id,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|()| true)
    }

    /// Logs in by the token of a login link.
    ///
    /// Everything the current guest and the guest requesting the link have
    /// created is moved to the `RegisteredUser`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_OR_EXPIRED_TOKEN` - the link is invalid or has expired;
    /// - `USER_NOT_EXISTS` - the `RegisteredUser` has been deleted meanwhile.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "login",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn login(
        token: api::user::LoginToken,
        ctx: &Context,
    ) -> Result<api::Identity, Error> {
        let current = ctx.identity().await?;

        let identity = ctx
            .service()
            .execute(command::AuthenticateUser {
                token: token.into(),
                current,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        ctx.persist_identity(identity.clone())?;

        Ok(identity.into())
    }

    /// Emails a registration link to the provided email.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `EMAIL_OCCUPIED` - the email is used by another `RegisteredUser`.
    #[tracing::instrument(
        skip_all,
        fields(
            email = %email,
            gql.name = "requestRegistration",
            name = %name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn request_registration(
        name: api::user::Name,
        email: api::user::Email,
        ctx: &Context,
    ) -> Result<bool, Error> {
        let guest_id = ctx.identity().await?.guest_id().cloned();

        ctx.service()
            .execute(command::RequestRegistration {
                name: name.into(),
                email: email.into(),
                guest_id,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|()| true)
    }

    /// Creates a `RegisteredUser` by the token of a registration link and
    /// logs into it.
    ///
    /// Everything the current guest and the guest requesting the link have
    /// created is moved to the new `RegisteredUser`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_OR_EXPIRED_TOKEN` - the link is invalid or has expired;
    /// - `EMAIL_OCCUPIED` - the email got occupied meanwhile.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "register",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn register(
        token: api::user::RegistrationToken,
        ctx: &Context,
    ) -> Result<api::Identity, Error> {
        let current = ctx.identity().await?;

        let identity = ctx
            .service()
            .execute(command::RegisterUser {
                token: token.into(),
                current,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        ctx.persist_identity(identity.clone())?;

        Ok(identity.into())
    }

    /// Deletes the account of the current `RegisteredUser` and logs out.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHENTICATION_REQUIRED` - the current visitor is a guest.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteAccount",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_account(ctx: &Context) -> Result<bool, Error> {
        let Identity::Registered { id, .. } = ctx.identity().await? else {
            return Err(api::AuthError::AuthenticationRequired.into())
                .map_err(ctx.error());
        };

        _ = ctx
            .service()
            .execute(command::DeleteUser { user_id: id })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        ctx.destroy_session();

        Ok(true)
    }

    /// Creates a new `Poll` owned by the current visitor.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createPoll",
            notifications = ?notifications,
            otel.name = Self::SPAN_NAME,
            title = %title,
        ),
    )]
    pub async fn create_poll(
        title: api::poll::Title,
        notifications: Option<bool>,
        ctx: &Context,
    ) -> Result<api::Poll, Error> {
        let user_id = ctx.identity().await?.id().clone();

        ctx.service()
            .execute(command::CreatePoll {
                title: title.into(),
                user_id,
                notifications: notifications.unwrap_or(true),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Answers the `Poll` on behalf of the current visitor.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `POLL_NOT_EXISTS` - the `Poll` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "addParticipant",
            name = %name,
            otel.name = Self::SPAN_NAME,
            poll_id = %poll_id,
        ),
    )]
    pub async fn add_participant(
        poll_id: api::poll::Id,
        name: api::user::Name,
        ctx: &Context,
    ) -> Result<api::poll::Participant, Error> {
        let user_id = ctx.identity().await?.id().clone();

        ctx.service()
            .execute(command::AddParticipant {
                poll_id: poll_id.into(),
                name: name.into(),
                user_id: Some(user_id),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Comments on the `Poll` on behalf of the current visitor.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `POLL_NOT_EXISTS` - the `Poll` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            author_name = %author_name,
            gql.name = "addComment",
            otel.name = Self::SPAN_NAME,
            poll_id = %poll_id,
        ),
    )]
    pub async fn add_comment(
        poll_id: api::poll::Id,
        author_name: api::user::Name,
        content: api::poll::CommentContent,
        ctx: &Context,
    ) -> Result<api::poll::Comment, Error> {
        let user_id = ctx.identity().await?.id().clone();

        ctx.service()
            .execute(command::AddComment {
                poll_id: poll_id.into(),
                author_name: author_name.into(),
                content: content.into(),
                user_id: Some(user_id),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Stops notifying about new `Participant`s of a `Poll` by the token of
    /// an unsubscribe link.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_OR_EXPIRED_TOKEN` - the link is invalid;
    /// - `POLL_NOT_EXISTS` - the `Poll` has been deleted.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "disableNotifications",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn disable_notifications(
        token: api::poll::UnsubscribeToken,
        ctx: &Context,
    ) -> Result<api::Poll, Error> {
        ctx.service()
            .execute(command::DisableNotifications {
                token: token.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

define_error! {
    enum UserError {
        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`RegisteredUser` does not exist"]
        NotExists,
    }
}

define_error! {
    enum EmailError {
        #[code = "EMAIL_OCCUPIED"]
        #[status = CONFLICT]
        #[message = "`UserEmail` is occupied by another `RegisteredUser`"]
        Occupied,
    }
}

impl AsError for command::resolve_identity::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Seal(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::merge_guests_into_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::request_login::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Mail(e) => e.try_as_error(),
            Self::Seal(e) => e.try_as_error(),
            Self::UserNotExists(_) => Some(UserError::NotExists.into()),
        }
    }
}

impl AsError for command::authenticate_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::InvalidToken(e) => e.try_as_error(),
            Self::Merge(e) => e.try_as_error(),
            Self::UserNotExists(_) => Some(UserError::NotExists.into()),
        }
    }
}

impl AsError for command::request_registration::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmailOccupied(_) => Some(EmailError::Occupied.into()),
            Self::Mail(e) => e.try_as_error(),
            Self::Seal(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::register_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmailOccupied(_) => Some(EmailError::Occupied.into()),
            Self::InvalidToken(e) => e.try_as_error(),
            Self::Merge(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::delete_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UserNotExists(_) => Some(UserError::NotExists.into()),
        }
    }
}

impl AsError for command::create_poll::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::add_participant::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PollNotExists(_) => {
                Some(api::query::PollError::NotExists.into())
            }
        }
    }
}

impl AsError for command::add_comment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PollNotExists(_) => {
                Some(api::query::PollError::NotExists.into())
            }
        }
    }
}

impl AsError for command::disable_notifications::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::InvalidToken(e) => e.try_as_error(),
            Self::PollNotExists(_) => {
                Some(api::query::PollError::NotExists.into())
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use service::{
        command::{register_user, request_login},
        domain::user,
        seal::UnsealError,
    };

    use crate::AsError as _;

    #[test]
    fn maps_domain_errors() {
        let err = request_login::ExecutionError::UserNotExists(
            user::Email::new("bob@example.com").unwrap(),
        )
        .into_error();
        assert_eq!(err.code, "USER_NOT_EXISTS");
        assert_eq!(err.status_code, http::StatusCode::NOT_FOUND);

        let err = register_user::ExecutionError::EmailOccupied(
            user::Email::new("bob@example.com").unwrap(),
        )
        .into_error();
        assert_eq!(err.code, "EMAIL_OCCUPIED");
        assert_eq!(err.status_code, http::StatusCode::CONFLICT);
    }

    #[test]
    fn maps_invalid_token() {
        let err = register_user::ExecutionError::InvalidToken(
            UnsealError::InvalidOrExpiredToken(
                jsonwebtoken::errors::ErrorKind::ExpiredSignature.into(),
            ),
        )
        .into_error();

        assert_eq!(err.code, "INVALID_OR_EXPIRED_TOKEN");
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
    }
}
