//! [`Identity`]-related definitions.

use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLScalar, GraphQLUnion};
use service::domain::user;

use crate::{
    api::{self, scalar},
    Context,
};

/// Identity of a visitor, as resolved from the session.
#[derive(Clone, Debug, GraphQLUnion)]
#[graphql(context = Context)]
pub enum Identity {
    /// Visitor without an account.
    Guest(GuestUser),

    /// Visitor logged into an account.
    Registered(RegisteredUser),
}

impl From<user::Identity> for Identity {
    fn from(identity: user::Identity) -> Self {
        match identity {
            user::Identity::Guest { id } => Self::Guest(GuestUser { id }),
            user::Identity::Registered { id, name, email } => {
                Self::Registered(RegisteredUser { id, name, email })
            }
        }
    }
}

/// Visitor without an account.
#[derive(Clone, Debug)]
pub struct GuestUser {
    /// ID of this [`GuestUser`].
    id: user::Id,
}

/// Visitor without an account.
///
/// Everything a guest creates is moved to the account the guest logs into or
/// registers later.
#[graphql_object(context = Context)]
impl GuestUser {
    /// Unique identifier of this `GuestUser`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "GuestUser.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id.clone().into()
    }

    /// Name to display for this `GuestUser`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "GuestUser.shortName",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn short_name(&self) -> String {
        user::Identity::Guest {
            id: self.id.clone(),
        }
        .short_name()
        .into_owned()
    }
}

/// Visitor logged into an account.
#[derive(Clone, Debug)]
pub struct RegisteredUser {
    /// ID of this [`RegisteredUser`].
    id: user::Id,

    /// Name of this [`RegisteredUser`].
    name: user::Name,

    /// Email of this [`RegisteredUser`].
    email: user::Email,
}

/// Visitor logged into an account.
#[graphql_object(context = Context)]
impl RegisteredUser {
    /// Unique identifier of this `RegisteredUser`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "RegisteredUser.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id.clone().into()
    }

    /// Name to display for this `RegisteredUser`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "RegisteredUser.shortName",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn short_name(&self) -> String {
        self.name.to_string()
    }

    /// Name of this `RegisteredUser`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "RegisteredUser.name",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn name(&self) -> Name {
        self.name.clone().into()
    }

    /// Email of this `RegisteredUser`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "RegisteredUser.email",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn email(&self) -> Email {
        self.email.clone().into()
    }
}

/// Unique identifier of a guest or a `RegisteredUser`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "UserId", with = scalar::Via::<user::Id>)]
pub struct Id(user::Id);

/// Name of a `RegisteredUser`, or a name a guest signs with.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "UserName", with = scalar::Via::<user::Name>)]
pub struct Name(user::Name);

/// Email of a `RegisteredUser`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "UserEmail", with = scalar::Via::<user::Email>)]
pub struct Email(user::Email);

/// Token of a login link.
#[derive(AsRef, Clone, Debug, From, GraphQLScalar, Into)]
#[graphql(name = "LoginToken", with = scalar::Via::<user::login::Token>)]
pub struct LoginToken(user::login::Token);

/// Token of a registration link.
#[derive(AsRef, Clone, Debug, From, GraphQLScalar, Into)]
#[graphql(
    name = "RegistrationToken",
    with = scalar::Via::<user::registration::Token>,
)]
pub struct RegistrationToken(user::registration::Token);
