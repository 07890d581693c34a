//! [`Command`] definition.

pub mod add_comment;
pub mod add_participant;
pub mod authenticate_user;
pub mod create_poll;
pub mod delete_user;
pub mod disable_notifications;
pub mod merge_guests_into_user;
pub mod register_user;
pub mod request_login;
pub mod request_registration;
pub mod resolve_identity;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    add_comment::AddComment, add_participant::AddParticipant,
    authenticate_user::AuthenticateUser, create_poll::CreatePoll,
    delete_user::DeleteUser, disable_notifications::DisableNotifications,
    merge_guests_into_user::MergeGuestsIntoUser, register_user::RegisterUser,
    request_login::RequestLogin, request_registration::RequestRegistration,
    resolve_identity::ResolveIdentity,
};
