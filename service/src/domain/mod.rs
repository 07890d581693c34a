//! Domain definitions.

pub mod content;
pub mod email;
pub mod poll;
pub mod user;

pub use self::{email::Email, poll::Poll, user::User};
