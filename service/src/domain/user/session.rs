//! [`Session`] definitions.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

use crate::{domain::user::Identity, seal};

/// Visitor session, sealed into a cookie between requests.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Session {
    /// [`Identity`] attached to this [`Session`], if resolved already.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Identity>,
}

impl Session {
    /// Creates a new [`Session`] carrying the provided [`Identity`].
    #[must_use]
    pub fn new(user: Identity) -> Self {
        Self { user: Some(user) }
    }

    /// Returns the [`Identity`] of this [`Session`].
    ///
    /// # Errors
    ///
    /// If this [`Session`] has not been resolved yet, which means the caller
    /// skipped the resolution step.
    pub fn current_user(&self) -> Result<&Identity, MissingUserError> {
        self.user.as_ref().ok_or(MissingUserError)
    }
}

/// Sealed representation of a [`Session`].
pub type Token = seal::Token<Session>;

/// Error of accessing the [`Identity`] of an unresolved [`Session`].
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("Tried to get user but no user found")]
pub struct MissingUserError;

#[cfg(test)]
mod spec {
    use super::{Identity, Session};

    #[test]
    fn current_user_requires_resolution() {
        assert!(Session::default().current_user().is_err());

        let guest = Identity::guest();
        assert_eq!(Session::new(guest.clone()).current_user().ok(), Some(&guest));
    }
}
