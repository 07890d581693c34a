//! Magic link login definitions.

use serde::{Deserialize, Serialize};

use crate::{domain::user, seal};
#[cfg(doc)]
use crate::domain::User;

/// Claims sealed into a login link.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Claims {
    /// ID of the [`User`] logging in.
    pub user_id: user::Id,

    /// ID of the guest who requested the link, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_id: Option<user::Id>,
}

/// Sealed login [`Claims`].
pub type Token = seal::Token<Claims>;
