//! Magic link registration definitions.

use serde::{Deserialize, Serialize};

use crate::{domain::user, seal};

/// Claims sealed into a registration link.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Claims {
    /// [`user::Name`] of the account to create.
    pub name: user::Name,

    /// [`user::Email`] of the account to create.
    pub email: user::Email,

    /// ID of the guest who requested the link, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_id: Option<user::Id>,
}

/// Sealed registration [`Claims`].
pub type Token = seal::Token<Claims>;
