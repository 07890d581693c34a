//! Notifications unsubscription definitions.

use serde::{Deserialize, Serialize};

use crate::{domain::poll, seal};
#[cfg(doc)]
use crate::domain::Poll;

/// Claims sealed into an unsubscribe link.
///
/// Never expire, so an old notification still allows to unsubscribe.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Claims {
    /// ID of the [`Poll`] to stop notifying about.
    pub poll_id: poll::Id,
}

/// Sealed unsubscribe [`Claims`].
pub type Token = seal::Token<Claims>;
