//! [`Identity`] definitions.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

#[cfg(doc)]
use crate::domain::User;
use crate::domain::user;

/// Identity of whoever stands behind a [`Session`].
///
/// [`Session`]: user::Session
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Identity {
    /// Anonymous visitor, known only by a generated ID.
    Guest {
        /// Generated ID of the guest.
        id: user::Id,
    },

    /// Visitor authenticated as a [`User`].
    Registered {
        /// ID of the [`User`].
        id: user::Id,

        /// [`user::Name`] of the [`User`].
        name: user::Name,

        /// [`user::Email`] of the [`User`].
        email: user::Email,
    },
}

impl Identity {
    /// Short name used when there is no [`Identity`] to derive it from.
    pub const PLACEHOLDER_NAME: &'static str = "Guest";

    /// Length of a guest's short name.
    const GUEST_SHORT_NAME_LEN: usize = 10;

    /// Creates a new guest [`Identity`] with a freshly generated ID.
    #[must_use]
    pub fn guest() -> Self {
        Self::Guest {
            id: user::Id::new_guest(),
        }
    }

    /// Returns the ID of this [`Identity`].
    #[must_use]
    pub fn id(&self) -> &user::Id {
        match self {
            Self::Guest { id } | Self::Registered { id, .. } => id,
        }
    }

    /// Indicates whether this [`Identity`] is a guest.
    #[must_use]
    pub fn is_guest(&self) -> bool {
        matches!(self, Self::Guest { .. })
    }

    /// Returns the guest ID of this [`Identity`], if it's a guest.
    #[must_use]
    pub fn guest_id(&self) -> Option<&user::Id> {
        match self {
            Self::Guest { id } => Some(id),
            Self::Registered { .. } => None,
        }
    }

    /// Returns the name to display for this [`Identity`].
    #[must_use]
    pub fn short_name(&self) -> Cow<'_, str> {
        match self {
            Self::Registered { name, .. } => Cow::Borrowed(name.as_ref()),
            Self::Guest { id } => Cow::Owned(
                id.as_ref()
                    .chars()
                    .take(Self::GUEST_SHORT_NAME_LEN)
                    .collect(),
            ),
        }
    }

    /// Returns the name to display for the provided [`Identity`], falling
    /// back to [`Identity::PLACEHOLDER_NAME`] if it's not resolved yet.
    #[must_use]
    pub fn short_name_of(identity: Option<&Self>) -> Cow<'_, str> {
        identity.map_or(Cow::Borrowed(Self::PLACEHOLDER_NAME), Self::short_name)
    }

    /// Indicates whether something attributed to the provided `user_id`
    /// belongs to this [`Identity`].
    ///
    /// Unattributed things belong to nobody.
    #[must_use]
    pub fn owns(&self, user_id: Option<&user::Id>) -> bool {
        user_id.is_some_and(|id| id == self.id())
    }
}

#[cfg(test)]
mod spec {
    use crate::domain::user;

    use super::Identity;

    fn registered() -> Identity {
        Identity::Registered {
            id: "u42".parse().unwrap(),
            name: user::Name::new("Alice Liddell").unwrap(),
            email: user::Email::new("alice@example.com").unwrap(),
        }
    }

    #[test]
    fn short_name() {
        assert_eq!(registered().short_name(), "Alice Liddell");

        let guest = Identity::Guest {
            id: "user-0123456789abcdef".parse().unwrap(),
        };
        assert_eq!(guest.short_name(), "user-01234");

        assert_eq!(Identity::short_name_of(None), Identity::PLACEHOLDER_NAME);
        assert_eq!(Identity::short_name_of(Some(&guest)), "user-01234");
    }

    #[test]
    fn owns() {
        let me = registered();

        assert!(me.owns(Some(&"u42".parse().unwrap())));
        assert!(!me.owns(Some(&"u43".parse().unwrap())));
        assert!(!me.owns(None));
    }

    #[test]
    fn fresh_guests_differ() {
        let (a, b) = (Identity::guest(), Identity::guest());

        assert!(a.is_guest());
        assert_eq!(a.guest_id(), Some(a.id()));
        assert_ne!(a.id(), b.id());
        assert_eq!(registered().guest_id(), None);
    }
}
