//! Content attributable to a guest or a [`User`].
//!
//! [`User`]: crate::domain::User

use common::define_kind;

use crate::domain::user;
#[cfg(doc)]
use crate::domain::poll::{Comment, Participant};

define_kind! {
    #[doc = "Kind of content attributed to a `user::Id`."]
    enum Kind {
        #[doc = "[`Participant`] of a poll."]
        Participant = 1,

        #[doc = "[`Comment`] on a poll."]
        Comment = 2,
    }
}

/// Reassignment of all the content of a [`Kind`] from some owners to
/// another one.
#[derive(Clone, Debug)]
pub struct Reassignment {
    /// [`Kind`] of the content to reassign.
    pub kind: Kind,

    /// IDs of the current owners.
    pub from: Vec<user::Id>,

    /// ID of the new owner.
    pub to: user::Id,
}
