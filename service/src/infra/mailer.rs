//! [`Mailer`]-related implementations.

use common::operations::Deliver;
use derive_more::{Display, Error as StdError};
use tracerr::Traced;

use crate::domain::Email;

/// Mail delivery operation.
pub use common::Handler as Mailer;

/// [`Mailer`] error.
#[derive(Clone, Debug, Display, StdError)]
#[display("Failed to deliver `Email`: {reason}")]
pub struct Error {
    /// Description of the failure.
    #[error(not(source))]
    reason: String,
}

impl Error {
    /// Creates a new [`Error`] with the provided `reason`.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// [`Mailer`] writing outbound [`Email`]s to the log instead of sending
/// them.
#[derive(Clone, Copy, Debug, Default)]
pub struct Log;

impl Mailer<Deliver<Email>> for Log {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Deliver(email): Deliver<Email>,
    ) -> Result<Self::Ok, Self::Err> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "delivering email",
        );
        tracing::debug!(html = %email.html, "email body");
        Ok(())
    }
}
