//! [`Handler`] abstractions.

use std::future::Future;

/// Executable handler.
///
/// Everything the service does goes through this trait: commands and
/// queries are [`Handler`]s of the service, while storage and mail delivery
/// are [`Handler`]s of the infrastructure, parametrized by the operation
/// they perform (see [`operations`]).
///
/// [`operations`]: crate::operations
pub trait Handler<Args = ()> {
    /// Type of successful [`Handler`] result.
    type Ok;

    /// Type of this [`Handler`] error.
    type Err;

    /// Executes this [`Handler`] with the provided arguments.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
