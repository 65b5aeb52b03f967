//! [`Handler`] abstractions.

use std::future::Future;

/// Executable handler.
///
/// The single seam every layer is built upon: commands and queries of a
/// service, operations of a storage backend and publications into a
/// notification channel are all [`Handler`]s of their own argument types.
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
