//! Classification of [`Service`] errors.
//!
//! [`Service`]: crate::Service

use derive_more::Display;
use tracerr::Traced;

/// Kind of a [`Service`] operation failure.
///
/// [`Service`]: crate::Service
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Kind {
    /// Malformed input, recoverable by correcting it.
    #[display("validation error")]
    Validation,

    /// Caller is not authenticated, or is not authorized for the action.
    #[display("authorization error")]
    Auth,

    /// Referenced entity does not exist.
    #[display("not found")]
    NotFound,

    /// Current state of the entity doesn't permit the requested transition.
    ///
    /// Callers may retry after re-reading the current state.
    #[display("conflict")]
    Conflict,

    /// Underlying storage failure.
    #[display("storage error")]
    Storage,
}

/// Error having a [`Kind`].
pub trait Kinded {
    /// Returns the [`Kind`] of this error.
    fn kind(&self) -> Kind;
}

impl<E: Kinded> Kinded for Traced<E> {
    fn kind(&self) -> Kind {
        self.as_ref().kind()
    }
}
