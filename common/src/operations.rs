//! Operations [`Handler`]s are parametrized with.
//!
//! Storage backends and notification channels implement [`Handler`] for the
//! operations they support, over the values they store or publish.

use std::marker::PhantomData;

use crate::Handler;

/// Stores a new value.
#[derive(Clone, Copy, Debug)]
pub struct Insert<T>(pub T);

/// Loads stored values, usually by a [`By`] selector.
#[derive(Clone, Copy, Debug)]
pub struct Select<T>(pub T);

/// Operation to replace a stored value with a new one, but only if the
/// stored value is still in the expected state.
///
/// Resolves to `true` if the value has been replaced, or `false` if the
/// stored state has diverged (or the value doesn't exist).
#[derive(Clone, Copy, Debug)]
pub struct Swap<T, S> {
    /// State the stored value is expected to be in.
    pub expected: S,

    /// New value to be stored.
    pub new: T,
}

/// Starts a transaction, or joins the running one.
#[derive(Clone, Copy, Debug)]
pub struct Transact;

/// Transactional counterpart of a [`Handler`] `T`.
pub type Transacted<T> = <T as Handler<Transact>>::Ok;

/// Commits a transaction started with [`Transact`].
#[derive(Clone, Copy, Debug)]
pub struct Commit;

/// Publishes a value to subscribers, with no delivery guarantees.
#[derive(Clone, Copy, Debug)]
pub struct Publish<T>(pub T);

/// Selector of `W`s by a `B` key.
#[derive(Clone, Copy, Debug)]
pub struct By<W, B> {
    /// Type of selected values.
    _what: PhantomData<W>,

    /// Key to select by.
    by: B,
}

impl<W, B> By<W, B> {
    /// Creates a new [`By`] selector out of the provided key.
    #[must_use]
    pub fn new(by: B) -> Self {
        Self {
            _what: PhantomData,
            by,
        }
    }

    /// Unwraps the key of this [`By`] selector.
    #[must_use]
    pub fn into_inner(self) -> B {
        self.by
    }
}
