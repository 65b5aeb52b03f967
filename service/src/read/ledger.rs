//! Ledger read model definitions.

use common::Minutes;
use derive_more::{Deref, From, Into};

#[cfg(doc)]
use crate::domain::ledger::Entry;

/// Balance of a user, derived as the sum of all their [`Entry`]s.
///
/// May be negative, as overdrafts are allowed.
#[derive(Clone, Copy, Debug, Default, Deref, Eq, From, Hash, Into, PartialEq)]
pub struct Balance(pub Minutes);

pub mod list {
    //! [`Entry`]s list definitions.

    use crate::domain::user;
    #[cfg(doc)]
    use crate::domain::ledger::Entry;

    /// Selector of a user's [`Entry`]s list, ordered from the newest to the
    /// oldest.
    pub type Selector = crate::read::Selector<Filter>;

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug)]
    pub struct Filter {
        /// ID of the user whose [`Entry`]s are listed.
        pub user_id: user::Id,
    }
}
