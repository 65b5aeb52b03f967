//! [`Exchange`] read model definitions.
//!
//! [`Exchange`]: crate::domain::Exchange

pub mod list {
    //! [`Exchange`]s list definitions.

    use crate::domain::{exchange, user, Exchange};

    /// Selector of an [`Exchange`]s list, ordered from the newest to the
    /// oldest.
    pub type Selector = crate::read::Selector<Filter>;

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug)]
    pub struct Filter {
        /// ID of the user participating in the [`Exchange`]s, either as a
        /// requester or as a provider.
        pub participant_id: user::Id,

        /// [`exchange::Status`] of the [`Exchange`]s.
        pub status: Option<exchange::Status>,
    }

    impl Filter {
        /// Checks whether the provided [`Exchange`] passes this [`Filter`].
        #[must_use]
        pub fn matches(&self, exchange: &Exchange) -> bool {
            exchange.is_participant(self.participant_id)
                && self.status.map_or(true, |s| exchange.status == s)
        }
    }
}
