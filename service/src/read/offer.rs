//! [`Offer`] read model definitions.
//!
//! [`Offer`]: crate::domain::Offer

pub mod list {
    //! [`Offer`]s list definitions.

    use crate::domain::{offer, user};
    #[cfg(doc)]
    use crate::domain::Offer;

    /// Selector of an [`Offer`]s list, ordered from the newest to the oldest.
    pub type Selector = crate::read::Selector<Filter>;

    /// Filter for [`Selector`].
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// ID of the user owning the [`Offer`]s.
        pub owner_id: Option<user::Id>,

        /// [`offer::Category`] of the [`Offer`]s.
        pub category: Option<offer::Category>,

        /// [`offer::Status`] of the [`Offer`]s.
        pub status: Option<offer::Status>,
    }

    impl Filter {
        /// Checks whether the provided [`Offer`] passes this [`Filter`].
        #[must_use]
        pub fn matches(&self, offer: &offer::Offer) -> bool {
            let Self {
                owner_id,
                category,
                status,
            } = self;
            owner_id.map_or(true, |id| offer.owner_id == id)
                && category
                    .as_ref()
                    .map_or(true, |c| offer.category.as_ref() == Some(c))
                && status.map_or(true, |s| offer.status == s)
        }
    }
}
