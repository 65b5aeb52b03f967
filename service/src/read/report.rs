//! [`Report`] read model definitions.
//!
//! [`Report`]: crate::domain::Report

pub mod list {
    //! [`Report`]s list definitions.

    use crate::domain::{user, Report};

    /// Selector of a [`Report`]s list, ordered from the newest to the oldest.
    pub type Selector = crate::read::Selector<Filter>;

    /// Filter for [`Selector`].
    #[derive(Clone, Copy, Debug)]
    pub struct Filter {
        /// ID of the user who filed the [`Report`]s.
        pub reporter_id: user::Id,
    }

    impl Filter {
        /// Checks whether the provided [`Report`] passes this [`Filter`].
        #[must_use]
        pub fn matches(&self, report: &Report) -> bool {
            report.reporter_id == self.reporter_id
        }
    }
}
