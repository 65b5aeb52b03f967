//! Read entities definitions.

pub mod exchange;
pub mod ledger;
pub mod offer;
pub mod report;

/// Selector of a finite list of entities, ordered from the newest to the
/// oldest.
#[derive(Clone, Copy, Debug)]
pub struct Selector<F> {
    /// Filter being applied to the listed entities.
    pub filter: F,

    /// Maximum number of entities to list.
    pub limit: usize,
}
