//! Domain definitions.

pub mod exchange;
pub mod ledger;
pub mod offer;
pub mod report;
pub mod user;

pub use self::{exchange::Exchange, offer::Offer, report::Report};
