//! GraphQL API definitions.

pub mod exchange;
pub mod ledger;
mod mutation;
pub mod offer;
mod query;
pub mod report;
mod subscription;
pub mod user;

use crate::define_error;

pub use self::{
    exchange::Exchange,
    mutation::Mutation,
    offer::Offer,
    query::Query,
    report::Report,
    subscription::{Event, Subscription},
};

/// GraphQL schema.
pub type Schema = juniper::RootNode<'static, Query, Mutation, Subscription>;

define_error! {
    enum OfferError {
        #[code = "OFFER_NOT_EXISTS"]
        #[kind = NotFound]
        #[message = "`Offer` does not exist"]
        NotExists,

        #[code = "NOT_OFFER_OWNER"]
        #[kind = Auth]
        #[message = "Authenticated `User` doesn't own the `Offer`"]
        NotOwner,

        #[code = "OFFER_NOT_OPEN"]
        #[kind = Conflict]
        #[message = "`Offer` is not open"]
        NotOpen,

        #[code = "OWN_OFFER"]
        #[kind = Auth]
        #[message = "`Offer` cannot be taken by its owner"]
        OwnOffer,

        #[code = "INVALID_OFFER_TITLE"]
        #[kind = Validation]
        #[message = "`Offer` title must be non-empty and not too long"]
        InvalidTitle,

        #[code = "INVALID_OFFER_DURATION"]
        #[kind = Validation]
        #[message = "`Offer` duration must be between 1 minute and 1 year"]
        InvalidDuration,
    }
}

define_error! {
    enum ExchangeError {
        #[code = "EXCHANGE_NOT_EXISTS"]
        #[kind = NotFound]
        #[message = "`Exchange` does not exist"]
        NotExists,

        #[code = "NOT_EXCHANGE_PARTICIPANT"]
        #[kind = Auth]
        #[message = "Authenticated `User` doesn't participate in the `Exchange`"]
        NotParticipant,

        #[code = "NOT_EXCHANGE_PROVIDER"]
        #[kind = Auth]
        #[message = "Authenticated `User` is not the `Exchange` provider"]
        NotProvider,

        #[code = "NOT_EXCHANGE_COUNTERPARTY"]
        #[kind = Validation]
        #[message = "`User` is not the counterparty in the `Exchange`"]
        NotCounterparty,

        #[code = "INVALID_EXCHANGE_STATUS"]
        #[kind = Conflict]
        #[message = "`Exchange` status doesn't allow this transition"]
        InvalidStatus,

        #[code = "EXCHANGE_MODIFIED"]
        #[kind = Conflict]
        #[message = "`Exchange` has been modified concurrently"]
        Diverged,
    }
}

define_error! {
    enum ReportError {
        #[code = "INVALID_REPORT_REASON"]
        #[kind = Validation]
        #[message = "`Report` reason must be non-empty and not too long"]
        InvalidReason,

        #[code = "SELF_REPORT"]
        #[kind = Validation]
        #[message = "`User` cannot report themselves"]
        SelfReport,

        #[code = "REPORTED_USER_NOT_OFFER_OWNER"]
        #[kind = Validation]
        #[message = "Reported `User` doesn't own the `Offer`"]
        NotOfferOwner,

        #[code = "REPORT_OFFER_MISMATCH"]
        #[kind = Validation]
        #[message = "`Exchange` doesn't fulfill the provided `Offer`"]
        OfferMismatch,
    }
}

define_error! {
    enum ListError {
        #[code = "INVALID_LIMIT"]
        #[kind = Validation]
        #[message = "List limit must be a positive number"]
        InvalidLimit,
    }
}

/// Converts the GraphQL list `limit` argument into a [`usize`].
///
/// # Errors
///
/// With [`ListError::InvalidLimit`] if the `limit` is not positive.
fn list_limit(limit: Option<i32>) -> Result<Option<usize>, ListError> {
    limit
        .map(|l| {
            usize::try_from(l)
                .ok()
                .filter(|&l| l > 0)
                .ok_or(ListError::InvalidLimit)
        })
        .transpose()
}
