//! [`Offer`]-related definitions.

use common::DateTime;
use derive_more::{Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{api, Context};

/// An offer of time-based service.
#[derive(Clone, Debug, From)]
pub struct Offer(domain::Offer);

/// An offer of time-based service a `User` is willing to provide.
#[graphql_object(context = Context)]
impl Offer {
    /// Unique identifier of this `Offer`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// `User` who published this `Offer`.
    #[must_use]
    pub fn owner_id(&self) -> api::user::Id {
        self.0.owner_id.into()
    }

    /// Title of this `Offer`.
    #[must_use]
    pub fn title(&self) -> &str {
        self.0.title.as_ref()
    }

    /// Description of this `Offer`, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.0.description.as_ref().map(AsRef::as_ref)
    }

    /// Category of this `Offer`, if any.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.0.category.as_ref().map(AsRef::as_ref)
    }

    /// Hint about where this `Offer` takes place, if any.
    #[must_use]
    pub fn location_hint(&self) -> Option<&str> {
        self.0.location_hint.as_ref().map(AsRef::as_ref)
    }

    /// Time value of this `Offer` in minutes.
    #[must_use]
    pub fn minutes(&self) -> i32 {
        self.0.duration.minutes().saturating_i32()
    }

    /// Current status of this `Offer`.
    #[must_use]
    pub fn status(&self) -> Status {
        self.0.status.into()
    }

    /// `DateTime` when this `Offer` was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of an `Offer`.
#[derive(Clone, Copy, Debug, Display, From, GraphQLScalar, Into)]
#[from(domain::offer::Id)]
#[into(domain::offer::Id)]
#[graphql(name = "OfferId", transparent)]
pub struct Id(Uuid);

/// Status of an `Offer`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "OfferStatus")]
pub enum Status {
    /// `Offer` can be taken.
    Open,

    /// `Offer` has been taken by someone.
    Taken,

    /// `Offer` has been closed after being fulfilled.
    Closed,

    /// `Offer` has been withdrawn by its owner.
    Cancelled,
}

impl From<domain::offer::Status> for Status {
    fn from(status: domain::offer::Status) -> Self {
        use domain::offer::Status as S;

        match status {
            S::Open => Self::Open,
            S::Taken => Self::Taken,
            S::Closed => Self::Closed,
            S::Cancelled => Self::Cancelled,
        }
    }
}

impl From<Status> for domain::offer::Status {
    fn from(status: Status) -> Self {
        match status {
            Status::Open => Self::Open,
            Status::Taken => Self::Taken,
            Status::Closed => Self::Closed,
            Status::Cancelled => Self::Cancelled,
        }
    }
}
