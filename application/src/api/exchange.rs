//! [`Exchange`]-related definitions.

use common::DateTime;
use derive_more::{Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::{domain, query, Query as _};
use uuid::Uuid;

use crate::{api, AsError, Context, Error};

/// An exchange between a requester and a provider.
#[derive(Clone, Debug, From)]
pub struct Exchange(domain::Exchange);

/// An agreement between a requester and a provider to fulfill an `Offer`.
#[graphql_object(context = Context)]
impl Exchange {
    /// Unique identifier of this `Exchange`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// `Offer` this `Exchange` fulfills.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `OFFER_NOT_EXISTS` - the `Offer` doesn't exist anymore.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Exchange.offer",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn offer(&self, ctx: &Context) -> Result<api::Offer, Error> {
        ctx.service()
            .execute(query::offer::ById::by(self.0.offer_id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::OfferError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// `User` who took the `Offer`.
    #[must_use]
    pub fn requester_id(&self) -> api::user::Id {
        self.0.requester_id.into()
    }

    /// `User` who owned the `Offer` when it was taken.
    #[must_use]
    pub fn provider_id(&self) -> api::user::Id {
        self.0.provider_id.into()
    }

    /// Time value of this `Exchange` in minutes.
    #[must_use]
    pub fn minutes(&self) -> i32 {
        self.0.minutes.minutes().saturating_i32()
    }

    /// Current status of this `Exchange`.
    #[must_use]
    pub fn status(&self) -> Status {
        self.0.status.into()
    }

    /// `User` who cancelled this `Exchange`, if it was cancelled.
    #[must_use]
    pub fn cancelled_by(&self) -> Option<api::user::Id> {
        self.0.cancellation.as_ref().map(|c| c.by.into())
    }

    /// Reason of cancelling this `Exchange`, if any was provided.
    #[must_use]
    pub fn cancellation_reason(&self) -> Option<&str> {
        self.0
            .cancellation
            .as_ref()
            .and_then(|c| c.reason.as_ref())
            .map(AsRef::as_ref)
    }

    /// `User` who reported a no-show, if any.
    #[must_use]
    pub fn no_show_by(&self) -> Option<api::user::Id> {
        self.0.no_show.map(|n| n.by.into())
    }

    /// `User` who didn't show up, if any.
    #[must_use]
    pub fn no_show_against(&self) -> Option<api::user::Id> {
        self.0.no_show.map(|n| n.against.into())
    }

    /// `DateTime` when this `Exchange` was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of an `Exchange`.
#[derive(Clone, Copy, Debug, Display, From, GraphQLScalar, Into)]
#[from(domain::exchange::Id)]
#[into(domain::exchange::Id)]
#[graphql(name = "ExchangeId", transparent)]
pub struct Id(Uuid);

/// Status of an `Exchange`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "ExchangeStatus")]
pub enum Status {
    /// `Exchange` awaits the provider's acceptance.
    Pending,

    /// `Exchange` has been accepted by the provider.
    Accepted,

    /// `Exchange` has been fulfilled and settled.
    Completed,

    /// `Exchange` has been cancelled by one of its participants.
    Cancelled,

    /// One of the `Exchange` participants didn't show up.
    NoShow,
}

impl From<domain::exchange::Status> for Status {
    fn from(status: domain::exchange::Status) -> Self {
        use domain::exchange::Status as S;

        match status {
            S::Pending => Self::Pending,
            S::Accepted => Self::Accepted,
            S::Completed => Self::Completed,
            S::Cancelled => Self::Cancelled,
            S::NoShow => Self::NoShow,
        }
    }
}

impl From<Status> for domain::exchange::Status {
    fn from(status: Status) -> Self {
        match status {
            Status::Pending => Self::Pending,
            Status::Accepted => Self::Accepted,
            Status::Completed => Self::Completed,
            Status::Cancelled => Self::Cancelled,
            Status::NoShow => Self::NoShow,
        }
    }
}
