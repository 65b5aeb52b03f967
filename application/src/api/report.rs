//! [`Report`]-related definitions.

use common::DateTime;
use derive_more::{Display, From, Into};
use juniper::{graphql_object, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{api, Context};

/// A complaint about another `User`.
#[derive(Clone, Debug, From)]
pub struct Report(domain::Report);

/// A complaint of a `User` about another `User`'s conduct.
#[graphql_object(context = Context)]
impl Report {
    /// Unique identifier of this `Report`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// `User` who filed this `Report`.
    #[must_use]
    pub fn reporter_id(&self) -> api::user::Id {
        self.0.reporter_id.into()
    }

    /// Reported `User`.
    #[must_use]
    pub fn target_user_id(&self) -> api::user::Id {
        self.0.target_user_id.into()
    }

    /// `Offer` this `Report` concerns, if any.
    #[must_use]
    pub fn offer_id(&self) -> Option<api::offer::Id> {
        self.0.offer_id.map(Into::into)
    }

    /// `Exchange` this `Report` concerns, if any.
    #[must_use]
    pub fn exchange_id(&self) -> Option<api::exchange::Id> {
        self.0.exchange_id.map(Into::into)
    }

    /// Reason of this `Report`.
    #[must_use]
    pub fn reason(&self) -> &str {
        self.0.reason.as_ref()
    }

    /// Additional note of the reporter, if any.
    #[must_use]
    pub fn note(&self) -> Option<&str> {
        self.0.note.as_ref().map(AsRef::as_ref)
    }

    /// `DateTime` when this `Report` was filed.
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of a `Report`.
#[derive(Clone, Copy, Debug, Display, From, GraphQLScalar, Into)]
#[from(domain::report::Id)]
#[into(domain::report::Id)]
#[graphql(name = "ReportId", transparent)]
pub struct Id(Uuid);
