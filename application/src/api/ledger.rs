//! Ledger-related definitions.

use common::{DateTime, Minutes};
use derive_more::{Display, From, Into};
use juniper::{graphql_object, GraphQLScalar};
use service::{domain, read};
use uuid::Uuid;

use crate::{api, Context};

/// An entry of the ledger.
#[derive(Clone, Debug, From)]
pub struct Entry(domain::ledger::Entry);

/// An immutable signed record of minutes credited to or debited from a
/// `User`.
#[graphql_object(name = "LedgerEntry", context = Context)]
impl Entry {
    /// Unique identifier of this `LedgerEntry`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// `User` whose balance this `LedgerEntry` affects.
    #[must_use]
    pub fn user_id(&self) -> api::user::Id {
        self.0.user_id.into()
    }

    /// Signed amount of minutes: negative for a debit, positive for a credit.
    #[must_use]
    pub fn delta_minutes(&self) -> i32 {
        self.0.delta.saturating_i32()
    }

    /// Signed amount in hours with two decimal places, like `-1.50`.
    #[must_use]
    pub fn delta_hours(&self) -> String {
        self.0.delta.to_hours_string()
    }

    /// Human-readable reason of this `LedgerEntry`.
    #[must_use]
    pub fn reason(&self) -> &str {
        self.0.reason.as_ref()
    }

    /// Settled `Exchange` this `LedgerEntry` originates from.
    #[must_use]
    pub fn exchange_id(&self) -> api::exchange::Id {
        self.0.exchange_id.into()
    }

    /// `DateTime` when this `LedgerEntry` was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of a `LedgerEntry`.
#[derive(Clone, Copy, Debug, Display, From, GraphQLScalar, Into)]
#[from(domain::ledger::Id)]
#[into(domain::ledger::Id)]
#[graphql(name = "LedgerEntryId", transparent)]
pub struct Id(Uuid);

/// A balance of a user.
#[derive(Clone, Copy, Debug, From)]
pub struct Balance(Minutes);

impl From<read::ledger::Balance> for Balance {
    fn from(balance: read::ledger::Balance) -> Self {
        Self(*balance)
    }
}

/// Balance of a `User`, derived from all its `LedgerEntry`s.
///
/// May be negative.
#[graphql_object(context = Context)]
impl Balance {
    /// Balance in minutes.
    ///
    /// `Float`, as balances may outgrow `Int`. Always a whole number.
    #[must_use]
    pub fn minutes(&self) -> f64 {
        self.0.as_f64()
    }

    /// Balance in hours with two decimal places, like `+1.50`.
    #[must_use]
    pub fn hours(&self) -> String {
        self.0.to_hours_string()
    }
}
