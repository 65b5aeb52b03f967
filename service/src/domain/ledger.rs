//! Ledger definitions.
//!
//! The ledger is append-only: [`Entry`]s are never updated nor deleted, and
//! balances are always derived from them.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf, Minutes};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{exchange, user, Exchange};

/// Immutable signed record of [`Minutes`] credited to or debited from a user.
#[derive(Clone, Debug)]
pub struct Entry {
    /// ID of this [`Entry`].
    pub id: Id,

    /// ID of the user whose balance this [`Entry`] affects.
    pub user_id: user::Id,

    /// Signed amount of this [`Entry`]: negative for a debit, positive for a
    /// credit.
    pub delta: Minutes,

    /// [`Reason`] of this [`Entry`].
    pub reason: Reason,

    /// ID of the settled [`Exchange`] this [`Entry`] originates from.
    pub exchange_id: exchange::Id,

    /// [`DateTime`] when this [`Entry`] was created.
    pub created_at: CreationDateTime,
}

/// ID of an [`Entry`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Human-readable reason of an [`Entry`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Reason(String);

impl Reason {
    /// Creates a [`Reason`] referencing the settlement of the provided
    /// [`Exchange`].
    #[must_use]
    pub fn settlement(exchange_id: exchange::Id) -> Self {
        Self(format!("Settlement of exchange {exchange_id}"))
    }
}

/// Matching pair of [`Entry`]s posted when an [`Exchange`] is completed.
#[derive(Clone, Debug)]
pub struct Settlement {
    /// [`Entry`] debiting the requester.
    pub debit: Entry,

    /// [`Entry`] crediting the provider.
    pub credit: Entry,
}

impl Settlement {
    /// Builds the [`Settlement`] of the provided [`Exchange`]: its minutes
    /// are debited from the requester and credited to the provider.
    ///
    /// Only completing an [`Exchange`] may post a [`Settlement`].
    #[must_use]
    pub(crate) fn of(exchange: &Exchange) -> Self {
        let minutes = exchange.minutes.minutes();
        let created_at = CreationDateTime::now();
        let entry = |user_id, delta| Entry {
            id: Id::new(),
            user_id,
            delta,
            reason: Reason::settlement(exchange.id),
            exchange_id: exchange.id,
            created_at,
        };
        Self {
            debit: entry(exchange.requester_id, -minutes),
            credit: entry(exchange.provider_id, minutes),
        }
    }

    /// Returns both [`Entry`]s of this [`Settlement`]: the debit first, then
    /// the credit.
    #[must_use]
    pub fn entries(&self) -> [&Entry; 2] {
        [&self.debit, &self.credit]
    }
}

/// [`DateTime`] when an [`Entry`] was created.
pub type CreationDateTime = DateTimeOf<(Entry, unit::Creation)>;

#[cfg(test)]
mod spec {
    use common::Minutes;

    use crate::domain::{exchange, offer, user, Exchange};

    use super::Settlement;

    #[test]
    fn settlement_moves_minutes_from_requester_to_provider() {
        let exchange = Exchange {
            id: exchange::Id::new(),
            offer_id: offer::Id::new(),
            requester_id: user::Id::new(),
            provider_id: user::Id::new(),
            minutes: offer::Duration::new(Minutes::new(45)).unwrap(),
            status: exchange::Status::Accepted,
            cancellation: None,
            no_show: None,
            created_at: exchange::CreationDateTime::now(),
        };

        let Settlement { debit, credit } = Settlement::of(&exchange);

        assert_eq!(debit.user_id, exchange.requester_id);
        assert_eq!(debit.delta, Minutes::new(-45));
        assert_eq!(credit.user_id, exchange.provider_id);
        assert_eq!(credit.delta, Minutes::new(45));
        assert_eq!(debit.delta + credit.delta, Minutes::ZERO);
        assert_ne!(debit.id, credit.id);
        for entry in [&debit, &credit] {
            assert_eq!(entry.exchange_id, exchange.id);
            assert!(entry.reason.to_string().contains(&exchange.id.to_string()));
        }
    }
}
