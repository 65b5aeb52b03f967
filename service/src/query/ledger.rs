//! [`Query`] collection related to the ledger.

use common::operations::By;

use crate::{
    domain::{exchange, ledger, user},
    read,
};
#[cfg(doc)]
use crate::{domain::Exchange, Query};

use super::{DatabaseQuery, ListQuery};

/// Queries the [`read::ledger::Balance`] of a user.
pub type Balance = DatabaseQuery<By<read::ledger::Balance, user::Id>>;

/// Queries a list of [`ledger::Entry`]s of a user, from the newest to the
/// oldest.
pub type List = ListQuery<ledger::Entry, read::ledger::list::Filter>;

/// Queries the [`ledger::Entry`]s posted by settling an [`Exchange`].
pub type BySettlement = DatabaseQuery<By<Vec<ledger::Entry>, exchange::Id>>;

#[cfg(test)]
mod spec {
    use common::{
        operations::Insert,
        Handler as _, Minutes,
    };

    use crate::{
        command::CompleteExchange,
        domain::{exchange, ledger, offer, user},
        fixture::{self, Parties},
        read::ledger::list::Filter,
    };

    use super::{Balance, List};

    #[tokio::test]
    async fn balance_of_newcomer_is_zero() {
        let svc = fixture::service();

        let balance = svc.execute(Balance::by(user::Id::new())).await.unwrap();

        assert_eq!(*balance, Minutes::ZERO);
    }

    #[tokio::test]
    async fn balance_is_sum_of_ledger() {
        let svc = fixture::service();
        let (alice, bob, carol) =
            (user::Id::new(), user::Id::new(), user::Id::new());
        for (requester, provider, minutes) in
            [(alice, bob, 60), (bob, alice, 15), (carol, alice, 45)]
        {
            let exchange =
                fixture::accepted(&svc, Parties { requester, provider }, minutes)
                    .await;
            _ = svc
                .execute(CompleteExchange {
                    exchange_id: exchange.id,
                    initiator_id: requester,
                })
                .await
                .unwrap();
        }

        for (user, expected) in [(alice, 0), (bob, 45), (carol, -45)] {
            let balance = svc.execute(Balance::by(user)).await.unwrap();
            let ledger = svc
                .execute(List::new(Filter { user_id: user }, Some(200)))
                .await
                .unwrap();

            assert_eq!(*balance, Minutes::new(expected), "balance of {user}");
            assert_eq!(
                ledger.iter().map(|e| e.delta).sum::<Minutes>(),
                *balance,
            );
        }
    }

    #[tokio::test]
    async fn lists_ledger_newest_first() {
        let svc = fixture::service();
        let parties = Parties::new();
        for minutes in [10, 20, 30] {
            let exchange = fixture::accepted(&svc, parties, minutes).await;
            _ = svc
                .execute(CompleteExchange {
                    exchange_id: exchange.id,
                    initiator_id: parties.provider,
                })
                .await
                .unwrap();
        }
        let list = || {
            svc.execute(List::new(
                Filter {
                    user_id: parties.provider,
                },
                Some(2),
            ))
        };

        let first = list().await.unwrap();
        let second = list().await.unwrap();

        let deltas = first.iter().map(|e| e.delta).collect::<Vec<_>>();
        assert_eq!(deltas, [Minutes::new(30), Minutes::new(20)]);
        assert_eq!(
            first.iter().map(|e| e.id).collect::<Vec<_>>(),
            second.iter().map(|e| e.id).collect::<Vec<_>>(),
        );
    }

    /// Builds a [`ledger::Settlement`] moving the provided raw amount,
    /// bypassing [`offer::Duration`] bounds.
    fn raw_settlement(parties: Parties, amount: i64) -> ledger::Settlement {
        let exchange_id = exchange::Id::new();
        let entry = |user_id, delta| ledger::Entry {
            id: ledger::Id::new(),
            user_id,
            delta: Minutes::new(delta),
            reason: ledger::Reason::settlement(exchange_id),
            exchange_id,
            created_at: ledger::CreationDateTime::now(),
        };
        ledger::Settlement {
            debit: entry(parties.requester, -amount),
            credit: entry(parties.provider, amount),
        }
    }

    #[tokio::test]
    async fn balance_of_largest_settlements() {
        let svc = fixture::service();
        let parties = Parties::new();
        for _ in 0..2 {
            let exchange = fixture::accepted(
                &svc,
                parties,
                offer::Duration::MAX.get(),
            )
            .await;
            _ = svc
                .execute(CompleteExchange {
                    exchange_id: exchange.id,
                    initiator_id: parties.requester,
                })
                .await
                .unwrap();
        }

        let balance =
            svc.execute(Balance::by(parties.provider)).await.unwrap();

        assert_eq!(balance.get(), 2 * offer::Duration::MAX.get());
    }

    #[tokio::test]
    async fn balance_exceeds_i32_range() {
        let svc = fixture::service();
        let parties = Parties::new();
        for _ in 0..2 {
            svc.database()
                .execute(Insert(raw_settlement(parties, i32::MAX.into())))
                .await
                .unwrap();
        }

        let credited =
            svc.execute(Balance::by(parties.provider)).await.unwrap();
        let debited =
            svc.execute(Balance::by(parties.requester)).await.unwrap();

        assert_eq!(credited.get(), 2 * i64::from(i32::MAX));
        assert_eq!(debited.get(), -2 * i64::from(i32::MAX));
    }

    #[tokio::test]
    async fn overflowing_balance_is_an_error() {
        let svc = fixture::service();
        let parties = Parties::new();
        for _ in 0..2 {
            svc.database()
                .execute(Insert(raw_settlement(parties, i64::MAX)))
                .await
                .unwrap();
        }

        assert!(svc.execute(Balance::by(parties.provider)).await.is_err());
    }
}
