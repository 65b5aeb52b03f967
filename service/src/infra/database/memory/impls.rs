//! [`Database`] implementations of [`Memory`] entities.

use std::cmp::Reverse;

use common::{
    operations::{By, Insert, Select, Swap},
    Minutes,
};
use tracerr::Traced;

use crate::{
    domain::{exchange, ledger, offer, user, Exchange, Offer, Report},
    infra::{database, Database},
    read,
};

use super::{Access, Error, Memory};

/// Takes the first `limit` items of the provided ones, ordered from the
/// newest to the oldest, using `id` as a tie-breaker.
fn newest_first<T, K: Ord>(
    mut items: Vec<T>,
    key: impl Fn(&T) -> K,
    limit: usize,
) -> Vec<T> {
    items.sort_by_key(|i| Reverse(key(i)));
    items.truncate(limit);
    items
}

impl<C: Access> Database<Select<By<Option<Offer>, offer::Id>>> for Memory<C> {
    type Ok = Option<Offer>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Offer>, offer::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.read(|s| s.offers.get(&id).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access>
    Database<Select<By<Vec<Offer>, read::offer::list::Selector>>>
    for Memory<C>
{
    type Ok = Vec<Offer>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Offer>, read::offer::list::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::offer::list::Selector { filter, limit } = by.into_inner();
        self.read(|s| {
            let offers =
                s.offers.values().filter(|o| filter.matches(o)).cloned();
            newest_first(offers.collect(), |o| (o.created_at, o.id), limit)
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Insert<Offer>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(offer): Insert<Offer>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| drop(s.offers.insert(offer.id, offer)))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Swap<Offer, offer::Status>> for Memory<C> {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Swap { expected, new }: Swap<Offer, offer::Status>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| match s.offers.get_mut(&new.id) {
            Some(stored) if stored.status == expected => {
                *stored = new;
                true
            }
            Some(_) | None => false,
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Select<By<Option<Exchange>, exchange::Id>>>
    for Memory<C>
{
    type Ok = Option<Exchange>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Exchange>, exchange::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.read(|s| s.exchanges.get(&id).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access>
    Database<Select<By<Vec<Exchange>, read::exchange::list::Selector>>>
    for Memory<C>
{
    type Ok = Vec<Exchange>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Exchange>, read::exchange::list::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::exchange::list::Selector { filter, limit } = by.into_inner();
        self.read(|s| {
            let exchanges =
                s.exchanges.values().filter(|e| filter.matches(e)).cloned();
            newest_first(exchanges.collect(), |e| (e.created_at, e.id), limit)
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Insert<Exchange>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(exchange): Insert<Exchange>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| drop(s.exchanges.insert(exchange.id, exchange)))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Swap<Exchange, exchange::Status>> for Memory<C> {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Swap { expected, new }: Swap<Exchange, exchange::Status>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| match s.exchanges.get_mut(&new.id) {
            Some(stored) if stored.status == expected => {
                *stored = new;
                true
            }
            Some(_) | None => false,
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Insert<ledger::Settlement>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(settlement): Insert<ledger::Settlement>,
    ) -> Result<Self::Ok, Self::Err> {
        let ledger::Settlement { debit, credit } = settlement;
        self.write(|s| s.ledger.extend([debit, credit]))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Select<By<read::ledger::Balance, user::Id>>>
    for Memory<C>
{
    type Ok = read::ledger::Balance;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::ledger::Balance, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let user_id = by.into_inner();
        self.read(|s| {
            s.ledger
                .iter()
                .filter(|e| e.user_id == user_id)
                .try_fold(Minutes::ZERO, |sum, e| sum.checked_add(e.delta))
        })
        .await
        .map_err(tracerr::wrap!())?
        .map(read::ledger::Balance)
        .ok_or_else(|| database::Error::from(Error::BalanceOverflow(user_id)))
        .map_err(tracerr::wrap!())
    }
}

impl<C: Access>
    Database<Select<By<Vec<ledger::Entry>, read::ledger::list::Selector>>>
    for Memory<C>
{
    type Ok = Vec<ledger::Entry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<ledger::Entry>, read::ledger::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::ledger::list::Selector {
            filter: read::ledger::list::Filter { user_id },
            limit,
        } = by.into_inner();
        self.read(|s| {
            let entries =
                s.ledger.iter().filter(|e| e.user_id == user_id).cloned();
            newest_first(entries.collect(), |e| (e.created_at, e.id), limit)
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Select<By<Vec<ledger::Entry>, exchange::Id>>>
    for Memory<C>
{
    type Ok = Vec<ledger::Entry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<ledger::Entry>, exchange::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let exchange_id = by.into_inner();
        self.read(|s| {
            s.ledger
                .iter()
                .filter(|e| e.exchange_id == exchange_id)
                .cloned()
                .collect()
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C: Access>
    Database<Select<By<Vec<Report>, read::report::list::Selector>>>
    for Memory<C>
{
    type Ok = Vec<Report>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Report>, read::report::list::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::report::list::Selector { filter, limit } = by.into_inner();
        self.read(|s| {
            let reports =
                s.reports.iter().filter(|r| filter.matches(r)).cloned();
            newest_first(reports.collect(), |r| (r.created_at, r.id), limit)
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Insert<Report>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(report): Insert<Report>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| s.reports.push(report))
            .await
            .map_err(tracerr::wrap!())
    }
}
