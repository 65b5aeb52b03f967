//! [`Command`] for taking an [`Offer`], forming a new [`Exchange`].

use common::operations::{
    By, Commit, Insert, Publish, Select, Swap, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{exchange, offer, user, Exchange, Offer},
    error::{Kind, Kinded},
    infra::{database, notification, Database},
    Service,
};

use super::Command;

/// [`Command`] for taking an open [`Offer`], forming a new pending
/// [`Exchange`] between its taker and its owner.
///
/// Both the [`Offer`] becoming taken and the [`Exchange`] creation happen
/// atomically.
#[derive(Clone, Copy, Debug)]
pub struct TakeOffer {
    /// ID of the [`Offer`] to be taken.
    pub offer_id: offer::Id,

    /// ID of the user taking the [`Offer`].
    pub requester_id: user::Id,
}

impl<Db> Command<TakeOffer> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Offer>, offer::Id>>,
            Ok = Option<Offer>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Swap<Offer, offer::Status>,
            Ok = bool,
            Err = Traced<database::Error>,
        > + Database<Insert<Exchange>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Exchange;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: TakeOffer) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let TakeOffer {
            offer_id,
            requester_id,
        } = cmd;

        let offer = self
            .database()
            .execute(Select(By::<Option<Offer>, _>::new(offer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::OfferNotExists(offer_id))
            .map_err(tracerr::wrap!())?;

        if offer.is_owned_by(requester_id) {
            return Err(tracerr::new!(E::OwnOffer(offer_id)));
        }
        if offer.status != offer::Status::Open {
            return Err(tracerr::new!(E::OfferNotOpen(offer_id)));
        }

        let taken = offer.with_status(offer::Status::Taken);
        let exchange = Exchange {
            id: exchange::Id::new(),
            offer_id,
            requester_id,
            provider_id: offer.owner_id,
            minutes: offer.duration,
            status: exchange::Status::Pending,
            cancellation: None,
            no_show: None,
            created_at: exchange::CreationDateTime::now(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let swapped = tx
            .execute(Swap {
                expected: offer::Status::Open,
                new: taken.clone(),
            })
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !swapped {
            // Someone else has taken or closed the `Offer` meanwhile.
            return Err(tracerr::new!(E::OfferNotOpen(offer_id)));
        }

        tx.execute(Insert(exchange.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        drop(tx);

        log::debug!(
            "`Offer(id: {offer_id})` taken by `User(id: {requester_id})`, \
             `Exchange(id: {})` is pending",
            exchange.id,
        );
        for event in [
            notification::Event::from(&taken),
            notification::Event::from(&exchange),
        ] {
            _ = self.notifications().execute(Publish(event)).await;
        }

        Ok(exchange)
    }
}

/// Error of [`TakeOffer`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Offer`] with the provided ID does not exist.
    #[display("`Offer(id: {_0})` does not exist")]
    OfferNotExists(#[error(not(source))] offer::Id),

    /// [`Offer`] is not open anymore.
    #[display("`Offer(id: {_0})` is not open")]
    OfferNotOpen(#[error(not(source))] offer::Id),

    /// Owner of the [`Offer`] tries to take it.
    #[display("`Offer(id: {_0})` cannot be taken by its owner")]
    OwnOffer(#[error(not(source))] offer::Id),
}

impl Kinded for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(_) => Kind::Storage,
            Self::OfferNotExists(_) => Kind::NotFound,
            Self::OfferNotOpen(_) => Kind::Conflict,
            Self::OwnOffer(_) => Kind::Auth,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Select},
        Handler as _,
    };

    use crate::{
        domain::{exchange, offer, user, Offer},
        error::{Kind, Kinded as _},
        fixture,
        query,
        read,
    };

    use super::TakeOffer;

    #[tokio::test]
    async fn forms_pending_exchange() {
        let svc = fixture::service();
        let (owner, requester) = (user::Id::new(), user::Id::new());
        let offer = fixture::offer(&svc, owner, 90).await;

        let exchange = svc
            .execute(TakeOffer {
                offer_id: offer.id,
                requester_id: requester,
            })
            .await
            .unwrap();

        assert_eq!(exchange.status, exchange::Status::Pending);
        assert_eq!(exchange.offer_id, offer.id);
        assert_eq!(exchange.requester_id, requester);
        assert_eq!(exchange.provider_id, owner);
        assert_eq!(exchange.minutes, offer.duration);
        let stored = svc
            .database()
            .execute(Select(By::<Option<Offer>, _>::new(offer.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, offer::Status::Taken);
    }

    #[tokio::test]
    async fn rejects_own_missing_and_closed_offers() {
        let svc = fixture::service();
        let owner = user::Id::new();
        let offer = fixture::offer(&svc, owner, 30).await;

        let err = svc
            .execute(TakeOffer {
                offer_id: offer.id,
                requester_id: owner,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::Auth);

        let err = svc
            .execute(TakeOffer {
                offer_id: offer::Id::new(),
                requester_id: user::Id::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::NotFound);

        _ = svc
            .execute(TakeOffer {
                offer_id: offer.id,
                requester_id: user::Id::new(),
            })
            .await
            .unwrap();
        let err = svc
            .execute(TakeOffer {
                offer_id: offer.id,
                requester_id: user::Id::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::Conflict);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_takers_never_double_take() {
        let svc = fixture::service();
        let offer = fixture::offer(&svc, user::Id::new(), 60).await;

        let takers = (0..8).map(|_| {
            let svc = svc.clone();
            tokio::spawn(async move {
                svc.execute(TakeOffer {
                    offer_id: offer.id,
                    requester_id: user::Id::new(),
                })
                .await
            })
        });
        let mut results = Vec::new();
        for taker in takers.collect::<Vec<_>>() {
            results.push(taker.await.unwrap());
        }

        let (taken, lost): (Vec<_>, Vec<_>) =
            results.into_iter().partition(Result::is_ok);
        assert_eq!(taken.len(), 1);
        assert!(lost
            .into_iter()
            .all(|r| r.unwrap_err().kind() == Kind::Conflict));

        let requester = taken[0].as_ref().unwrap().requester_id;
        let exchanges = svc
            .execute(query::exchanges::List::new(
                read::exchange::list::Filter {
                    participant_id: offer.owner_id,
                    status: None,
                },
                None,
            ))
            .await
            .unwrap();
        assert_eq!(exchanges.len(), 1);
        assert_eq!(exchanges[0].requester_id, requester);
        assert_eq!(exchanges[0].status, exchange::Status::Pending);
    }

    #[tokio::test]
    async fn failed_exchange_insertion_leaves_offer_open() {
        let svc = fixture::service();
        let offer = fixture::offer(&svc, user::Id::new(), 60).await;

        // `Offer` swap succeeds, while `Exchange` insertion fails.
        svc.database().fail_write_after(1);
        let err = svc
            .execute(TakeOffer {
                offer_id: offer.id,
                requester_id: user::Id::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::Storage);

        let stored = svc
            .database()
            .execute(Select(By::<Option<Offer>, _>::new(offer.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, offer::Status::Open);
        let exchanges = svc
            .execute(query::exchanges::List::new(
                read::exchange::list::Filter {
                    participant_id: offer.owner_id,
                    status: None,
                },
                None,
            ))
            .await
            .unwrap();
        assert!(exchanges.is_empty());
    }
}
