//! [`Command`] for completing an [`Exchange`] and settling it.

use common::operations::{
    By, Commit, Insert, Publish, Select, Swap, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{exchange, ledger, user, Exchange},
    error::{Kind, Kinded},
    infra::{database, notification, Database},
    Service,
};

use super::Command;

/// [`Command`] for completing an accepted [`Exchange`] by any of its
/// participants.
///
/// Completion settles the [`Exchange`]: its minutes are debited from the
/// requester and credited to the provider within the same transaction, so
/// either both the transition and the [`ledger::Settlement`] are stored, or
/// none of them.
#[derive(Clone, Copy, Debug)]
pub struct CompleteExchange {
    /// ID of the [`Exchange`] to be completed.
    pub exchange_id: exchange::Id,

    /// ID of the user who completes the [`Exchange`].
    pub initiator_id: user::Id,
}

impl<Db> Command<CompleteExchange> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Exchange>, exchange::Id>>,
            Ok = Option<Exchange>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Swap<Exchange, exchange::Status>,
            Ok = bool,
            Err = Traced<database::Error>,
        > + Database<Insert<ledger::Settlement>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Exchange;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CompleteExchange,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CompleteExchange {
            exchange_id,
            initiator_id,
        } = cmd;

        let exchange = self
            .database()
            .execute(Select(By::<Option<Exchange>, _>::new(exchange_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ExchangeNotExists(exchange_id))
            .map_err(tracerr::wrap!())?;

        if !exchange.is_participant(initiator_id) {
            return Err(tracerr::new!(E::NotParticipant(initiator_id)));
        }
        if !exchange.status.can_become(exchange::Status::Completed) {
            return Err(tracerr::new!(E::NotAccepted(exchange.status)));
        }

        let completed = Exchange {
            status: exchange::Status::Completed,
            ..exchange.clone()
        };
        let settlement = ledger::Settlement::of(&completed);

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let swapped = tx
            .execute(Swap {
                expected: exchange.status,
                new: completed.clone(),
            })
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !swapped {
            return Err(tracerr::new!(E::Diverged(exchange_id)));
        }

        tx.execute(Insert(settlement))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        drop(tx);

        log::info!(
            "`Exchange(id: {exchange_id})` settled: {} moved from \
             `User(id: {})` to `User(id: {})`",
            completed.minutes,
            completed.requester_id,
            completed.provider_id,
        );
        _ = self
            .notifications()
            .execute(Publish(notification::Event::from(&completed)))
            .await;

        Ok(completed)
    }
}

/// Error of [`CompleteExchange`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Exchange`] has been modified concurrently.
    #[display("`Exchange(id: {_0})` has been modified concurrently")]
    Diverged(#[error(not(source))] exchange::Id),

    /// [`Exchange`] with the provided ID does not exist.
    #[display("`Exchange(id: {_0})` does not exist")]
    ExchangeNotExists(#[error(not(source))] exchange::Id),

    /// [`Exchange`] is not accepted.
    #[display("`Exchange` cannot be completed while being `{_0}`")]
    NotAccepted(#[error(not(source))] exchange::Status),

    /// User doesn't participate in the [`Exchange`].
    #[display("`User(id: {_0})` doesn't participate in the `Exchange`")]
    NotParticipant(#[error(not(source))] user::Id),
}

impl Kinded for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(_) => Kind::Storage,
            Self::Diverged(_) | Self::NotAccepted(_) => Kind::Conflict,
            Self::ExchangeNotExists(_) => Kind::NotFound,
            Self::NotParticipant(_) => Kind::Auth,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::{Handler as _, Minutes};

    use crate::{
        command::{AcceptExchange, CreateOffer, TakeOffer},
        domain::{exchange, offer, user},
        error::{Kind, Kinded as _},
        fixture::{self, Parties},
        query,
    };

    use super::CompleteExchange;

    async fn balance(
        svc: &crate::Service<crate::infra::Memory>,
        user_id: user::Id,
    ) -> Minutes {
        *svc.execute(query::ledger::Balance::by(user_id)).await.unwrap()
    }

    #[tokio::test]
    async fn offer_to_settlement() {
        let svc = fixture::service();
        let (a, b) = (user::Id::new(), user::Id::new());
        assert_eq!(balance(&svc, a).await, Minutes::ZERO);

        let offer = svc
            .execute(CreateOffer {
                owner_id: Some(a),
                title: "Dog walking".into(),
                minutes: Minutes::new(60),
                description: None,
                category: None,
                location_hint: None,
            })
            .await
            .unwrap();
        let exchange = svc
            .execute(TakeOffer {
                offer_id: offer.id,
                requester_id: b,
            })
            .await
            .unwrap();
        assert_eq!(exchange.status, exchange::Status::Pending);
        let taken = svc
            .execute(query::offer::ById::by(offer.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(taken.status, offer::Status::Taken);

        let exchange = svc
            .execute(AcceptExchange {
                exchange_id: exchange.id,
                initiator_id: a,
            })
            .await
            .unwrap();
        assert_eq!(exchange.status, exchange::Status::Accepted);

        let exchange = svc
            .execute(CompleteExchange {
                exchange_id: exchange.id,
                initiator_id: b,
            })
            .await
            .unwrap();
        assert_eq!(exchange.status, exchange::Status::Completed);

        assert_eq!(balance(&svc, b).await, Minutes::new(-60));
        assert_eq!(balance(&svc, a).await, Minutes::new(60));
    }

    #[tokio::test]
    async fn posts_exactly_one_balanced_settlement() {
        let svc = fixture::service();
        let parties = Parties::new();
        let exchange = fixture::accepted(&svc, parties, 45).await;

        _ = svc
            .execute(CompleteExchange {
                exchange_id: exchange.id,
                initiator_id: parties.provider,
            })
            .await
            .unwrap();
        let err = svc
            .execute(CompleteExchange {
                exchange_id: exchange.id,
                initiator_id: parties.requester,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::Conflict);

        let entries = svc
            .execute(query::ledger::BySettlement::by(exchange.id))
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries.iter().map(|e| e.delta).sum::<Minutes>(),
            Minutes::ZERO,
        );
        let debit = entries.iter().find(|e| e.delta < Minutes::ZERO).unwrap();
        assert_eq!(debit.user_id, parties.requester);
        assert_eq!(debit.delta, Minutes::new(-45));
    }

    #[tokio::test]
    async fn rejects_non_participants_and_unaccepted() {
        let svc = fixture::service();
        let parties = Parties::new();
        let exchange = fixture::pending(&svc, parties, 30).await;

        let err = svc
            .execute(CompleteExchange {
                exchange_id: exchange.id,
                initiator_id: parties.requester,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::Conflict);

        _ = svc
            .execute(AcceptExchange {
                exchange_id: exchange.id,
                initiator_id: parties.provider,
            })
            .await
            .unwrap();
        let err = svc
            .execute(CompleteExchange {
                exchange_id: exchange.id,
                initiator_id: user::Id::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::Auth);
        assert!(svc
            .execute(query::ledger::BySettlement::by(exchange.id))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn failed_settlement_rolls_back_completion() {
        let svc = fixture::service();
        let parties = Parties::new();
        let exchange = fixture::accepted(&svc, parties, 60).await;

        // Status swap succeeds, while `ledger::Settlement` insertion fails.
        svc.database().fail_write_after(1);
        let err = svc
            .execute(CompleteExchange {
                exchange_id: exchange.id,
                initiator_id: parties.requester,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::Storage);

        let stored = svc
            .execute(query::exchange::ById::by(exchange.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, exchange::Status::Accepted);
        assert!(svc
            .execute(query::ledger::BySettlement::by(exchange.id))
            .await
            .unwrap()
            .is_empty());

        // Rolled back completion may be retried as a whole.
        _ = svc
            .execute(CompleteExchange {
                exchange_id: exchange.id,
                initiator_id: parties.requester,
            })
            .await
            .unwrap();
        assert_eq!(balance(&svc, parties.provider).await, Minutes::new(60));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_completions_settle_once() {
        let svc = fixture::service();
        let parties = Parties::new();
        let exchange = fixture::accepted(&svc, parties, 30).await;

        let completions = [parties.requester, parties.provider]
            .into_iter()
            .map(|initiator_id| {
                let svc = svc.clone();
                tokio::spawn(async move {
                    svc.execute(CompleteExchange {
                        exchange_id: exchange.id,
                        initiator_id,
                    })
                    .await
                })
            })
            .collect::<Vec<_>>();
        let mut succeeded = 0;
        for completion in completions {
            if completion.await.unwrap().is_ok() {
                succeeded += 1;
            }
        }

        assert_eq!(succeeded, 1);
        assert_eq!(balance(&svc, parties.requester).await, Minutes::new(-30));
    }
}
