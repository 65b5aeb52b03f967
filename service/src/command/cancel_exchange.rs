//! [`Command`] for cancelling an [`Exchange`].

use common::operations::{
    By, Commit, Publish, Select, Swap, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{exchange, user, Exchange},
    error::{Kind, Kinded},
    infra::{database, notification, Database},
    Service,
};

use super::Command;

/// [`Command`] for cancelling a pending or accepted [`Exchange`] by any of
/// its participants.
///
/// Cancellation has no effect on the ledger.
#[derive(Clone, Debug)]
pub struct CancelExchange {
    /// ID of the [`Exchange`] to be cancelled.
    pub exchange_id: exchange::Id,

    /// ID of the user who cancels the [`Exchange`].
    pub initiator_id: user::Id,

    /// Free-form reason of the cancellation, if any.
    pub reason: Option<String>,
}

impl<Db> Command<CancelExchange> for Service<Db>
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
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Exchange;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CancelExchange,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CancelExchange {
            exchange_id,
            initiator_id,
            reason,
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
        if !exchange.status.can_become(exchange::Status::Cancelled) {
            return Err(tracerr::new!(E::NotCancellable(exchange.status)));
        }

        let cancelled = Exchange {
            status: exchange::Status::Cancelled,
            cancellation: Some(exchange::Cancellation {
                by: initiator_id,
                reason: reason.and_then(exchange::CancellationReason::new),
            }),
            ..exchange.clone()
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let swapped = tx
            .execute(Swap {
                expected: exchange.status,
                new: cancelled.clone(),
            })
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !swapped {
            return Err(tracerr::new!(E::Diverged(exchange_id)));
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        drop(tx);

        log::debug!(
            "`Exchange(id: {exchange_id})` cancelled by `User(id: \
             {initiator_id})`",
        );
        _ = self
            .notifications()
            .execute(Publish(notification::Event::from(&cancelled)))
            .await;

        Ok(cancelled)
    }
}

/// Error of [`CancelExchange`] [`Command`] execution.
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

    /// [`Exchange`] is neither pending nor accepted.
    #[display("`Exchange` cannot be cancelled while being `{_0}`")]
    NotCancellable(#[error(not(source))] exchange::Status),

    /// User doesn't participate in the [`Exchange`].
    #[display("`User(id: {_0})` doesn't participate in the `Exchange`")]
    NotParticipant(#[error(not(source))] user::Id),
}

impl Kinded for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(_) => Kind::Storage,
            Self::Diverged(_) | Self::NotCancellable(_) => Kind::Conflict,
            Self::ExchangeNotExists(_) => Kind::NotFound,
            Self::NotParticipant(_) => Kind::Auth,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::{Handler as _, Minutes};

    use crate::{
        command::CompleteExchange,
        domain::{exchange, user},
        error::{Kind, Kinded as _},
        fixture::{self, Parties},
        query,
    };

    use super::CancelExchange;

    #[tokio::test]
    async fn participants_cancel_without_ledger_effect() {
        let svc = fixture::service();
        let parties = Parties::new();
        let pending = fixture::pending(&svc, parties, 30).await;
        let accepted = fixture::accepted(&svc, parties, 60).await;

        for (exchange, initiator_id) in [
            (&pending, parties.requester),
            (&accepted, parties.provider),
        ] {
            let cancelled = svc
                .execute(CancelExchange {
                    exchange_id: exchange.id,
                    initiator_id,
                    reason: Some(" plans changed ".into()),
                })
                .await
                .unwrap();

            assert_eq!(cancelled.status, exchange::Status::Cancelled);
            let cancellation = cancelled.cancellation.unwrap();
            assert_eq!(cancellation.by, initiator_id);
            assert_eq!(cancellation.reason.unwrap().to_string(), "plans changed");
            assert!(svc
                .execute(query::ledger::BySettlement::by(exchange.id))
                .await
                .unwrap()
                .is_empty());
        }

        for user_id in [parties.requester, parties.provider] {
            let balance =
                svc.execute(query::ledger::Balance::by(user_id)).await;
            assert_eq!(*balance.unwrap(), Minutes::ZERO);
        }
    }

    #[tokio::test]
    async fn rejects_non_participants() {
        let svc = fixture::service();
        let exchange = fixture::pending(&svc, Parties::new(), 30).await;

        let err = svc
            .execute(CancelExchange {
                exchange_id: exchange.id,
                initiator_id: user::Id::new(),
                reason: None,
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::Auth);
    }

    #[tokio::test]
    async fn terminal_exchange_stays_terminal() {
        let svc = fixture::service();
        let parties = Parties::new();
        let exchange = fixture::accepted(&svc, parties, 30).await;
        _ = svc
            .execute(CompleteExchange {
                exchange_id: exchange.id,
                initiator_id: parties.requester,
            })
            .await
            .unwrap();

        let err = svc
            .execute(CancelExchange {
                exchange_id: exchange.id,
                initiator_id: parties.requester,
                reason: None,
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::Conflict);
        let stored = svc
            .execute(query::exchange::ById::by(exchange.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, exchange::Status::Completed);
    }
}
