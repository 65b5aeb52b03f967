//! [`Command`] for accepting an [`Exchange`].

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

/// [`Command`] for accepting a pending [`Exchange`] by its provider.
#[derive(Clone, Copy, Debug)]
pub struct AcceptExchange {
    /// ID of the [`Exchange`] to be accepted.
    pub exchange_id: exchange::Id,

    /// ID of the user who accepts the [`Exchange`].
    pub initiator_id: user::Id,
}

impl<Db> Command<AcceptExchange> for Service<Db>
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
        cmd: AcceptExchange,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AcceptExchange {
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

        if exchange.provider_id != initiator_id {
            return Err(tracerr::new!(E::NotProvider(initiator_id)));
        }
        if !exchange.status.can_become(exchange::Status::Accepted) {
            return Err(tracerr::new!(E::NotPending(exchange.status)));
        }

        let accepted = Exchange {
            status: exchange::Status::Accepted,
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
                new: accepted.clone(),
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

        log::debug!("`Exchange(id: {exchange_id})` accepted");
        _ = self
            .notifications()
            .execute(Publish(notification::Event::from(&accepted)))
            .await;

        Ok(accepted)
    }
}

/// Error of [`AcceptExchange`] [`Command`] execution.
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

    /// User is not the provider of the [`Exchange`].
    #[display("`User(id: {_0})` is not the provider of the `Exchange`")]
    NotProvider(#[error(not(source))] user::Id),

    /// [`Exchange`] is not pending.
    #[display("`Exchange` cannot be accepted while being `{_0}`")]
    NotPending(#[error(not(source))] exchange::Status),
}

impl Kinded for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(_) => Kind::Storage,
            Self::Diverged(_) | Self::NotPending(_) => Kind::Conflict,
            Self::ExchangeNotExists(_) => Kind::NotFound,
            Self::NotProvider(_) => Kind::Auth,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::Handler as _;

    use crate::{
        domain::{exchange, user},
        error::{Kind, Kinded as _},
        fixture::{self, Parties},
    };

    use super::AcceptExchange;

    #[tokio::test]
    async fn provider_accepts_pending_exchange() {
        let svc = fixture::service();
        let parties = Parties::new();
        let exchange = fixture::pending(&svc, parties, 60).await;

        let accepted = svc
            .execute(AcceptExchange {
                exchange_id: exchange.id,
                initiator_id: parties.provider,
            })
            .await
            .unwrap();

        assert_eq!(accepted.id, exchange.id);
        assert_eq!(accepted.status, exchange::Status::Accepted);
    }

    #[tokio::test]
    async fn only_provider_accepts() {
        let svc = fixture::service();
        let parties = Parties::new();
        let exchange = fixture::pending(&svc, parties, 60).await;

        for initiator_id in [parties.requester, user::Id::new()] {
            let err = svc
                .execute(AcceptExchange {
                    exchange_id: exchange.id,
                    initiator_id,
                })
                .await
                .unwrap_err();
            assert_eq!(err.kind(), Kind::Auth);
        }
    }

    #[tokio::test]
    async fn accepts_only_pending_exchange() {
        let svc = fixture::service();
        let parties = Parties::new();
        let exchange = fixture::accepted(&svc, parties, 60).await;

        let err = svc
            .execute(AcceptExchange {
                exchange_id: exchange.id,
                initiator_id: parties.provider,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::Conflict);

        let err = svc
            .execute(AcceptExchange {
                exchange_id: exchange::Id::new(),
                initiator_id: parties.provider,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::NotFound);
    }
}
