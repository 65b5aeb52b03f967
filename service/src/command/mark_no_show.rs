//! [`Command`] for marking an [`Exchange`] as a no-show.

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

/// [`Command`] for flagging the counterparty of an accepted [`Exchange`] as
/// not having shown up.
///
/// Marking a no-show has no effect on the ledger.
#[derive(Clone, Copy, Debug)]
pub struct MarkNoShow {
    /// ID of the [`Exchange`] to be marked.
    pub exchange_id: exchange::Id,

    /// ID of the participant reporting the no-show.
    pub initiator_id: user::Id,

    /// ID of the participant who didn't show up.
    pub against_user_id: user::Id,
}

impl<Db> Command<MarkNoShow> for Service<Db>
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

    async fn execute(&self, cmd: MarkNoShow) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let MarkNoShow {
            exchange_id,
            initiator_id,
            against_user_id,
        } = cmd;

        let exchange = self
            .database()
            .execute(Select(By::<Option<Exchange>, _>::new(exchange_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ExchangeNotExists(exchange_id))
            .map_err(tracerr::wrap!())?;

        let counterparty = exchange
            .counterparty_of(initiator_id)
            .ok_or(E::NotParticipant(initiator_id))
            .map_err(tracerr::wrap!())?;
        if !exchange.status.can_become(exchange::Status::NoShow) {
            return Err(tracerr::new!(E::NotAccepted(exchange.status)));
        }
        if counterparty != against_user_id {
            return Err(tracerr::new!(E::NotCounterparty(against_user_id)));
        }

        let marked = Exchange {
            status: exchange::Status::NoShow,
            no_show: Some(exchange::NoShow {
                by: initiator_id,
                against: against_user_id,
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
                new: marked.clone(),
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
            "`Exchange(id: {exchange_id})` marked as no-show of `User(id: \
             {against_user_id})`",
        );
        _ = self
            .notifications()
            .execute(Publish(notification::Event::from(&marked)))
            .await;

        Ok(marked)
    }
}

/// Error of [`MarkNoShow`] [`Command`] execution.
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
    #[display("`Exchange` cannot be marked as no-show while being `{_0}`")]
    NotAccepted(#[error(not(source))] exchange::Status),

    /// Flagged user is not the counterparty of the initiator.
    #[display("`User(id: {_0})` is not the counterparty in the `Exchange`")]
    NotCounterparty(#[error(not(source))] user::Id),

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
            Self::NotCounterparty(_) => Kind::Validation,
            Self::NotParticipant(_) => Kind::Auth,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::{Handler as _, Minutes};

    use crate::{
        command::CancelExchange,
        domain::{exchange, user},
        error::{Kind, Kinded as _},
        fixture::{self, Parties},
        query,
    };

    use super::MarkNoShow;

    #[tokio::test]
    async fn flags_counterparty_of_accepted_exchange() {
        let svc = fixture::service();
        let parties = Parties::new();
        let exchange = fixture::accepted(&svc, parties, 60).await;

        let marked = svc
            .execute(MarkNoShow {
                exchange_id: exchange.id,
                initiator_id: parties.provider,
                against_user_id: parties.requester,
            })
            .await
            .unwrap();

        assert_eq!(marked.status, exchange::Status::NoShow);
        let no_show = marked.no_show.unwrap();
        assert_eq!(no_show.by, parties.provider);
        assert_eq!(no_show.against, parties.requester);
        let balance = svc
            .execute(query::ledger::Balance::by(parties.requester))
            .await
            .unwrap();
        assert_eq!(*balance, Minutes::ZERO);

        let err = svc
            .execute(CancelExchange {
                exchange_id: exchange.id,
                initiator_id: parties.requester,
                reason: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::Conflict);
    }

    #[tokio::test]
    async fn validates_participants() {
        let svc = fixture::service();
        let parties = Parties::new();
        let exchange = fixture::accepted(&svc, parties, 60).await;

        let err = svc
            .execute(MarkNoShow {
                exchange_id: exchange.id,
                initiator_id: parties.provider,
                against_user_id: parties.provider,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::Validation);

        let err = svc
            .execute(MarkNoShow {
                exchange_id: exchange.id,
                initiator_id: user::Id::new(),
                against_user_id: parties.requester,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::Auth);
    }

    #[tokio::test]
    async fn requires_accepted_exchange() {
        let svc = fixture::service();
        let parties = Parties::new();
        let exchange = fixture::pending(&svc, parties, 60).await;

        let err = svc
            .execute(MarkNoShow {
                exchange_id: exchange.id,
                initiator_id: parties.requester,
                against_user_id: parties.provider,
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::Conflict);
    }

    #[tokio::test]
    async fn terminal_exchange_conflicts_before_validation() {
        let svc = fixture::service();
        let parties = Parties::new();
        let exchange = fixture::accepted(&svc, parties, 60).await;
        _ = svc
            .execute(MarkNoShow {
                exchange_id: exchange.id,
                initiator_id: parties.requester,
                against_user_id: parties.provider,
            })
            .await
            .unwrap();

        for against_user_id in [parties.requester, user::Id::new()] {
            let err = svc
                .execute(MarkNoShow {
                    exchange_id: exchange.id,
                    initiator_id: parties.provider,
                    against_user_id,
                })
                .await
                .unwrap_err();

            assert_eq!(err.kind(), Kind::Conflict);
        }
    }
}
