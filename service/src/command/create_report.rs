//! [`Command`] for filing a [`Report`] about another user.

use common::operations::{By, Insert, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{exchange, offer, report, user, Exchange, Offer, Report},
    error::{Kind, Kinded},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for filing a [`Report`] about another user.
///
/// A [`Report`] concerning an [`Exchange`] must target the counterparty of
/// the reporter in it, and a [`Report`] concerning an [`Offer`] must target
/// its owner.
#[derive(Clone, Debug)]
pub struct CreateReport {
    /// ID of the authenticated user filing the [`Report`], if any.
    pub reporter_id: Option<user::Id>,

    /// ID of the reported user.
    pub target_user_id: user::Id,

    /// ID of the [`Offer`] the [`Report`] concerns, if any.
    pub offer_id: Option<offer::Id>,

    /// ID of the [`Exchange`] the [`Report`] concerns, if any.
    pub exchange_id: Option<exchange::Id>,

    /// Reason of the [`Report`].
    pub reason: String,

    /// Additional note of the reporter.
    pub note: Option<String>,
}

impl<Db> Command<CreateReport> for Service<Db>
where
    Db: Database<
            Select<By<Option<Exchange>, exchange::Id>>,
            Ok = Option<Exchange>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Offer>, offer::Id>>,
            Ok = Option<Offer>,
            Err = Traced<database::Error>,
        > + Database<Insert<Report>, Err = Traced<database::Error>>,
{
    type Ok = Report;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateReport) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateReport {
            reporter_id,
            target_user_id,
            offer_id,
            exchange_id,
            reason,
            note,
        } = cmd;

        let reporter_id = reporter_id
            .ok_or(E::Unauthenticated)
            .map_err(tracerr::wrap!())?;
        let reason = report::Reason::new(&reason)
            .ok_or(E::InvalidReason)
            .map_err(tracerr::wrap!())?;
        if reporter_id == target_user_id {
            return Err(tracerr::new!(E::SelfReport));
        }

        if let Some(exchange_id) = exchange_id {
            let exchange = self
                .database()
                .execute(Select(By::<Option<Exchange>, _>::new(exchange_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::ExchangeNotExists(exchange_id))
                .map_err(tracerr::wrap!())?;

            let counterparty = exchange
                .counterparty_of(reporter_id)
                .ok_or(E::NotParticipant(reporter_id))
                .map_err(tracerr::wrap!())?;
            if counterparty != target_user_id {
                return Err(tracerr::new!(E::NotCounterparty(target_user_id)));
            }
            if offer_id.is_some_and(|id| id != exchange.offer_id) {
                return Err(tracerr::new!(E::OfferMismatch(exchange_id)));
            }
        } else if let Some(offer_id) = offer_id {
            let offer = self
                .database()
                .execute(Select(By::<Option<Offer>, _>::new(offer_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::OfferNotExists(offer_id))
                .map_err(tracerr::wrap!())?;

            if !offer.is_owned_by(target_user_id) {
                return Err(tracerr::new!(E::NotOfferOwner(target_user_id)));
            }
        }

        let report = Report {
            id: report::Id::new(),
            reporter_id,
            target_user_id,
            offer_id,
            exchange_id,
            reason,
            note: note.and_then(report::Note::new),
            created_at: report::CreationDateTime::now(),
        };

        self.database()
            .execute(Insert(report.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::debug!(
            "`Report(id: {})` filed by `User(id: {reporter_id})` against \
             `User(id: {target_user_id})`",
            report.id,
        );

        Ok(report)
    }
}

/// Error of [`CreateReport`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Exchange`] with the provided ID does not exist.
    #[display("`Exchange(id: {_0})` does not exist")]
    ExchangeNotExists(#[error(not(source))] exchange::Id),

    /// Provided reason is empty or too long.
    #[display(
        "Reason of a `Report` must be non-empty and at most {} bytes long",
        report::Reason::MAX_LEN
    )]
    InvalidReason,

    /// Reported user is not the counterparty of the reporter in the
    /// [`Exchange`].
    #[display("`User(id: {_0})` is not the counterparty in the `Exchange`")]
    NotCounterparty(#[error(not(source))] user::Id),

    /// Reported user doesn't own the [`Offer`].
    #[display("`User(id: {_0})` doesn't own the `Offer`")]
    NotOfferOwner(#[error(not(source))] user::Id),

    /// Reporter doesn't participate in the [`Exchange`].
    #[display("`User(id: {_0})` doesn't participate in the `Exchange`")]
    NotParticipant(#[error(not(source))] user::Id),

    /// Provided [`Offer`] is not the one the [`Exchange`] fulfills.
    #[display("`Exchange(id: {_0})` doesn't fulfill the provided `Offer`")]
    OfferMismatch(#[error(not(source))] exchange::Id),

    /// [`Offer`] with the provided ID does not exist.
    #[display("`Offer(id: {_0})` does not exist")]
    OfferNotExists(#[error(not(source))] offer::Id),

    /// Reporter and reported user are the same.
    #[display("`User` cannot report themselves")]
    SelfReport,

    /// No authenticated user files the [`Report`].
    #[display("Filing a `Report` requires authentication")]
    Unauthenticated,
}

impl Kinded for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(_) => Kind::Storage,
            Self::ExchangeNotExists(_) | Self::OfferNotExists(_) => {
                Kind::NotFound
            }
            Self::InvalidReason
            | Self::NotCounterparty(_)
            | Self::NotOfferOwner(_)
            | Self::OfferMismatch(_)
            | Self::SelfReport => Kind::Validation,
            Self::NotParticipant(_) | Self::Unauthenticated => Kind::Auth,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::Handler as _;

    use crate::{
        domain::{exchange, offer, user},
        error::{Kind, Kinded as _},
        fixture::{self, Parties},
    };

    use super::CreateReport;

    fn report(reporter: user::Id, target: user::Id) -> CreateReport {
        CreateReport {
            reporter_id: Some(reporter),
            target_user_id: target,
            offer_id: None,
            exchange_id: None,
            reason: "Rude behaviour".into(),
            note: None,
        }
    }

    #[tokio::test]
    async fn files_report_about_exchange_counterparty() {
        let svc = fixture::service();
        let parties = Parties::new();
        let exchange = fixture::accepted(&svc, parties, 60).await;

        let report = svc
            .execute(CreateReport {
                offer_id: Some(exchange.offer_id),
                exchange_id: Some(exchange.id),
                note: Some("  never showed up ".into()),
                ..report(parties.requester, parties.provider)
            })
            .await
            .unwrap();

        assert_eq!(report.reporter_id, parties.requester);
        assert_eq!(report.target_user_id, parties.provider);
        assert_eq!(report.exchange_id, Some(exchange.id));
        assert_eq!(
            report.note.as_ref().map(AsRef::<str>::as_ref),
            Some("never showed up"),
        );
    }

    #[tokio::test]
    async fn requires_authentication_and_reason() {
        let svc = fixture::service();
        let target = user::Id::new();

        let err = svc
            .execute(CreateReport {
                reporter_id: None,
                ..report(user::Id::new(), target)
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::Auth);

        let err = svc
            .execute(CreateReport {
                reason: "   ".into(),
                ..report(user::Id::new(), target)
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::Validation);
    }

    #[tokio::test]
    async fn forbids_reporting_oneself() {
        let svc = fixture::service();
        let user = user::Id::new();

        let err = svc.execute(report(user, user)).await.unwrap_err();

        assert_eq!(err.kind(), Kind::Validation);
    }

    #[tokio::test]
    async fn exchange_report_targets_counterparty() {
        let svc = fixture::service();
        let parties = Parties::new();
        let exchange = fixture::pending(&svc, parties, 30).await;
        let outsider = user::Id::new();

        let err = svc
            .execute(CreateReport {
                exchange_id: Some(exchange.id),
                ..report(parties.requester, outsider)
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::Validation);

        let err = svc
            .execute(CreateReport {
                exchange_id: Some(exchange.id),
                ..report(outsider, parties.provider)
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::Auth);

        let err = svc
            .execute(CreateReport {
                exchange_id: Some(exchange::Id::new()),
                ..report(parties.requester, parties.provider)
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::NotFound);
    }

    #[tokio::test]
    async fn exchange_report_matches_its_offer() {
        let svc = fixture::service();
        let parties = Parties::new();
        let exchange = fixture::pending(&svc, parties, 30).await;
        let other = fixture::offer(&svc, parties.provider, 30).await;

        let err = svc
            .execute(CreateReport {
                offer_id: Some(other.id),
                exchange_id: Some(exchange.id),
                ..report(parties.provider, parties.requester)
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::Validation);
    }

    #[tokio::test]
    async fn offer_report_targets_owner() {
        let svc = fixture::service();
        let (owner, reporter) = (user::Id::new(), user::Id::new());
        let offer = fixture::offer(&svc, owner, 45).await;

        let report_of = |target| CreateReport {
            offer_id: Some(offer.id),
            ..report(reporter, target)
        };
        let filed = svc.execute(report_of(owner)).await.unwrap();
        assert_eq!(filed.offer_id, Some(offer.id));

        let err = svc.execute(report_of(user::Id::new())).await.unwrap_err();
        assert_eq!(err.kind(), Kind::Validation);

        let err = svc
            .execute(CreateReport {
                offer_id: Some(offer::Id::new()),
                ..report(reporter, owner)
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::NotFound);
    }
}
