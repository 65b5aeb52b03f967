//! [`Command`] for publishing a new [`Offer`].

use common::{
    operations::{Insert, Publish},
    Minutes,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{offer, user, Offer},
    error::{Kind, Kinded},
    infra::{database, notification, Database},
    Service,
};

use super::Command;

/// [`Command`] for publishing a new [`Offer`].
///
/// Text fields are validated and normalized by the [`Command`] itself: they
/// are trimmed, and empty optional ones are treated as absent.
#[derive(Clone, Debug)]
pub struct CreateOffer {
    /// ID of the authenticated user publishing the [`Offer`], if any.
    pub owner_id: Option<user::Id>,

    /// Title of the new [`Offer`].
    pub title: String,

    /// Time value of the new [`Offer`].
    pub minutes: Minutes,

    /// Description of the new [`Offer`].
    pub description: Option<String>,

    /// Category of the new [`Offer`].
    pub category: Option<String>,

    /// Hint about where the new [`Offer`] takes place.
    pub location_hint: Option<String>,
}

impl<Db> Command<CreateOffer> for Service<Db>
where
    Db: Database<Insert<Offer>, Err = Traced<database::Error>>,
{
    type Ok = Offer;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateOffer) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateOffer {
            owner_id,
            title,
            minutes,
            description,
            category,
            location_hint,
        } = cmd;

        let owner_id = owner_id
            .ok_or(E::Unauthenticated)
            .map_err(tracerr::wrap!())?;
        let title = offer::Title::new(&title)
            .ok_or(E::InvalidTitle)
            .map_err(tracerr::wrap!())?;
        let duration = offer::Duration::new(minutes)
            .ok_or(E::InvalidDuration(minutes))
            .map_err(tracerr::wrap!())?;

        let offer = Offer {
            id: offer::Id::new(),
            owner_id,
            title,
            description: description.and_then(offer::Description::new),
            category: category.and_then(offer::Category::new),
            location_hint: location_hint.and_then(offer::LocationHint::new),
            duration,
            status: offer::Status::Open,
            created_at: offer::CreationDateTime::now(),
        };

        self.database()
            .execute(Insert(offer.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::debug!(
            "`Offer(id: {})` created by `User(id: {owner_id})`",
            offer.id,
        );
        _ = self
            .notifications()
            .execute(Publish(notification::Event::from(&offer)))
            .await;

        Ok(offer)
    }
}

/// Error of [`CreateOffer`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Provided duration is not positive, or exceeds
    /// [`offer::Duration::MAX`].
    #[display(
        "Duration of an `Offer` must be positive and at most one year, but \
         is `{_0}`"
    )]
    InvalidDuration(#[error(not(source))] Minutes),

    /// Provided title is empty or too long.
    #[display(
        "Title of an `Offer` must be non-empty and at most {} bytes long",
        offer::Title::MAX_LEN
    )]
    InvalidTitle,

    /// No authenticated user publishes the [`Offer`].
    #[display("Publishing an `Offer` requires authentication")]
    Unauthenticated,
}

impl Kinded for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(_) => Kind::Storage,
            Self::InvalidDuration(_) | Self::InvalidTitle => Kind::Validation,
            Self::Unauthenticated => Kind::Auth,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::{Handler as _, Minutes};

    use crate::{
        domain::{offer, user},
        error::{Kind, Kinded as _},
        fixture,
        infra::notification::Event,
    };

    use super::CreateOffer;

    fn cmd(owner_id: Option<user::Id>) -> CreateOffer {
        CreateOffer {
            owner_id,
            title: " Piano lessons ".into(),
            minutes: Minutes::new(60),
            description: Some("Beginners welcome".into()),
            category: Some("  ".into()),
            location_hint: None,
        }
    }

    #[tokio::test]
    async fn creates_open_offer() {
        let svc = fixture::service();
        let mut events = svc.subscribe();
        let owner_id = user::Id::new();

        let offer = svc.execute(cmd(Some(owner_id))).await.unwrap();

        assert_eq!(offer.owner_id, owner_id);
        assert_eq!(offer.status, offer::Status::Open);
        assert_eq!(offer.title.to_string(), "Piano lessons");
        assert_eq!(offer.duration.minutes(), Minutes::new(60));
        assert!(offer.description.is_some());
        assert!(offer.category.is_none());
        assert_eq!(
            events.recv().await.unwrap(),
            Event::Offer {
                id: offer.id,
                status: offer::Status::Open,
            },
        );
    }

    #[tokio::test]
    async fn requires_owner() {
        let svc = fixture::service();

        let err = svc.execute(cmd(None)).await.unwrap_err();

        assert_eq!(err.kind(), Kind::Auth);
    }

    #[tokio::test]
    async fn validates_title_and_duration() {
        let svc = fixture::service();
        let owner_id = Some(user::Id::new());

        let err = svc
            .execute(CreateOffer {
                title: "   ".into(),
                ..cmd(owner_id)
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::Validation);

        for minutes in [
            0,
            -60,
            offer::Duration::MAX.get() + 1,
            i32::MAX.into(),
        ] {
            let err = svc
                .execute(CreateOffer {
                    minutes: Minutes::new(minutes),
                    ..cmd(owner_id)
                })
                .await
                .unwrap_err();
            assert_eq!(err.kind(), Kind::Validation);
        }
    }
}
