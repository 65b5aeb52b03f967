//! [`Command`] for withdrawing an [`Offer`].

use common::operations::{By, Publish, Select, Swap};
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

/// [`Command`] for withdrawing an open [`Offer`] by its owner.
#[derive(Clone, Debug)]
pub struct CloseOffer {
    /// ID of the [`Offer`] to be withdrawn.
    pub offer_id: offer::Id,

    /// ID of the user who withdraws the [`Offer`].
    pub initiator_id: user::Id,

    /// Free-form reason of withdrawing, if any.
    pub reason: Option<String>,
}

impl<Db> Command<CloseOffer> for Service<Db>
where
    Db: Database<
            Select<By<Option<Offer>, offer::Id>>,
            Ok = Option<Offer>,
            Err = Traced<database::Error>,
        > + Database<
            Swap<Offer, offer::Status>,
            Ok = bool,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Offer;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CloseOffer) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CloseOffer {
            offer_id,
            initiator_id,
            reason,
        } = cmd;

        let offer = self
            .database()
            .execute(Select(By::<Option<Offer>, _>::new(offer_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::OfferNotExists(offer_id))
            .map_err(tracerr::wrap!())?;

        if !offer.is_owned_by(initiator_id) {
            return Err(tracerr::new!(E::NotOwner(initiator_id, offer_id)));
        }
        if offer.status != offer::Status::Open {
            return Err(tracerr::new!(E::OfferNotOpen(offer_id)));
        }

        let closed = offer.with_status(offer::Status::Cancelled);
        let swapped = self
            .database()
            .execute(Swap {
                expected: offer.status,
                new: closed.clone(),
            })
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !swapped {
            return Err(tracerr::new!(E::OfferNotOpen(offer_id)));
        }

        log::debug!(
            "`Offer(id: {offer_id})` closed by its owner, reason: {}",
            reason.as_deref().map_or("<none>", str::trim),
        );
        _ = self
            .notifications()
            .execute(Publish(notification::Event::from(&closed)))
            .await;

        Ok(closed)
    }
}

/// Error of [`CloseOffer`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// User doesn't own the [`Offer`].
    #[display("`User(id: {_0})` doesn't own `Offer(id: {_1})`")]
    NotOwner(#[error(not(source))] user::Id, #[error(not(source))] offer::Id),

    /// [`Offer`] with the provided ID does not exist.
    #[display("`Offer(id: {_0})` does not exist")]
    OfferNotExists(#[error(not(source))] offer::Id),

    /// [`Offer`] is not open anymore.
    #[display("`Offer(id: {_0})` is not open")]
    OfferNotOpen(#[error(not(source))] offer::Id),
}

impl Kinded for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(_) => Kind::Storage,
            Self::NotOwner(..) => Kind::Auth,
            Self::OfferNotExists(_) => Kind::NotFound,
            Self::OfferNotOpen(_) => Kind::Conflict,
        }
    }
}
