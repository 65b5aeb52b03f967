//! Helpers for testing [`Service`] operations against the [`Memory`]
//! database.

use std::time::Duration;

use common::{Handler as _, Minutes};

use crate::{
    command::{AcceptExchange, CreateOffer, TakeOffer},
    domain::{user, Exchange, Offer},
    infra::{notification, Memory},
    Config, ListConfig, Service,
};

/// Secret the testing JWTs are signed with.
pub(crate) const JWT_SECRET: &[u8] = b"test-secret";

/// Creates a new [`Service`] backed by an empty [`Memory`] database.
pub(crate) fn service() -> Service<Memory> {
    Service::new(
        Config {
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                JWT_SECRET,
            ),
            list: ListConfig::default(),
            notifications: notification::Config::default(),
        },
        Memory::new(),
    )
}

/// Publishes a new open [`Offer`] of the provided `owner_id`.
pub(crate) async fn offer(
    svc: &Service<Memory>,
    owner_id: user::Id,
    minutes: i64,
) -> Offer {
    // Keeps creation times distinct, so listing order is deterministic.
    tokio::time::sleep(Duration::from_millis(2)).await;

    svc.execute(CreateOffer {
        owner_id: Some(owner_id),
        title: "Gardening help".into(),
        minutes: Minutes::new(minutes),
        description: None,
        category: Some("garden".into()),
        location_hint: None,
    })
    .await
    .unwrap()
}

/// Participants of a testing [`Exchange`].
#[derive(Clone, Copy, Debug)]
pub(crate) struct Parties {
    /// Requester of the [`Exchange`].
    pub(crate) requester: user::Id,

    /// Provider of the [`Exchange`].
    pub(crate) provider: user::Id,
}

impl Parties {
    /// Generates new random [`Parties`].
    pub(crate) fn new() -> Self {
        Self {
            requester: user::Id::new(),
            provider: user::Id::new(),
        }
    }
}

/// Creates a pending [`Exchange`] of the provided [`Parties`] worth the
/// provided `minutes`.
pub(crate) async fn pending(
    svc: &Service<Memory>,
    parties: Parties,
    minutes: i64,
) -> Exchange {
    let offer = offer(svc, parties.provider, minutes).await;
    svc.execute(TakeOffer {
        offer_id: offer.id,
        requester_id: parties.requester,
    })
    .await
    .unwrap()
}

/// Creates an accepted [`Exchange`] of the provided [`Parties`] worth the
/// provided `minutes`.
pub(crate) async fn accepted(
    svc: &Service<Memory>,
    parties: Parties,
    minutes: i64,
) -> Exchange {
    let exchange = pending(svc, parties, minutes).await;
    svc.execute(AcceptExchange {
        exchange_id: exchange.id,
        initiator_id: parties.provider,
    })
    .await
    .unwrap()
}
