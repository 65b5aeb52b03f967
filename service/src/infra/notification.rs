//! Notification channel of state transitions.

use std::convert::Infallible;

use common::{operations::Publish, Handler};
use derive_more::Debug;
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use tokio::sync::broadcast;
use tracing as log;

use crate::domain::{exchange, offer, user, Exchange, Offer};

/// [`Channel`] configuration.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, SmartDefault)]
pub struct Config {
    /// Number of [`Event`]s retained for lagging subscribers.
    #[default(1024)]
    pub capacity: usize,
}

/// Event emitted after a successful state transition.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Event {
    /// [`Offer`] transitioned into a new [`offer::Status`].
    Offer {
        /// ID of the transitioned [`Offer`].
        id: offer::Id,

        /// New [`offer::Status`] of the [`Offer`].
        status: offer::Status,
    },

    /// [`Exchange`] transitioned into a new [`exchange::Status`].
    Exchange {
        /// ID of the transitioned [`Exchange`].
        id: exchange::Id,

        /// New [`exchange::Status`] of the [`Exchange`].
        status: exchange::Status,

        /// Participants of the [`Exchange`]: its requester and its provider.
        participants: [user::Id; 2],
    },
}

impl Event {
    /// Indicates whether the provided user may observe this [`Event`].
    ///
    /// [`Offer`] events are public, while [`Exchange`] events are visible to
    /// its participants only.
    #[must_use]
    pub fn is_visible_to(&self, user_id: user::Id) -> bool {
        match self {
            Self::Offer { .. } => true,
            Self::Exchange { participants, .. } => {
                participants.contains(&user_id)
            }
        }
    }
}

impl From<&Offer> for Event {
    fn from(offer: &Offer) -> Self {
        Self::Offer {
            id: offer.id,
            status: offer.status,
        }
    }
}

impl From<&Exchange> for Event {
    fn from(exchange: &Exchange) -> Self {
        Self::Exchange {
            id: exchange.id,
            status: exchange.status,
            participants: exchange.participants(),
        }
    }
}

/// Broadcast channel of [`Event`]s.
#[derive(Clone, Debug)]
pub struct Channel {
    /// Sender half of the underlying [`broadcast`] channel.
    #[debug(skip)]
    sender: broadcast::Sender<Event>,
}

impl Channel {
    /// Creates a new [`Channel`] with the provided [`Config`].
    #[must_use]
    pub fn new(conf: Config) -> Self {
        let (sender, _) = broadcast::channel(conf.capacity.max(1));
        Self { sender }
    }

    /// Subscribes to [`Event`]s published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }
}

impl Handler<Publish<Event>> for Channel {
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Publish(event): Publish<Event>,
    ) -> Result<Self::Ok, Self::Err> {
        if let Err(broadcast::error::SendError(event)) = self.sender.send(event)
        {
            log::trace!("no subscribers for `{event:?}`");
        }
        Ok(())
    }
}

#[cfg(test)]
mod spec {
    use common::{operations::Publish, Handler as _};

    use crate::domain::{exchange, offer, user};

    use super::{Channel, Config, Event};

    #[tokio::test]
    async fn delivers_to_subscribers() {
        let channel = Channel::new(Config::default());
        let mut rx = channel.subscribe();
        let event = Event::Offer {
            id: offer::Id::new(),
            status: offer::Status::Taken,
        };

        channel.execute(Publish(event.clone())).await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn publishing_without_subscribers_succeeds() {
        let channel = Channel::new(Config::default());

        let res = channel
            .execute(Publish(Event::Offer {
                id: offer::Id::new(),
                status: offer::Status::Open,
            }))
            .await;

        assert!(res.is_ok());
    }

    #[test]
    fn exchange_events_are_visible_to_participants_only() {
        let (requester, provider) = (user::Id::new(), user::Id::new());
        let event = Event::Exchange {
            id: exchange::Id::new(),
            status: exchange::Status::Pending,
            participants: [requester, provider],
        };

        assert!(event.is_visible_to(requester));
        assert!(event.is_visible_to(provider));
        assert!(!event.is_visible_to(user::Id::new()));
    }
}
