//! GraphQL [`Subscription`]s definitions.

use common::DateTime;
use futures::{
    future,
    stream::{self, BoxStream},
    FutureExt as _, StreamExt as _,
};
use juniper::{graphql_object, graphql_subscription, GraphQLEnum, ID};
use service::{domain::user, infra::notification};
use tokio::sync::broadcast;
use tracing as log;

use crate::{context, Context, Error};

/// Root of all GraphQL subscription.
#[derive(Clone, Copy, Debug)]
pub struct Subscription;

#[graphql_subscription(context = Context)]
impl Subscription {
    /// Subscription waiting for the current authenticated session to expire.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - if the current session is not
    ///                              authenticated or session expired.
    pub async fn wait_session(
        &self,
        ctx: &Context,
    ) -> Result<BoxStream<'static, Result<bool, Error>>, Error> {
        let session = ctx.current_session().await?;
        let timeout = session.expires_at - DateTime::now();
        Ok(stream::once(
            tokio::time::sleep(timeout).map(|()| {
                Err(context::AuthError::AuthorizationRequired.into())
            }),
        )
        .boxed())
    }

    /// Subscription to state transitions of `Offer`s and of the `Exchange`s
    /// the authenticated `User` participates in.
    ///
    /// Ends once the current session expires.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - if the current session is not
    ///                              authenticated or session expired.
    pub async fn events(
        &self,
        ctx: &Context,
    ) -> Result<BoxStream<'static, Result<Event, Error>>, Error> {
        let session = ctx.current_session().await?;
        let my_id: user::Id = session.user_id.into();
        let timeout = session.expires_at - DateTime::now();

        let events = stream::unfold(
            ctx.service().subscribe(),
            |mut rx| async move {
                loop {
                    match rx.recv().await {
                        Ok(ev) => return Some((ev, rx)),
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            log::warn!("skipped {skipped} lagged events");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            return None;
                        }
                    }
                }
            },
        );

        Ok(events
            .filter(move |ev| future::ready(ev.is_visible_to(my_id)))
            .map(|ev| Ok(ev.into()))
            .take_until(tokio::time::sleep(timeout))
            .boxed())
    }
}

/// Notification about a state transition.
#[derive(Clone, Debug)]
pub struct Event(notification::Event);

impl From<notification::Event> for Event {
    fn from(ev: notification::Event) -> Self {
        Self(ev)
    }
}

/// Notification about an `Offer` or an `Exchange` having transitioned into a
/// new status.
#[graphql_object(context = Context)]
impl Event {
    /// Kind of the transitioned entity.
    #[must_use]
    pub fn entity(&self) -> Entity {
        match self.0 {
            notification::Event::Offer { .. } => Entity::Offer,
            notification::Event::Exchange { .. } => Entity::Exchange,
        }
    }

    /// ID of the transitioned entity.
    #[must_use]
    pub fn entity_id(&self) -> ID {
        match &self.0 {
            notification::Event::Offer { id, .. } => ID::new(id.to_string()),
            notification::Event::Exchange { id, .. } => {
                ID::new(id.to_string())
            }
        }
    }

    /// New status of the transitioned entity, like `taken` or `completed`.
    #[must_use]
    pub fn status(&self) -> String {
        match &self.0 {
            notification::Event::Offer { status, .. } => status.to_string(),
            notification::Event::Exchange { status, .. } => {
                status.to_string()
            }
        }
    }
}

/// Kind of an entity an `Event` is about.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "EventEntity")]
pub enum Entity {
    /// `Offer` entity.
    Offer,

    /// `Exchange` entity.
    Exchange,
}
