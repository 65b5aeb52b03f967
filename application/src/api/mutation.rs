//! GraphQL [`Mutation`]s definitions.

use common::Minutes;
use juniper::graphql_object;
use service::{command, Command as _};

use crate::{api, context::AuthError, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Publishes a new open `Offer` owned by the authenticated `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `INVALID_OFFER_TITLE` - the provided `title` is blank or too long;
    /// - `INVALID_OFFER_DURATION` - the provided `minutes` are not positive,
    ///                              or exceed one year.
    #[tracing::instrument(
        skip_all,
        fields(
            category = ?category,
            gql.name = "createOffer",
            minutes = %minutes,
            otel.name = Self::SPAN_NAME,
            title = %title,
        ),
    )]
    pub async fn create_offer(
        title: String,
        minutes: i32,
        description: Option<String>,
        category: Option<String>,
        location_hint: Option<String>,
        ctx: &Context,
    ) -> Result<api::Offer, Error> {
        let owner = ctx.try_current_session().await?;

        ctx.service()
            .execute(command::CreateOffer {
                owner_id: owner.map(|s| s.user_id.into()),
                title,
                minutes: Minutes::new(minutes.into()),
                description,
                category,
                location_hint,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Withdraws the open `Offer` owned by the authenticated `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `OFFER_NOT_EXISTS` - the `Offer` with the specified ID does not
    ///                        exist;
    /// - `NOT_OFFER_OWNER` - the authenticated `User` doesn't own the `Offer`;
    /// - `OFFER_NOT_OPEN` - the `Offer` is not open anymore.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "closeOffer",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn close_offer(
        id: api::offer::Id,
        reason: Option<String>,
        ctx: &Context,
    ) -> Result<api::Offer, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::CloseOffer {
                offer_id: id.into(),
                initiator_id: my_id.into(),
                reason,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Takes the open `Offer`, creating a pending `Exchange` between the
    /// authenticated `User` and the `Offer` owner.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `OFFER_NOT_EXISTS` - the `Offer` with the specified ID does not
    ///                        exist;
    /// - `OWN_OFFER` - the authenticated `User` owns the `Offer`;
    /// - `OFFER_NOT_OPEN` - the `Offer` has been taken or withdrawn already.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "takeOffer",
            offer = %offer,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn take_offer(
        offer: api::offer::Id,
        ctx: &Context,
    ) -> Result<api::Exchange, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::TakeOffer {
                offer_id: offer.into(),
                requester_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Accepts the pending `Exchange` provided by the authenticated `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `EXCHANGE_NOT_EXISTS` - the `Exchange` with the specified ID does
    ///                           not exist;
    /// - `NOT_EXCHANGE_PROVIDER` - the authenticated `User` is not the
    ///                             `Exchange` provider;
    /// - `INVALID_EXCHANGE_STATUS` - the `Exchange` is not pending;
    /// - `EXCHANGE_MODIFIED` - the `Exchange` has been modified concurrently.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "acceptExchange",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn accept_exchange(
        id: api::exchange::Id,
        ctx: &Context,
    ) -> Result<api::Exchange, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::AcceptExchange {
                exchange_id: id.into(),
                initiator_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Completes the accepted `Exchange`, settling its minutes from the
    /// requester to the provider.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `EXCHANGE_NOT_EXISTS` - the `Exchange` with the specified ID does
    ///                           not exist;
    /// - `NOT_EXCHANGE_PARTICIPANT` - the authenticated `User` doesn't
    ///                                participate in the `Exchange`;
    /// - `INVALID_EXCHANGE_STATUS` - the `Exchange` is not accepted;
    /// - `EXCHANGE_MODIFIED` - the `Exchange` has been modified concurrently.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "completeExchange",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn complete_exchange(
        id: api::exchange::Id,
        ctx: &Context,
    ) -> Result<api::Exchange, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::CompleteExchange {
                exchange_id: id.into(),
                initiator_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Cancels the pending or accepted `Exchange`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `EXCHANGE_NOT_EXISTS` - the `Exchange` with the specified ID does
    ///                           not exist;
    /// - `NOT_EXCHANGE_PARTICIPANT` - the authenticated `User` doesn't
    ///                                participate in the `Exchange`;
    /// - `INVALID_EXCHANGE_STATUS` - the `Exchange` is finished already;
    /// - `EXCHANGE_MODIFIED` - the `Exchange` has been modified concurrently.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "cancelExchange",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn cancel_exchange(
        id: api::exchange::Id,
        reason: Option<String>,
        ctx: &Context,
    ) -> Result<api::Exchange, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::CancelExchange {
                exchange_id: id.into(),
                initiator_id: my_id.into(),
                reason,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Reports that the `against` participant of the accepted `Exchange`
    /// didn't show up.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `EXCHANGE_NOT_EXISTS` - the `Exchange` with the specified ID does
    ///                           not exist;
    /// - `NOT_EXCHANGE_PARTICIPANT` - the authenticated `User` doesn't
    ///                                participate in the `Exchange`;
    /// - `NOT_EXCHANGE_COUNTERPARTY` - the `against` `User` is not the other
    ///                                 participant of the `Exchange`;
    /// - `INVALID_EXCHANGE_STATUS` - the `Exchange` is not accepted;
    /// - `EXCHANGE_MODIFIED` - the `Exchange` has been modified concurrently.
    #[tracing::instrument(
        skip_all,
        fields(
            against = %against,
            gql.name = "markNoShow",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn mark_no_show(
        id: api::exchange::Id,
        against: api::user::Id,
        ctx: &Context,
    ) -> Result<api::Exchange, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::MarkNoShow {
                exchange_id: id.into(),
                initiator_id: my_id.into(),
                against_user_id: against.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Files a `Report` of the authenticated `User` about the `target` one.
    ///
    /// A `Report` concerning an `Exchange` must target the other participant
    /// of it, and a `Report` concerning only an `Offer` must target its
    /// owner.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `INVALID_REPORT_REASON` - the provided `reason` is blank or too long;
    /// - `SELF_REPORT` - the `target` is the authenticated `User`;
    /// - `EXCHANGE_NOT_EXISTS` - the `Exchange` with the specified ID does
    ///                           not exist;
    /// - `NOT_EXCHANGE_PARTICIPANT` - the authenticated `User` doesn't
    ///                                participate in the `Exchange`;
    /// - `NOT_EXCHANGE_COUNTERPARTY` - the `target` is not the other
    ///                                 participant of the `Exchange`;
    /// - `REPORT_OFFER_MISMATCH` - the `Exchange` doesn't fulfill the
    ///                             specified `Offer`;
    /// - `OFFER_NOT_EXISTS` - the `Offer` with the specified ID does not
    ///                        exist;
    /// - `REPORTED_USER_NOT_OFFER_OWNER` - the `target` doesn't own the
    ///                                     `Offer`.
    #[tracing::instrument(
        skip_all,
        fields(
            exchange = ?exchange,
            gql.name = "createReport",
            offer = ?offer,
            otel.name = Self::SPAN_NAME,
            target = %target,
        ),
    )]
    pub async fn create_report(
        target: api::user::Id,
        offer: Option<api::offer::Id>,
        exchange: Option<api::exchange::Id>,
        reason: String,
        note: Option<String>,
        ctx: &Context,
    ) -> Result<api::Report, Error> {
        let reporter = ctx.try_current_session().await?;

        ctx.service()
            .execute(command::CreateReport {
                reporter_id: reporter.map(|s| s.user_id.into()),
                target_user_id: target.into(),
                offer_id: offer.map(Into::into),
                exchange_id: exchange.map(Into::into),
                reason,
                note,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

impl AsError for command::create_offer::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use api::OfferError as E;

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::InvalidDuration(_) => Some(E::InvalidDuration.into()),
            Self::InvalidTitle => Some(E::InvalidTitle.into()),
            Self::Unauthenticated => {
                Some(AuthError::AuthorizationRequired.into())
            }
        }
    }
}

impl AsError for command::close_offer::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use api::OfferError as E;

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NotOwner(..) => Some(E::NotOwner.into()),
            Self::OfferNotExists(_) => Some(E::NotExists.into()),
            Self::OfferNotOpen(_) => Some(E::NotOpen.into()),
        }
    }
}

impl AsError for command::take_offer::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use api::OfferError as E;

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::OfferNotExists(_) => Some(E::NotExists.into()),
            Self::OfferNotOpen(_) => Some(E::NotOpen.into()),
            Self::OwnOffer(_) => Some(E::OwnOffer.into()),
        }
    }
}

impl AsError for command::accept_exchange::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use api::ExchangeError as E;

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Diverged(_) => Some(E::Diverged.into()),
            Self::ExchangeNotExists(_) => Some(E::NotExists.into()),
            Self::NotPending(_) => Some(E::InvalidStatus.into()),
            Self::NotProvider(_) => Some(E::NotProvider.into()),
        }
    }
}

impl AsError for command::complete_exchange::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use api::ExchangeError as E;

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Diverged(_) => Some(E::Diverged.into()),
            Self::ExchangeNotExists(_) => Some(E::NotExists.into()),
            Self::NotAccepted(_) => Some(E::InvalidStatus.into()),
            Self::NotParticipant(_) => Some(E::NotParticipant.into()),
        }
    }
}

impl AsError for command::cancel_exchange::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use api::ExchangeError as E;

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Diverged(_) => Some(E::Diverged.into()),
            Self::ExchangeNotExists(_) => Some(E::NotExists.into()),
            Self::NotCancellable(_) => Some(E::InvalidStatus.into()),
            Self::NotParticipant(_) => Some(E::NotParticipant.into()),
        }
    }
}

impl AsError for command::mark_no_show::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use api::ExchangeError as E;

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Diverged(_) => Some(E::Diverged.into()),
            Self::ExchangeNotExists(_) => Some(E::NotExists.into()),
            Self::NotAccepted(_) => Some(E::InvalidStatus.into()),
            Self::NotCounterparty(_) => Some(E::NotCounterparty.into()),
            Self::NotParticipant(_) => Some(E::NotParticipant.into()),
        }
    }
}

impl AsError for command::create_report::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use api::{ExchangeError as X, OfferError as O, ReportError as R};

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ExchangeNotExists(_) => Some(X::NotExists.into()),
            Self::InvalidReason => Some(R::InvalidReason.into()),
            Self::NotCounterparty(_) => Some(X::NotCounterparty.into()),
            Self::NotOfferOwner(_) => Some(R::NotOfferOwner.into()),
            Self::NotParticipant(_) => Some(X::NotParticipant.into()),
            Self::OfferMismatch(_) => Some(R::OfferMismatch.into()),
            Self::OfferNotExists(_) => Some(O::NotExists.into()),
            Self::SelfReport => Some(R::SelfReport.into()),
            Self::Unauthenticated => {
                Some(AuthError::AuthorizationRequired.into())
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use service::{
        command::create_report::ExecutionError,
        domain::{exchange, user},
        error::Kinded as _,
    };

    use crate::AsError as _;

    #[test]
    fn report_errors_keep_their_kind() {
        let user_id = user::Id::new();
        for err in [
            ExecutionError::Unauthenticated,
            ExecutionError::InvalidReason,
            ExecutionError::SelfReport,
            ExecutionError::ExchangeNotExists(exchange::Id::new()),
            ExecutionError::NotParticipant(user_id),
            ExecutionError::NotCounterparty(user_id),
            ExecutionError::OfferMismatch(exchange::Id::new()),
            ExecutionError::NotOfferOwner(user_id),
        ] {
            let api = err.try_as_error().unwrap();

            assert_eq!(api.kind, err.kind(), "`{}` kind differs", api.code);
        }
    }

    #[test]
    fn exchange_report_errors_share_exchange_codes() {
        let user_id = user::Id::new();

        let err = ExecutionError::NotCounterparty(user_id).as_error();
        assert_eq!(err.code, "NOT_EXCHANGE_COUNTERPARTY");

        let err = ExecutionError::SelfReport.as_error();
        assert_eq!(err.code, "SELF_REPORT");
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
    }
}
