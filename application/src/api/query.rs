//! GraphQL [`Query`]s definitions.

use juniper::graphql_object;
use service::{domain::offer, query, read, Query as _};

use crate::{api, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Lists `Offer`s from the newest to the oldest.
    ///
    /// At most `limit` `Offer`s are returned, being `50` if not specified,
    /// and never more than `200`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_LIMIT` - the provided `limit` is not positive.
    #[tracing::instrument(
        skip_all,
        fields(
            category = ?category,
            gql.name = "offers",
            limit = ?limit,
            otel.name = Self::SPAN_NAME,
            owner = ?owner,
            status = ?status,
        ),
    )]
    pub async fn offers(
        owner: Option<api::user::Id>,
        category: Option<String>,
        status: Option<api::offer::Status>,
        limit: Option<i32>,
        ctx: &Context,
    ) -> Result<Vec<api::Offer>, Error> {
        let limit = api::list_limit(limit)
            .map_err(Into::into)
            .map_err(ctx.error())?;
        let filter = read::offer::list::Filter {
            owner_id: owner.map(Into::into),
            category: category.and_then(offer::Category::new),
            status: status.map(Into::into),
        };

        ctx.service()
            .execute(query::offers::List::new(filter, limit))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|offers| offers.into_iter().map(Into::into).collect())
    }

    /// Returns the `Offer` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `OFFER_NOT_EXISTS` - the `Offer` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "offer",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn offer(
        id: api::offer::Id,
        ctx: &Context,
    ) -> Result<api::Offer, Error> {
        ctx.service()
            .execute(query::offer::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::OfferError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Lists `Exchange`s the authenticated `User` participates in, from the
    /// newest to the oldest.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `INVALID_LIMIT` - the provided `limit` is not positive.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myExchanges",
            limit = ?limit,
            otel.name = Self::SPAN_NAME,
            status = ?status,
        ),
    )]
    pub async fn my_exchanges(
        status: Option<api::exchange::Status>,
        limit: Option<i32>,
        ctx: &Context,
    ) -> Result<Vec<api::Exchange>, Error> {
        let my_id = ctx.current_session().await?.user_id;
        let limit = api::list_limit(limit)
            .map_err(Into::into)
            .map_err(ctx.error())?;
        let filter = read::exchange::list::Filter {
            participant_id: my_id.into(),
            status: status.map(Into::into),
        };

        ctx.service()
            .execute(query::exchanges::List::new(filter, limit))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|exchanges| exchanges.into_iter().map(Into::into).collect())
    }

    /// Returns the `Exchange` with the specified ID.
    ///
    /// Only participants of the `Exchange` may observe it.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `EXCHANGE_NOT_EXISTS` - the `Exchange` with the specified ID does
    ///                           not exist;
    /// - `NOT_EXCHANGE_PARTICIPANT` - the authenticated `User` doesn't
    ///                                participate in the `Exchange`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "exchange",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn exchange(
        id: api::exchange::Id,
        ctx: &Context,
    ) -> Result<api::Exchange, Error> {
        let my_id = ctx.current_session().await?.user_id;

        let exchange = ctx
            .service()
            .execute(query::exchange::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::ExchangeError::NotExists.into())
            .map_err(ctx.error())?;
        if !exchange.is_participant(my_id.into()) {
            return Err(ctx.error()(api::ExchangeError::NotParticipant.into()));
        }

        Ok(exchange.into())
    }

    /// Returns the `Balance` of the authenticated `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myBalance",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_balance(
        ctx: &Context,
    ) -> Result<api::ledger::Balance, Error> {
        let my_id = ctx.current_session().await?.user_id;
        Self::balance(my_id, ctx).await
    }

    /// Returns the `Balance` of the `User` with the specified ID.
    ///
    /// `User`s having no `LedgerEntry`s have a zero `Balance`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "balance",
            otel.name = Self::SPAN_NAME,
            user = %user,
        ),
    )]
    pub async fn balance(
        user: api::user::Id,
        ctx: &Context,
    ) -> Result<api::ledger::Balance, Error> {
        _ = ctx.current_session().await?;

        ctx.service()
            .execute(query::ledger::Balance::by(user.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Lists `LedgerEntry`s of the authenticated `User`, from the newest to
    /// the oldest.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `INVALID_LIMIT` - the provided `limit` is not positive.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myLedger",
            limit = ?limit,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_ledger(
        limit: Option<i32>,
        ctx: &Context,
    ) -> Result<Vec<api::ledger::Entry>, Error> {
        let my_id = ctx.current_session().await?.user_id;
        let limit = api::list_limit(limit)
            .map_err(Into::into)
            .map_err(ctx.error())?;
        let filter = read::ledger::list::Filter {
            user_id: my_id.into(),
        };

        ctx.service()
            .execute(query::ledger::List::new(filter, limit))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|entries| entries.into_iter().map(Into::into).collect())
    }

    /// Returns the `LedgerEntry`s posted by settling the `Exchange` with the
    /// specified ID.
    ///
    /// Empty unless the `Exchange` is completed.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `EXCHANGE_NOT_EXISTS` - the `Exchange` with the specified ID does
    ///                           not exist;
    /// - `NOT_EXCHANGE_PARTICIPANT` - the authenticated `User` doesn't
    ///                                participate in the `Exchange`.
    #[tracing::instrument(
        skip_all,
        fields(
            exchange = %exchange,
            gql.name = "settlement",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn settlement(
        exchange: api::exchange::Id,
        ctx: &Context,
    ) -> Result<Vec<api::ledger::Entry>, Error> {
        let exchange = Self::exchange(exchange, ctx).await?;

        ctx.service()
            .execute(query::ledger::BySettlement::by(exchange.id().into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|entries| entries.into_iter().map(Into::into).collect())
    }

    /// Lists `Report`s filed by the authenticated `User`, from the newest to
    /// the oldest.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `INVALID_LIMIT` - the provided `limit` is not positive.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myReports",
            limit = ?limit,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_reports(
        limit: Option<i32>,
        ctx: &Context,
    ) -> Result<Vec<api::Report>, Error> {
        let my_id = ctx.current_session().await?.user_id;
        let limit = api::list_limit(limit)
            .map_err(Into::into)
            .map_err(ctx.error())?;
        let filter = read::report::list::Filter {
            reporter_id: my_id.into(),
        };

        ctx.service()
            .execute(query::reports::List::new(filter, limit))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|reports| reports.into_iter().map(Into::into).collect())
    }
}
