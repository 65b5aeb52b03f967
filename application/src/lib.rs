//! GraphQL server of the time-bank exchange ledger.
//!
//! Exposes [`Offer`]s, [`Exchange`]s and the ledger of the [`Service`] to
//! authenticated users, and streams their state transitions.
//!
//! [`Exchange`]: service::domain::Exchange
//! [`Offer`]: service::domain::Offer

#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod api;
pub mod args;
pub mod config;
mod context;
pub mod error;

use std::sync::Arc;

use axum::{
    extract::WebSocketUpgrade,
    response::{IntoResponse, Response},
    Extension, Json,
};
use derive_more::Debug;
use juniper::{http::GraphQLBatchResponse, DefaultScalarValue, ScalarValue};
use juniper_axum::{extract::JuniperRequest, subscriptions};
use juniper_graphql_ws::ConnectionConfig;
// Used in binary.
use axum_client_ip as _;
use refinery as _;
use tower_http as _;
use tracing_subscriber as _;

pub use self::{
    args::Args,
    config::Config,
    context::{Context, Session},
    error::{AsError, Error},
};

/// [`Service`] backed by Postgres.
///
/// [`Service`]: service::Service
pub type Service = service::Service<service::infra::Postgres>;

/// WebSocket subprotocols of GraphQL subscriptions, in the order of
/// preference.
const WS_PROTOCOLS: [&str; 2] = ["graphql-transport-ws", "graphql-ws"];

/// Maximum size of an incoming WebSocket message (in bytes).
const WS_MAX_MESSAGE_SIZE: usize = 1024;

/// Maximum number of subscriptions running within a single WebSocket
/// connection.
const WS_MAX_IN_FLIGHT_OPERATIONS: usize = 10;

/// [`juniper`] GraphQL response with an HTTP status code.
#[derive(Debug)]
pub struct JuniperResponse<S = DefaultScalarValue>
where
    S: ScalarValue,
{
    /// [`http::StatusCode`] to respond with if the `response` has errors.
    pub status_code: http::StatusCode,

    /// GraphQL response itself.
    #[debug(skip)]
    pub response: GraphQLBatchResponse<S>,
}

impl<S> IntoResponse for JuniperResponse<S>
where
    S: ScalarValue,
{
    fn into_response(self) -> Response {
        let status_code = if self.response.is_ok() {
            http::StatusCode::OK
        } else {
            self.status_code
        };
        (status_code, Json(self.response)).into_response()
    }
}

/// Handler of GraphQL queries and mutations.
pub async fn graphql(
    Extension(schema): Extension<Arc<api::Schema>>,
    context: Context,
    JuniperRequest(request): JuniperRequest,
) -> JuniperResponse {
    let response = request.execute(&*schema, &context).await;
    JuniperResponse {
        status_code: context.error_status_code(),
        response,
    }
}

/// Handler of GraphQL subscriptions over WebSocket.
///
/// Clients authenticate either with the `Authorization` header of the
/// upgrade request, or with the `authToken` connection parameter.
#[expect(
    clippy::unused_async,
    reason = "`async` is required to match signature"
)]
pub async fn subscriptions(
    Extension(schema): Extension<Arc<api::Schema>>,
    mut context: Context,
    ws: WebSocketUpgrade,
) -> Response {
    ws.protocols(WS_PROTOCOLS)
        .max_message_size(WS_MAX_MESSAGE_SIZE)
        .max_frame_size(WS_MAX_MESSAGE_SIZE)
        .on_upgrade(move |socket| {
            subscriptions::serve_ws(socket, schema, move |vars| async move {
                context.apply_subscription_variables(&vars)?;
                Ok::<_, Error>(
                    ConnectionConfig::new(context)
                        .with_max_in_flight_operations(
                            WS_MAX_IN_FLIGHT_OPERATIONS,
                        ),
                )
            })
        })
}
