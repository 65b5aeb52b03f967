use std::{
    io,
    sync::{Arc, OnceLock},
    time,
};

use application::{api, graphql, subscriptions, Args, Config};
use axum::{
    body::Body,
    extract::MatchedPath,
    routing::{get, on, MethodFilter},
    Extension, Router,
};
use axum_client_ip::InsecureClientIp;
use service::{
    infra::{postgres, Postgres},
    Service,
};
use tokio::net::TcpListener;
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    cors::CorsLayer,
    trace::{DefaultOnRequest, MakeSpan, OnResponse, TraceLayer},
};
use tracing as log;
use tracing_subscriber::{
    filter::filter_fn,
    fmt::MakeWriter,
    layer::{Layer, SubscriberExt as _},
    registry::LookupSpan,
    util::SubscriberInitExt as _,
};

/// Levels written into `stderr` instead of `stdout`.
const STDERR_LEVELS: &[log::Level] = &[log::Level::WARN, log::Level::ERROR];

/// Most verbose level being output, known once the [`Config`] is loaded.
static LOG_LEVEL: OnceLock<log::Level> = OnceLock::new();

postgres::embed_migrations!("../migrations");

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(log_layer(io::stdout, false))
        .with(log_layer(io::stderr, true))
        .init();

    _ = run().await;
}

/// Builds a compact logging layer writing into the provided `writer`.
///
/// Only [`STDERR_LEVELS`] pass when `errors` is `true`, and only the other
/// levels pass otherwise.
fn log_layer<S, W>(writer: W, errors: bool) -> impl Layer<S>
where
    S: log::Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .compact()
        .with_ansi(true)
        .with_thread_names(true)
        .with_writer(writer)
        .with_filter(filter_fn(move |meta| {
            let level = LOG_LEVEL.get().copied().unwrap_or(log::Level::INFO);
            meta.is_span()
                || (STDERR_LEVELS.contains(meta.level()) == errors
                    && level >= *meta.level())
        }))
}

/// Loads the [`Config`], migrates the database and serves the API until the
/// server fails.
///
/// Every failure is logged before being returned.
async fn run() -> Result<(), ()> {
    let Args { config } = Args::parse()
        .map_err(|e| log::error!("invalid command line arguments: {e}"))?;

    let Config {
        postgres,
        service,
        server,
        log,
    } = Config::new(&config)
        .map_err(|e| log::error!("cannot load config from `{config}`: {e}"))?;

    LOG_LEVEL
        .set(log.level.into())
        .unwrap_or_else(|_| unreachable!("`LOG_LEVEL` is set only once"));

    let mut postgres = Postgres::new(&postgres.into())
        .map_err(|e| log::error!("cannot create Postgres pool: {e}"))?;
    let report = migrations::runner()
        .run_async(&mut postgres)
        .await
        .map_err(|e| log::error!("cannot migrate database: {e}"))?;
    log::info!(
        "database migrated, {} migration(s) applied",
        report.applied_migrations().len(),
    );

    let cors = cors_layer(&server.cors.origins)?;
    let app = Router::new()
        .route(
            "/graphql",
            on(MethodFilter::GET.or(MethodFilter::POST), graphql),
        )
        .route("/subscriptions", get(subscriptions))
        .route(
            "/graphiql",
            get(juniper_axum::graphiql("/graphql", "/subscriptions")),
        )
        .layer(Extension(Arc::new(api::Schema::new(
            api::Query,
            api::Mutation,
            api::Subscription,
        ))))
        .layer(Extension(Service::new(service.into(), postgres)))
        .layer(cors)
        .layer(trace_layer());

    let addr = format!("{}:{}", server.host, server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| log::error!("cannot listen on `{addr}`: {e}"))?;
    log::info!("serving GraphQL API on `{addr}`");

    axum::serve(listener, app)
        .await
        .map_err(|e| log::error!("server stopped: {e}"))
}

/// Builds a [`CorsLayer`] allowing the provided `origins` to query the API.
fn cors_layer(origins: &[String]) -> Result<CorsLayer, ()> {
    origins.iter().try_fold(
        CorsLayer::new()
            .allow_methods([
                http::Method::GET,
                http::Method::OPTIONS,
                http::Method::POST,
            ])
            .allow_headers([
                http::header::AUTHORIZATION,
                http::header::CONTENT_TYPE,
            ]),
        |cors, origin| {
            let origin = origin.parse::<http::HeaderValue>().map_err(|e| {
                log::error!("invalid CORS origin `{origin}`: {e}");
            })?;
            Ok(cors.allow_origin(origin))
        },
    )
}

/// Builds a [`TraceLayer`] opening a span per HTTP request and logging its
/// outcome.
fn trace_layer() -> TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    impl MakeSpan<Body> + Clone,
    DefaultOnRequest,
    impl OnResponse<Body> + Clone,
> {
    TraceLayer::new_for_http()
        .make_span_with(|r: &http::Request<Body>| {
            let headers = r.headers();
            log::info_span!(
                "HTTP request",
                http.client_ip =
                    InsecureClientIp::from(headers, r.extensions())
                        .map(|ip| ip.0.to_string())
                        .ok(),
                http.flavor = ?r.version(),
                http.method = r.method().as_str(),
                http.route = r
                    .extensions()
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str),
                http.target = r
                    .uri()
                    .path_and_query()
                    .map(http::uri::PathAndQuery::as_str),
                http.user_agent = headers
                    .get(http::header::USER_AGENT)
                    .and_then(|h| h.to_str().ok()),
                http.status_code = log::field::Empty,
            )
        })
        .on_response(
            |r: &http::Response<Body>,
             took: time::Duration,
             span: &log::Span| {
                let status = r.status();
                _ = span.record("http.status_code", status.as_u16());
                let took = format!("{}ms", took.as_millis());
                if status.is_client_error() || status.is_server_error() {
                    log::warn!(duration = %took, "request failed");
                } else {
                    log::info!(duration = %took, "request served");
                }
            },
        )
}
