use axum::extract::DefaultBodyLimit;
use axum::Router;
use http::HeaderName;
use tokio::sync::watch;
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;
use tower_http::trace::{DefaultOnFailure, DefaultOnResponse};
use tower_http::LatencyUnit;

pub mod api;
mod config;
mod handlers;
mod health;

pub use config::Config;

use crate::ServiceState;

const ADMIN_PREFIX: &str = "/admin";
const STATUS_PREFIX: &str = "/_status";

/// Maximum request body size in bytes (16 MB); values are single JSON documents
pub const MAX_BODY_SIZE_BYTES: usize = 16 * 1024 * 1024;

/// Build the full route tree: status probes, admin provisioning, tenant data.
///
/// Exposed separately from [`run_api`] so it can be driven without a socket.
pub fn router(state: ServiceState) -> Router {
    Router::new()
        .nest(STATUS_PREFIX, health::router(state.clone()))
        .nest(ADMIN_PREFIX, api::admin::router(state.clone()))
        .merge(api::router(state.clone()))
        .fallback(handlers::not_found_handler)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE_BYTES))
        .with_state(state)
}

/// Run the HTTP API server until the shutdown watch fires.
pub async fn run_api(
    config: Config,
    state: ServiceState,
    mut shutdown_rx: watch::Receiver<()>,
) -> Result<(), HttpServerError> {
    let listen_addr = config.listen_addr;
    let log_level = config.log_level;
    let trace_layer = TraceLayer::new_for_http()
        .on_response(
            DefaultOnResponse::new()
                .include_headers(false)
                .level(log_level)
                .latency_unit(LatencyUnit::Micros),
        )
        .on_failure(DefaultOnFailure::new().latency_unit(LatencyUnit::Micros));

    // credentials never reach the request log
    let sensitive = SetSensitiveRequestHeadersLayer::new([
        HeaderName::from_static(api::auth::API_KEY_HEADER),
        HeaderName::from_static(api::auth::MASTER_API_KEY_HEADER),
    ]);

    let router = router(state)
        .layer(trace_layer)
        .layer(sensitive);

    tracing::info!(addr = ?listen_addr, "API server listening");
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
        })
        .await?;

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    #[error("an error occurred running the HTTP server: {0}")]
    ServingFailed(#[from] std::io::Error),
}
