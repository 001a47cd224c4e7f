use axum::extract::{RawPathParams, Request};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use common::namespace::is_reserved;
use common::prelude::KvError;

pub mod admin;
pub mod auth;
pub mod buckets;
pub mod client;
pub mod entries;
pub mod error;

pub use error::RequestError;

use crate::ServiceState;

/// Tenant data routes, all authenticated by `API-KEY`.
pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/buckets", get(buckets::list).post(buckets::list))
        .route(
            "/:bucket",
            get(buckets::list_keys)
                .head(buckets::list)
                .put(buckets::create)
                .delete(buckets::delete),
        )
        .route(
            "/:bucket/:key",
            get(entries::get).put(entries::set).delete(entries::delete),
        )
        .route_layer(middleware::from_fn(reject_reserved))
        .with_state(state)
}

/// Refuse any verb on the reserved bucket before credentials are looked at.
///
/// Reads the matched, percent-decoded `:bucket` capture so encoded spellings
/// of the reserved name are caught too.
async fn reject_reserved(params: RawPathParams, request: Request, next: Next) -> Response {
    let reserved = params
        .iter()
        .find(|(name, value)| *name == "bucket" && is_reserved(value))
        .map(|(_, value)| value.to_string());

    if let Some(bucket) = reserved {
        tracing::debug!(%bucket, method = %request.method(), "reserved bucket access refused");
        return RequestError::from(KvError::ReservedBucket(bucket)).into_response();
    }

    next.run(request).await
}
