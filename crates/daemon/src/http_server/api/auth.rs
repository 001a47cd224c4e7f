use std::convert::Infallible;

use axum::async_trait;
use axum::extract::FromRequestParts;
use http::request::Parts;
use http::HeaderMap;

use common::prelude::Credential;

use super::error::RequestError;

/// Header carrying a tenant credential.
pub const API_KEY_HEADER: &str = "api-key";
/// Header carrying the administrative secret.
pub const MASTER_API_KEY_HEADER: &str = "master-api-key";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Tenant credential taken from the `API-KEY` header.
///
/// Missing or malformed credentials are rejected here; whether the
/// credential names an existing store is decided by the engine.
#[derive(Debug, Clone)]
pub struct ApiKey(pub Credential);

#[async_trait]
impl<S> FromRequestParts<S> for ApiKey
where
    S: Send + Sync,
{
    type Rejection = RequestError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = header_str(&parts.headers, API_KEY_HEADER).unwrap_or_default();
        Ok(ApiKey(raw.parse()?))
    }
}

/// Administrative secret from the `MASTER-API-KEY` header, if present.
#[derive(Debug, Clone)]
pub struct MasterKey(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for MasterKey
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MasterKey(
            header_str(&parts.headers, MASTER_API_KEY_HEADER).map(str::to_string),
        ))
    }
}
