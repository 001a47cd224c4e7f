use axum::extract::{Json, State};
use axum::routing::put;
use axum::Router;
use bytes::Bytes;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use common::prelude::{KvError, TenantProvisioner};

use super::auth::MasterKey;
use super::client::{endpoint, ApiError, ApiRequest};
use super::error::RequestError;
use crate::ServiceState;

/// Admin routes, all authenticated by `MASTER-API-KEY`.
pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/create_kv", put(create_kv))
        .route("/change_api_key", put(change_api_key))
        .with_state(state)
}

/// Body of both admin operations.
#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct TenantRequest {
    /// Tenant display name
    #[arg(long)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyResponse {
    pub api_key: String,
}

fn parse_body(body: &[u8]) -> Result<TenantRequest, RequestError> {
    serde_json::from_slice(body)
        .map_err(|e| RequestError::from(KvError::InvalidInput(format!("malformed body: {}", e))))
}

pub async fn create_kv(
    State(state): State<ServiceState>,
    MasterKey(secret): MasterKey,
    body: Bytes,
) -> Result<Json<ApiKeyResponse>, RequestError> {
    // a bad secret is a 401 even when the body is garbage
    state.kvest().authorize_admin(secret.as_deref())?;
    let req = parse_body(&body)?;

    let credential = state
        .run(move |kv| kv.create_tenant(secret.as_deref(), &req.name))
        .await?;
    Ok(Json(ApiKeyResponse {
        api_key: credential.to_string(),
    }))
}

pub async fn change_api_key(
    State(state): State<ServiceState>,
    MasterKey(secret): MasterKey,
    body: Bytes,
) -> Result<Json<ApiKeyResponse>, RequestError> {
    state.kvest().authorize_admin(secret.as_deref())?;
    let req = parse_body(&body)?;

    let credential = state
        .run(move |kv| kv.rotate_credential(secret.as_deref(), &req.name))
        .await?;
    Ok(Json(ApiKeyResponse {
        api_key: credential.to_string(),
    }))
}

/// Client side of `PUT /admin/create_kv`.
#[derive(Debug, Clone, clap::Args)]
pub struct CreateKvRequest {
    #[command(flatten)]
    pub tenant: TenantRequest,
}

impl ApiRequest for CreateKvRequest {
    type Response = ApiKeyResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let url = endpoint(base_url, &["admin", "create_kv"])?;
        Ok(client.put(url).json(&self.tenant))
    }
}

/// Client side of `PUT /admin/change_api_key`.
#[derive(Debug, Clone, clap::Args)]
pub struct ChangeApiKeyRequest {
    #[command(flatten)]
    pub tenant: TenantRequest,
}

impl ApiRequest for ChangeApiKeyRequest {
    type Response = ApiKeyResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let url = endpoint(base_url, &["admin", "change_api_key"])?;
        Ok(client.put(url).json(&self.tenant))
    }
}
