use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use http::{header, StatusCode};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use common::prelude::KvService;

use super::auth::ApiKey;
use super::client::{endpoint, ApiError, ApiRequest};
use super::error::RequestError;
use crate::ServiceState;

pub async fn set(
    State(state): State<ServiceState>,
    ApiKey(credential): ApiKey,
    Path((bucket, key)): Path<(String, String)>,
    body: Bytes,
) -> Result<StatusCode, RequestError> {
    state
        .run(move |kv| kv.set_entry(&credential, &bucket, &key, &body))
        .await?;
    Ok(StatusCode::OK)
}

/// Returns the stored document as-is.
pub async fn get(
    State(state): State<ServiceState>,
    ApiKey(credential): ApiKey,
    Path((bucket, key)): Path<(String, String)>,
) -> Result<Response, RequestError> {
    let value = state
        .run(move |kv| kv.get_entry(&credential, &bucket, &key))
        .await?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        value,
    )
        .into_response())
}

pub async fn delete(
    State(state): State<ServiceState>,
    ApiKey(credential): ApiKey,
    Path((bucket, key)): Path<(String, String)>,
) -> Result<StatusCode, RequestError> {
    state
        .run(move |kv| kv.delete_entry(&credential, &bucket, &key))
        .await?;
    Ok(StatusCode::OK)
}

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct SetEntryRequest {
    /// Bucket to write into (must exist)
    #[arg(long)]
    pub bucket: String,
    /// Key to write
    #[arg(long)]
    pub key: String,
    /// JSON object to store, e.g. '{"name":"test"}'
    #[arg(long)]
    pub value: String,
}

impl ApiRequest for SetEntryRequest {
    type Response = ();

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let url = endpoint(base_url, &[&self.bucket, &self.key])?;
        Ok(client.put(url).body(self.value))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct GetEntryRequest {
    /// Bucket to read from
    #[arg(long)]
    pub bucket: String,
    /// Key to read
    #[arg(long)]
    pub key: String,
}

impl ApiRequest for GetEntryRequest {
    type Response = serde_json::Value;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        Ok(client.get(endpoint(base_url, &[&self.bucket, &self.key])?))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct DeleteEntryRequest {
    /// Bucket to delete from
    #[arg(long)]
    pub bucket: String,
    /// Key to delete; deleting a missing key succeeds
    #[arg(long)]
    pub key: String,
}

impl ApiRequest for DeleteEntryRequest {
    type Response = ();

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        Ok(client.delete(endpoint(base_url, &[&self.bucket, &self.key])?))
    }
}
