use axum::extract::{Json, Path, State};
use http::StatusCode;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use common::prelude::KvService;

use super::auth::ApiKey;
use super::client::{endpoint, ApiError, ApiRequest};
use super::error::RequestError;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketsResponse {
    pub buckets: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeysResponse {
    pub keys: Vec<String>,
}

pub async fn create(
    State(state): State<ServiceState>,
    ApiKey(credential): ApiKey,
    Path(bucket): Path<String>,
) -> Result<StatusCode, RequestError> {
    state
        .run(move |kv| kv.create_bucket(&credential, &bucket))
        .await?;
    Ok(StatusCode::OK)
}

pub async fn delete(
    State(state): State<ServiceState>,
    ApiKey(credential): ApiKey,
    Path(bucket): Path<String>,
) -> Result<StatusCode, RequestError> {
    state
        .run(move |kv| kv.delete_bucket(&credential, &bucket))
        .await?;
    Ok(StatusCode::OK)
}

/// Serves `GET|POST /buckets` and `HEAD /{bucket}`; the path is ignored.
pub async fn list(
    State(state): State<ServiceState>,
    ApiKey(credential): ApiKey,
) -> Result<Json<BucketsResponse>, RequestError> {
    let buckets = state.run(move |kv| kv.list_buckets(&credential)).await?;
    Ok(Json(BucketsResponse { buckets }))
}

pub async fn list_keys(
    State(state): State<ServiceState>,
    ApiKey(credential): ApiKey,
    Path(bucket): Path<String>,
) -> Result<Json<KeysResponse>, RequestError> {
    let keys = state
        .run(move |kv| kv.list_keys(&credential, &bucket))
        .await?;
    Ok(Json(KeysResponse { keys }))
}

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct CreateBucketRequest {
    /// Name of the bucket to create
    #[arg(long)]
    pub bucket: String,
}

impl ApiRequest for CreateBucketRequest {
    type Response = ();

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        Ok(client.put(endpoint(base_url, &[&self.bucket])?))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct DeleteBucketRequest {
    /// Name of the bucket to delete, with all of its entries
    #[arg(long)]
    pub bucket: String,
}

impl ApiRequest for DeleteBucketRequest {
    type Response = ();

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        Ok(client.delete(endpoint(base_url, &[&self.bucket])?))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct ListBucketsRequest;

impl ApiRequest for ListBucketsRequest {
    type Response = BucketsResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        Ok(client.get(endpoint(base_url, &["buckets"])?))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct ListKeysRequest {
    /// Bucket whose keys to list
    #[arg(long)]
    pub bucket: String,
}

impl ApiRequest for ListKeysRequest {
    type Response = KeysResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        Ok(client.get(endpoint(base_url, &[&self.bucket])?))
    }
}
