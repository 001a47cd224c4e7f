use clap::{Args, Subcommand};

use kvest_daemon::http_server::api::buckets::{
    CreateBucketRequest, DeleteBucketRequest, ListBucketsRequest, ListKeysRequest,
};
use kvest_daemon::http_server::api::client::ApiError;

use crate::cli::op::{Op, OpContext};

crate::command_enum! {
    (Create, CreateBucketRequest),
    (Delete, DeleteBucketRequest),
    (List, ListBucketsRequest),
    (Keys, ListKeysRequest),
}

// Rename the generated Command to BucketCommand for clarity
pub type BucketCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Bucket {
    #[command(subcommand)]
    pub command: BucketCommand,
}

#[async_trait::async_trait]
impl Op for Bucket {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}

#[async_trait::async_trait]
impl Op for CreateBucketRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        ctx.client.call(self.clone()).await?;
        Ok(format!("Created bucket '{}'", self.bucket))
    }
}

#[async_trait::async_trait]
impl Op for DeleteBucketRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        ctx.client.call(self.clone()).await?;
        Ok(format!("Deleted bucket '{}'", self.bucket))
    }
}

#[async_trait::async_trait]
impl Op for ListBucketsRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let response = ctx.client.call(self.clone()).await?;
        if response.buckets.is_empty() {
            return Ok("No buckets found".to_string());
        }
        Ok(response.buckets.join("\n"))
    }
}

#[async_trait::async_trait]
impl Op for ListKeysRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let response = ctx.client.call(self.clone()).await?;
        if response.keys.is_empty() {
            return Ok(format!("Bucket '{}' is empty", self.bucket));
        }
        Ok(response.keys.join("\n"))
    }
}
