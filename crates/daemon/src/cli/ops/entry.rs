use clap::{Args, Subcommand};

use kvest_daemon::http_server::api::client::ApiError;
use kvest_daemon::http_server::api::entries::{
    DeleteEntryRequest, GetEntryRequest, SetEntryRequest,
};

use crate::cli::op::{Op, OpContext};

crate::command_enum! {
    (Set, SetEntryRequest),
    (Get, GetEntryRequest),
    (Delete, DeleteEntryRequest),
}

pub type EntryCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Entry {
    #[command(subcommand)]
    pub command: EntryCommand,
}

#[async_trait::async_trait]
impl Op for Entry {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}

#[async_trait::async_trait]
impl Op for SetEntryRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        ctx.client.call(self.clone()).await?;
        Ok(format!("Set {}/{}", self.bucket, self.key))
    }
}

#[async_trait::async_trait]
impl Op for GetEntryRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let value = ctx.client.call(self.clone()).await?;
        Ok(serde_json::to_string_pretty(&value)?)
    }
}

#[async_trait::async_trait]
impl Op for DeleteEntryRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        ctx.client.call(self.clone()).await?;
        Ok(format!("Deleted {}/{}", self.bucket, self.key))
    }
}
