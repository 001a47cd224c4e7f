use clap::{Args, Subcommand};

use kvest_daemon::http_server::api::admin::{ChangeApiKeyRequest, CreateKvRequest};
use kvest_daemon::http_server::api::client::ApiError;

use crate::cli::op::{Op, OpContext};

crate::command_enum! {
    (CreateKv, CreateKvRequest),
    (ChangeApiKey, ChangeApiKeyRequest),
}

pub type AdminCommand = Command;

/// Tenant provisioning; requires --master-api-key or MASTER_API_KEY
#[derive(Args, Debug, Clone)]
pub struct Admin {
    #[command(subcommand)]
    pub command: AdminCommand,
}

#[async_trait::async_trait]
impl Op for Admin {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}

#[async_trait::async_trait]
impl Op for CreateKvRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let response = ctx.client.call(self.clone()).await?;
        Ok(format!("Your API key is: {}", response.api_key))
    }
}

#[async_trait::async_trait]
impl Op for ChangeApiKeyRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let response = ctx.client.call(self.clone()).await?;
        Ok(format!("Your new API key is: {}", response.api_key))
    }
}
