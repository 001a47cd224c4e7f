use clap::Args;

use kvest_daemon::http_server::api::client::ApiError;

#[derive(Args, Debug, Clone)]
pub struct Version {
    /// Also ask the daemon at --remote for its version
    #[arg(long)]
    pub daemon: bool,
}

#[derive(Debug, serde::Deserialize)]
struct VersionResponse {
    version: String,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Version {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let local = format!("kvest {}", common::version());
        if !self.daemon {
            return Ok(local);
        }

        let url = ctx.client.base_url().join("_status/version")?;
        let response: VersionResponse = reqwest::get(url).await?.error_for_status()?.json().await?;
        Ok(format!("{}\ndaemon {}", local, response.version))
    }
}
