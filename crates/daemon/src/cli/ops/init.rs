use std::path::PathBuf;

use clap::Args;

use kvest_daemon::state::{AppConfig, AppState, StateError};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Port for the HTTP API
    #[arg(long, default_value_t = 8080)]
    pub api_port: u16,

    /// Data directory for tenant stores (defaults to <config dir>/data)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = StateError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = AppConfig {
            api_port: self.api_port,
            data_dir: self.data_dir.clone(),
            ..Default::default()
        };
        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        Ok(format!(
            "Initialized kvest at {}\n  config: {}\n  data:   {}",
            state.kvest_dir.display(),
            state.config_path.display(),
            state.data_dir.display()
        ))
    }
}
