use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::Args;

use kvest_daemon::state::{AppConfig, AppState, StateError, DATA_DIR_NAME};
use kvest_daemon::{spawn_service, ServiceConfig};

#[derive(Args, Debug, Clone)]
pub struct Daemon {
    /// Override API server port (default from config)
    #[arg(long)]
    pub api_port: Option<u16>,

    /// Override the data directory (default from config, or ./data without one)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Chat-bot token; the bot only runs when this is set
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true)]
    pub bot_token: Option<String>,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("state error: {0}")]
    StateError(#[from] StateError),

    #[error("invalid log level in config: {0}")]
    LogLevel(String),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Daemon {
    type Error = DaemonError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        // Without `kvest init` the daemon runs on defaults with ./data
        let (config, data_dir) = match AppState::load(ctx.config_path.clone()) {
            Ok(state) => (state.config, state.data_dir),
            Err(StateError::NotInitialized) => {
                (AppConfig::default(), PathBuf::from(DATA_DIR_NAME))
            }
            Err(e) => return Err(e.into()),
        };

        let log_level = config
            .log_level
            .parse::<tracing::Level>()
            .map_err(|_| DaemonError::LogLevel(config.log_level.clone()))?;
        let api_port = self.api_port.unwrap_or(config.api_port);

        let config = ServiceConfig {
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, api_port)),
            data_dir: self.data_dir.clone().unwrap_or(data_dir),
            master_api_key: ctx.master_api_key.clone(),
            bot_token: self.bot_token.clone().filter(|t| !t.is_empty()),
            log_level,
            log_dir: self.log_dir.clone(),
        };

        spawn_service(&config).await;
        Ok("daemon ended".to_string())
    }
}
