use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    // http server configuration
    /// address for the HTTP API to listen on
    pub listen_addr: SocketAddr,

    // data store configuration
    /// directory holding one store file per tenant plus the registry
    pub data_dir: PathBuf,

    // credentials
    /// administrative secret for provisioning and rotation,
    ///  if not set then admin routes always answer 401
    pub master_api_key: Option<String>,
    /// chat-bot token, the bot only runs when this is set
    pub bot_token: Option<String>,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}
