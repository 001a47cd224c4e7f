pub use clap::Parser;

use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "kvest")]
#[command(about = "Multi-tenant JSON key-value store")]
#[command(version)]
pub struct Args {
    /// API server to talk to (defaults to localhost on the configured port)
    #[arg(long, global = true)]
    pub remote: Option<Url>,

    /// Tenant credential for bucket and entry commands
    #[arg(long, global = true, env = "KVEST_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Administrative secret for provisioning, and for a daemon started here
    #[arg(long, global = true, env = "MASTER_API_KEY", hide_env_values = true)]
    pub master_api_key: Option<String>,

    /// Path to the kvest config directory (defaults to ~/.kvest)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: crate::Command,
}
