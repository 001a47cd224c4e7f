use std::sync::Arc;

use common::prelude::{KvError, Kvest};

use crate::service_config::Config;

/// Main service state, shared by the HTTP API and the bot
#[derive(Clone, Debug)]
pub struct State {
    kvest: Arc<Kvest>,
}

impl State {
    pub fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        tracing::info!(data_dir = %config.data_dir.display(), "opening data directory");
        let kvest = Kvest::open(&config.data_dir, config.master_api_key.clone())?;
        Ok(Self::new(Arc::new(kvest)))
    }

    pub fn new(kvest: Arc<Kvest>) -> Self {
        Self { kvest }
    }

    pub fn kvest(&self) -> &Arc<Kvest> {
        &self.kvest
    }

    /// Run a store operation on the blocking pool.
    ///
    /// The engine does synchronous file I/O; keep it off the async workers.
    pub async fn run<T, F>(&self, op: F) -> Result<T, KvError>
    where
        T: Send + 'static,
        F: FnOnce(&Kvest) -> Result<T, KvError> + Send + 'static,
    {
        let kvest = self.kvest.clone();
        tokio::task::spawn_blocking(move || op(&kvest))
            .await
            .map_err(|e| KvError::Io(std::io::Error::other(e)))?
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("failed to open data directory: {0}")]
    Engine(#[from] KvError),
}
