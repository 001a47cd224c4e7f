use std::fmt::Debug;
use std::ops::Deref;
use std::path::PathBuf;
use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use http::request::Parts;

use crate::ServiceState;

#[async_trait]
pub trait DataSource {
    /// Perform various checks on the system to ensure its healthy and ready to accept requests.
    async fn is_ready(&self) -> Result<(), DataSourceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DataSourceError {
    #[error("one or more dependent services aren't available")]
    DependencyFailure,
}

pub type DynDataSource = Arc<dyn DataSource + Send + Sync>;

pub struct StateDataSource(DynDataSource);

impl Debug for StateDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateDataSource").finish()
    }
}

impl StateDataSource {
    #[cfg(test)]
    pub fn new(dds: DynDataSource) -> Self {
        Self(dds)
    }
}

impl Deref for StateDataSource {
    type Target = DynDataSource;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Ready while the data directory is present; every store lives under it.
struct DataDirSource {
    data_dir: PathBuf,
}

#[async_trait]
impl DataSource for DataDirSource {
    async fn is_ready(&self) -> Result<(), DataSourceError> {
        match tokio::fs::metadata(&self.data_dir).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => {
                tracing::warn!(path = %self.data_dir.display(), "data path is not a directory");
                Err(DataSourceError::DependencyFailure)
            }
            Err(e) => {
                tracing::warn!(path = %self.data_dir.display(), error = %e, "data directory unavailable");
                Err(DataSourceError::DependencyFailure)
            }
        }
    }
}

#[async_trait]
impl FromRequestParts<ServiceState> for StateDataSource {
    type Rejection = ();

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &ServiceState,
    ) -> Result<Self, Self::Rejection> {
        Ok(StateDataSource(Arc::new(DataDirSource {
            data_dir: state.kvest().data_dir().to_path_buf(),
        })))
    }
}
