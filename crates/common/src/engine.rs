use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use redb::Database;

use crate::buckets;
use crate::credential::Credential;
use crate::error::KvError;
use crate::namespace::check_bucket;
use crate::provision::AdminKey;
use crate::registry::Registry;
use crate::router::StoreRouter;
use crate::service::KvService;
use crate::value::canonicalize;

/// Handle on a data directory of tenant stores plus the tenant registry.
///
/// Cheap to share behind an `Arc`; it holds no open files between calls.
#[derive(Debug)]
pub struct Kvest {
    pub(crate) router: StoreRouter,
    pub(crate) registry: Registry,
    pub(crate) admin_key: Option<AdminKey>,
    // serializes owner-scoped provisioning, which has no registry to lock
    pub(crate) owners: Mutex<()>,
}

impl Kvest {
    /// Open (creating if needed) the data directory at `data_dir`.
    ///
    /// Without an admin key every admin operation fails closed.
    pub fn open(data_dir: impl Into<PathBuf>, admin_key: Option<String>) -> Result<Self, KvError> {
        let data_dir = data_dir.into();
        if !data_dir.exists() {
            tracing::info!(path = %data_dir.display(), "creating data directory");
        }
        fs::create_dir_all(&data_dir)?;

        let admin_key = admin_key.filter(|k| !k.is_empty()).map(AdminKey::new);
        if admin_key.is_none() {
            tracing::warn!("no admin key configured, provisioning is disabled");
        }

        Ok(Self {
            registry: Registry::new(&data_dir),
            router: StoreRouter::new(data_dir),
            admin_key,
            owners: Mutex::new(()),
        })
    }

    pub fn data_dir(&self) -> &Path {
        self.router.data_dir()
    }

    pub fn router(&self) -> &StoreRouter {
        &self.router
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Run `op` against the tenant's store: lease, open, one transaction, close.
    fn with_store<T>(
        &self,
        credential: &Credential,
        op: impl FnOnce(&Database) -> Result<T, KvError>,
    ) -> Result<T, KvError> {
        let lease = self.router.lease(credential)?;
        let db = lease.open()?;
        let result = op(&db);
        drop(db);
        drop(lease);
        result
    }
}

impl KvService for Kvest {
    fn create_bucket(&self, credential: &Credential, bucket: &str) -> Result<(), KvError> {
        check_bucket(bucket)?;
        self.with_store(credential, |db| buckets::create_bucket(db, bucket))?;
        tracing::debug!(bucket, "bucket created");
        Ok(())
    }

    fn delete_bucket(&self, credential: &Credential, bucket: &str) -> Result<(), KvError> {
        check_bucket(bucket)?;
        self.with_store(credential, |db| buckets::delete_bucket(db, bucket))?;
        tracing::debug!(bucket, "bucket deleted");
        Ok(())
    }

    fn list_buckets(&self, credential: &Credential) -> Result<Vec<String>, KvError> {
        self.with_store(credential, buckets::list_buckets)
    }

    fn set_entry(
        &self,
        credential: &Credential,
        bucket: &str,
        key: &str,
        value: &[u8],
    ) -> Result<(), KvError> {
        check_bucket(bucket)?;
        let canonical = canonicalize(value)?;
        self.with_store(credential, |db| {
            buckets::set_entry(db, bucket, key, &canonical)
        })
    }

    fn get_entry(
        &self,
        credential: &Credential,
        bucket: &str,
        key: &str,
    ) -> Result<Vec<u8>, KvError> {
        check_bucket(bucket)?;
        self.with_store(credential, |db| buckets::get_entry(db, bucket, key))
    }

    fn delete_entry(
        &self,
        credential: &Credential,
        bucket: &str,
        key: &str,
    ) -> Result<(), KvError> {
        check_bucket(bucket)?;
        self.with_store(credential, |db| buckets::delete_entry(db, bucket, key))
    }

    fn list_keys(&self, credential: &Credential, bucket: &str) -> Result<Vec<String>, KvError> {
        check_bucket(bucket)?;
        self.with_store(credential, |db| buckets::list_keys(db, bucket))
    }
}
