//! Credential to store-file routing.
//!
//! Every tenant store lives at `{data_dir}/{credential}.db`. The router never
//! hands out long-lived handles: callers take a [`StoreLease`], open the store,
//! run one transaction and drop everything before returning.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{ArcMutexGuard, Mutex, RawMutex};
use redb::Database;

use crate::credential::{owner_prefix, Credential};
use crate::error::KvError;

pub const STORE_EXTENSION: &str = "db";

#[derive(Debug)]
pub struct StoreRouter {
    data_dir: PathBuf,
    // one slot per store currently leased; removed again by the last holder
    leases: Mutex<HashMap<Credential, Arc<Mutex<()>>>>,
}

impl StoreRouter {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            leases: Mutex::new(HashMap::new()),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Deterministic store path for a credential. Does not touch the filesystem.
    pub fn path_for(&self, credential: &Credential) -> PathBuf {
        self.data_dir
            .join(format!("{}.{}", credential.as_str(), STORE_EXTENSION))
    }

    /// Resolve a credential to its store path if that store exists.
    pub fn resolve(&self, credential: &Credential) -> Result<PathBuf, KvError> {
        let path = self.path_for(credential);
        if path.is_file() {
            Ok(path)
        } else {
            Err(KvError::UnknownCredential)
        }
    }

    /// Take exclusive use of a tenant's store for the duration of one operation.
    ///
    /// Existence is checked after the lock is held, so a caller that queued
    /// behind a rotation sees the old credential as unknown.
    pub fn lease(&self, credential: &Credential) -> Result<StoreLease<'_>, KvError> {
        let slot = self
            .leases
            .lock()
            .entry(credential.clone())
            .or_default()
            .clone();
        let guard = slot.lock_arc();
        // the guard holds its own clone; `release` counts on it being the last
        drop(slot);

        let mut lease = StoreLease {
            router: self,
            credential: credential.clone(),
            path: PathBuf::new(),
            guard: Some(guard),
        };
        lease.path = self.resolve(credential)?;
        Ok(lease)
    }

    /// Create a fresh, empty store for a newly issued credential.
    pub fn initialize(&self, credential: &Credential) -> Result<PathBuf, KvError> {
        fs::create_dir_all(&self.data_dir)?;
        let path = self.path_for(credential);
        if path.exists() {
            return Err(KvError::Conflict(credential.to_string()));
        }
        let db = Database::create(&path)?;
        drop(db);
        tracing::debug!(path = %path.display(), "initialized store");
        Ok(path)
    }

    /// Find the store owned by a numeric owner id (`{owner}-{hex}.db`).
    pub fn find_owned(&self, owner: i64) -> Result<Option<Credential>, KvError> {
        let prefix = owner_prefix(owner);
        let entries = match fs::read_dir(&self.data_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            let Some(stem) = name
                .strip_suffix(STORE_EXTENSION)
                .and_then(|s| s.strip_suffix('.'))
            else {
                continue;
            };
            if !stem.starts_with(&prefix) {
                continue;
            }
            if let Ok(credential) = stem.parse::<Credential>() {
                return Ok(Some(credential));
            }
        }
        Ok(None)
    }

    fn release(&self, credential: &Credential) {
        let mut leases = self.leases.lock();
        if let Some(slot) = leases.get(credential) {
            if Arc::strong_count(slot) == 1 {
                leases.remove(credential);
            }
        }
    }

    #[cfg(test)]
    fn leased_slots(&self) -> usize {
        self.leases.lock().len()
    }
}

/// Exclusive, scoped access to one tenant store.
pub struct StoreLease<'a> {
    router: &'a StoreRouter,
    credential: Credential,
    path: PathBuf,
    guard: Option<ArcMutexGuard<RawMutex, ()>>,
}

impl StoreLease<'_> {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the leased store. Never creates a missing file.
    pub fn open(&self) -> Result<Database, KvError> {
        Ok(Database::open(&self.path)?)
    }
}

impl Drop for StoreLease<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.router.release(&self.credential);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_unknown() {
        let dir = TempDir::new().unwrap();
        let router = StoreRouter::new(dir.path());
        let cred = Credential::generate().unwrap();
        assert!(matches!(
            router.resolve(&cred),
            Err(KvError::UnknownCredential)
        ));
        assert!(router.lease(&cred).is_err());
        assert_eq!(router.leased_slots(), 0);
    }

    #[test]
    fn test_failed_leases_leave_no_slots() {
        let dir = TempDir::new().unwrap();
        let router = StoreRouter::new(dir.path());
        for _ in 0..100 {
            let cred = Credential::generate().unwrap();
            assert!(matches!(
                router.lease(&cred),
                Err(KvError::UnknownCredential)
            ));
        }
        assert_eq!(router.leased_slots(), 0);
    }

    #[test]
    fn test_initialize_then_resolve() {
        let dir = TempDir::new().unwrap();
        let router = StoreRouter::new(dir.path().join("data"));
        let cred = Credential::generate().unwrap();

        let path = router.initialize(&cred).unwrap();
        assert_eq!(router.resolve(&cred).unwrap(), path);
        assert!(path.ends_with(format!("{}.db", cred)));

        // a second initialize must not clobber the store
        assert!(matches!(
            router.initialize(&cred),
            Err(KvError::Conflict(_))
        ));
    }

    #[test]
    fn test_lease_opens_and_releases() {
        let dir = TempDir::new().unwrap();
        let router = StoreRouter::new(dir.path());
        let cred = Credential::generate().unwrap();
        router.initialize(&cred).unwrap();

        {
            let lease = router.lease(&cred).unwrap();
            let db = lease.open().unwrap();
            drop(db);
            assert_eq!(router.leased_slots(), 1);
        }
        assert_eq!(router.leased_slots(), 0);
    }

    #[test]
    fn test_lease_rechecks_after_rename() {
        let dir = TempDir::new().unwrap();
        let router = StoreRouter::new(dir.path());
        let old = Credential::generate().unwrap();
        let new = Credential::generate().unwrap();
        router.initialize(&old).unwrap();

        fs::rename(router.path_for(&old), router.path_for(&new)).unwrap();
        assert!(matches!(
            router.lease(&old),
            Err(KvError::UnknownCredential)
        ));
        // the old path must not have been recreated
        assert!(!router.path_for(&old).exists());
        assert!(router.lease(&new).is_ok());
        assert_eq!(router.leased_slots(), 0);
    }

    #[test]
    fn test_find_owned() {
        let dir = TempDir::new().unwrap();
        let router = StoreRouter::new(dir.path());
        assert!(router.find_owned(12).unwrap().is_none());

        let cred = Credential::generate_owned(123).unwrap();
        router.initialize(&cred).unwrap();

        assert_eq!(router.find_owned(123).unwrap(), Some(cred));
        // 12 is a prefix of 123 but not of "123-"
        assert!(router.find_owned(12).unwrap().is_none());
    }
}
