use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, MutexGuard};
use redb::{Database, ReadableTable, TableDefinition, TableError, WriteTransaction};

use crate::credential::Credential;
use crate::error::KvError;

pub const REGISTRY_FILE_NAME: &str = "users.db";

/// Table definition for the tenant registry.
/// Key: tenant display name, Value: current credential
const USERS_TABLE: TableDefinition<&str, &str> = TableDefinition::new("users");

/// Well-known store mapping tenant names to their current credential.
///
/// Only provisioning and rotation touch the registry. All access is
/// serialized through one process-wide lock, and the file is reopened for
/// every session like tenant stores are.
#[derive(Debug)]
pub struct Registry {
    path: PathBuf,
    lock: Mutex<()>,
}

impl Registry {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(REGISTRY_FILE_NAME),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<Database, KvError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Database::create(&self.path)?)
    }

    /// Current credential for `name`, if the tenant exists.
    pub fn lookup(&self, name: &str) -> Result<Option<Credential>, KvError> {
        let _guard = self.lock.lock();
        let db = self.open()?;
        let txn = db.begin_read()?;
        let table = match txn.open_table(USERS_TABLE) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let value = table.get(name)?.map(|v| v.value().to_string());
        value.map(parse_stored).transpose().map(Option::flatten)
    }

    /// Begin an exclusive read-write session on the registry.
    ///
    /// Nothing is persisted until [`RegistrySession::commit`]; dropping the
    /// session aborts it.
    pub fn begin(&self) -> Result<RegistrySession<'_>, KvError> {
        let guard = self.lock.lock();
        let db = self.open()?;
        let txn = db.begin_write()?;
        Ok(RegistrySession {
            txn,
            _db: db,
            _guard: guard,
        })
    }
}

// Empty values are treated as "no tenant" so a blanked entry can be re-provisioned.
fn parse_stored(raw: String) -> Result<Option<Credential>, KvError> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse().map(Some).map_err(|_| {
        KvError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "registry holds a malformed credential",
        ))
    })
}

pub struct RegistrySession<'a> {
    // field order matters: the transaction must go before the database and lock
    txn: WriteTransaction,
    _db: Database,
    _guard: MutexGuard<'a, ()>,
}

impl RegistrySession<'_> {
    pub fn get(&self, name: &str) -> Result<Option<Credential>, KvError> {
        let table = self.txn.open_table(USERS_TABLE)?;
        let value = table.get(name)?.map(|v| v.value().to_string());
        value.map(parse_stored).transpose().map(Option::flatten)
    }

    pub fn put(&self, name: &str, credential: &Credential) -> Result<(), KvError> {
        let mut table = self.txn.open_table(USERS_TABLE)?;
        table.insert(name, credential.as_str())?;
        Ok(())
    }

    pub fn commit(self) -> Result<(), KvError> {
        self.txn.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lookup_on_fresh_registry() {
        let dir = TempDir::new().unwrap();
        let registry = Registry::new(dir.path());
        assert!(registry.lookup("alice").unwrap().is_none());
    }

    #[test]
    fn test_commit_persists() {
        let dir = TempDir::new().unwrap();
        let registry = Registry::new(dir.path());
        let cred = Credential::generate().unwrap();

        let session = registry.begin().unwrap();
        session.put("alice", &cred).unwrap();
        assert_eq!(session.get("alice").unwrap(), Some(cred.clone()));
        session.commit().unwrap();

        assert_eq!(registry.lookup("alice").unwrap(), Some(cred));
    }

    #[test]
    fn test_drop_aborts() {
        let dir = TempDir::new().unwrap();
        let registry = Registry::new(dir.path());
        let cred = Credential::generate().unwrap();

        {
            let session = registry.begin().unwrap();
            session.put("bob", &cred).unwrap();
        }

        assert!(registry.lookup("bob").unwrap().is_none());
    }
}
