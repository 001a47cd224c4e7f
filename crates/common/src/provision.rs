//! Tenant provisioning and credential rotation.
//!
//! Name-keyed tenants live in the registry; the file effect (create or
//! rename) happens inside the open registry transaction and before its
//! commit, so a failed file operation leaves the registry untouched and a
//! failed commit is undone on disk.

use std::fmt;
use std::fs;

use crate::credential::Credential;
use crate::engine::Kvest;
use crate::error::KvError;
use crate::service::{OwnerProvisioner, TenantProvisioner};

/// Administrative secret that gates name-keyed provisioning.
#[derive(Clone)]
pub struct AdminKey(String);

impl AdminKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Constant-time comparison against a caller-supplied secret.
    pub fn matches(&self, supplied: &str) -> bool {
        let expected = self.0.as_bytes();
        let supplied = supplied.as_bytes();
        if expected.len() != supplied.len() {
            return false;
        }
        expected
            .iter()
            .zip(supplied)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl fmt::Debug for AdminKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AdminKey(..)")
    }
}

impl Kvest {
    /// Fail closed unless `supplied` equals the configured admin key.
    pub fn authorize_admin(&self, supplied: Option<&str>) -> Result<(), KvError> {
        match (&self.admin_key, supplied) {
            (Some(key), Some(supplied)) if key.matches(supplied) => Ok(()),
            _ => Err(KvError::Unauthorized),
        }
    }

    fn rename_store(&self, from: &Credential, to: &Credential) -> Result<(), KvError> {
        fs::rename(self.router.path_for(from), self.router.path_for(to))?;
        Ok(())
    }
}

fn check_name(name: &str) -> Result<(), KvError> {
    if name.trim().is_empty() {
        return Err(KvError::InvalidInput("name cannot be empty".into()));
    }
    Ok(())
}

impl TenantProvisioner for Kvest {
    fn create_tenant(
        &self,
        admin_secret: Option<&str>,
        name: &str,
    ) -> Result<Credential, KvError> {
        self.authorize_admin(admin_secret)?;
        check_name(name)?;

        let session = self.registry.begin()?;
        if session.get(name)?.is_some() {
            return Err(KvError::Conflict(name.to_string()));
        }

        let credential = Credential::generate()?;
        session.put(name, &credential)?;
        let path = self.router.initialize(&credential)?;

        if let Err(e) = session.commit() {
            tracing::error!(tenant = name, "registry commit failed, removing new store");
            if let Err(cleanup) = fs::remove_file(&path) {
                tracing::error!(
                    tenant = name,
                    path = %path.display(),
                    error = %cleanup,
                    "failed to remove orphaned store"
                );
            }
            return Err(e);
        }

        tracing::info!(tenant = name, "tenant provisioned");
        Ok(credential)
    }

    fn rotate_credential(
        &self,
        admin_secret: Option<&str>,
        name: &str,
    ) -> Result<Credential, KvError> {
        self.authorize_admin(admin_secret)?;
        check_name(name)?;

        let session = self.registry.begin()?;
        let old = session
            .get(name)?
            .ok_or_else(|| KvError::TenantNotFound(name.to_string()))?;

        let new = Credential::generate()?;
        session.put(name, &new)?;

        // hold the old store while it moves so no request sees a half-rotated tenant
        let lease = self.router.lease(&old).map_err(|e| match e {
            KvError::UnknownCredential => {
                tracing::error!(tenant = name, "registry entry has no store file");
                KvError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "tenant store is missing",
                ))
            }
            other => other,
        })?;
        self.rename_store(&old, &new)?;

        if let Err(e) = session.commit() {
            tracing::error!(tenant = name, "registry commit failed, restoring old store");
            if let Err(undo) = self.rename_store(&new, &old) {
                tracing::error!(
                    tenant = name,
                    from = %self.router.path_for(&new).display(),
                    to = %lease.path().display(),
                    error = %undo,
                    "failed to restore store after rotation; manual reconciliation required"
                );
            }
            return Err(e);
        }
        drop(lease);

        tracing::info!(tenant = name, "credential rotated");
        Ok(new)
    }
}

impl OwnerProvisioner for Kvest {
    fn create_owned(&self, owner: i64) -> Result<Credential, KvError> {
        let _guard = self.owners.lock();
        if self.router.find_owned(owner)?.is_some() {
            return Err(KvError::Conflict(owner.to_string()));
        }
        let credential = Credential::generate_owned(owner)?;
        self.router.initialize(&credential)?;
        tracing::info!(owner, "owned store provisioned");
        Ok(credential)
    }

    fn rotate_owned(&self, owner: i64) -> Result<Credential, KvError> {
        let _guard = self.owners.lock();
        let old = self
            .router
            .find_owned(owner)?
            .ok_or_else(|| KvError::TenantNotFound(owner.to_string()))?;
        let new = Credential::generate_owned(owner)?;

        let lease = self.router.lease(&old)?;
        self.rename_store(&old, &new)?;
        drop(lease);

        tracing::info!(owner, "owned credential rotated");
        Ok(new)
    }

    fn owned_credential(&self, owner: i64) -> Result<Credential, KvError> {
        self.router
            .find_owned(owner)?
            .ok_or_else(|| KvError::TenantNotFound(owner.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_key_matches() {
        let key = AdminKey::new("s3cret");
        assert!(key.matches("s3cret"));
        assert!(!key.matches("s3cre"));
        assert!(!key.matches("s3creT"));
        assert!(!key.matches(""));
    }

    #[test]
    fn test_admin_key_debug_is_redacted() {
        let key = AdminKey::new("s3cret");
        assert!(!format!("{:?}", key).contains("s3cret"));
    }
}
