//! Operations shared by every transport.
//!
//! The HTTP API and the chat bot are both thin adapters over these traits;
//! [`crate::Kvest`] is the one implementation backed by on-disk stores.

use crate::credential::Credential;
use crate::error::KvError;

/// Bucket and entry operations on the store named by a tenant credential.
pub trait KvService: Send + Sync {
    fn create_bucket(&self, credential: &Credential, bucket: &str) -> Result<(), KvError>;

    fn delete_bucket(&self, credential: &Credential, bucket: &str) -> Result<(), KvError>;

    fn list_buckets(&self, credential: &Credential) -> Result<Vec<String>, KvError>;

    /// `value` is the raw request document; it must be a JSON object.
    fn set_entry(
        &self,
        credential: &Credential,
        bucket: &str,
        key: &str,
        value: &[u8],
    ) -> Result<(), KvError>;

    /// Returns the stored canonical JSON bytes.
    fn get_entry(&self, credential: &Credential, bucket: &str, key: &str)
        -> Result<Vec<u8>, KvError>;

    fn delete_entry(&self, credential: &Credential, bucket: &str, key: &str)
        -> Result<(), KvError>;

    fn list_keys(&self, credential: &Credential, bucket: &str) -> Result<Vec<String>, KvError>;
}

/// Admin-gated tenant lifecycle keyed by display name.
pub trait TenantProvisioner: Send + Sync {
    /// Issue a credential and an empty store for a new tenant.
    fn create_tenant(&self, admin_secret: Option<&str>, name: &str)
        -> Result<Credential, KvError>;

    /// Replace a tenant's credential, keeping its data.
    fn rotate_credential(
        &self,
        admin_secret: Option<&str>,
        name: &str,
    ) -> Result<Credential, KvError>;
}

/// Self-service tenant lifecycle keyed by a numeric owner id (chat user).
pub trait OwnerProvisioner: Send + Sync {
    fn create_owned(&self, owner: i64) -> Result<Credential, KvError>;

    fn rotate_owned(&self, owner: i64) -> Result<Credential, KvError>;

    /// Current credential of `owner`'s store, `TenantNotFound` if there is none.
    fn owned_credential(&self, owner: i64) -> Result<Credential, KvError>;
}
