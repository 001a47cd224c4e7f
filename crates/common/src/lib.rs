/**
 * Bucket and entry operations run against
 *  one opened tenant store, one transaction each.
 */
pub mod buckets;
/**
 * Opaque tenant credentials and how they
 *  are generated and validated.
 */
pub mod credential;
mod engine;
pub mod error;
/**
 * The reserved bucket rule.
 */
pub mod namespace;
/**
 * Tenant provisioning and credential rotation,
 *  both name-keyed (admin) and owner-keyed (bot).
 */
pub mod provision;
/**
 * Tenant display name to credential mapping.
 */
pub mod registry;
/**
 * Credential to store-file resolution and
 *  scoped per-store leases.
 */
pub mod router;
/**
 * Transport-facing service traits.
 */
pub mod service;
pub mod value;

pub use engine::Kvest;

pub mod prelude {
    pub use crate::credential::Credential;
    pub use crate::engine::Kvest;
    pub use crate::error::{ErrorKind, KvError};
    pub use crate::namespace::RESERVED_BUCKET;
    pub use crate::service::{KvService, OwnerProvisioner, TenantProvisioner};
}

/// Crate version, reported by health endpoints and the CLI.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
