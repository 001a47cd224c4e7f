//! Shared test utilities for engine integration tests
#![allow(dead_code)]

use common::prelude::*;
use tempfile::TempDir;

pub const ADMIN_KEY: &str = "test-master-key";

/// Set up an engine over a fresh data directory with a known admin key
pub fn setup_test_env() -> (Kvest, TempDir) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let temp_dir = TempDir::new().unwrap();
    let kvest = Kvest::open(temp_dir.path().join("data"), Some(ADMIN_KEY.to_string())).unwrap();
    (kvest, temp_dir)
}

/// Provision a tenant through the admin path and return its credential
pub fn provision(kvest: &Kvest, name: &str) -> Credential {
    kvest.create_tenant(Some(ADMIN_KEY), name).unwrap()
}

/// Provision a tenant and give it one bucket holding one entry
pub fn provision_with_entry(kvest: &Kvest, name: &str, bucket: &str, key: &str) -> Credential {
    let cred = provision(kvest, name);
    kvest.create_bucket(&cred, bucket).unwrap();
    kvest
        .set_entry(&cred, bucket, key, format!(r#"{{"owner":"{}"}}"#, name).as_bytes())
        .unwrap();
    cred
}
