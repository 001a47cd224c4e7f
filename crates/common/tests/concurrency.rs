//! Concurrent access to one tenant's store and across tenants

mod common;

use std::sync::Arc;
use std::thread;

use ::common::prelude::*;
use serde_json::Value;

#[test]
fn test_concurrent_writers_last_commit_wins() {
    let (kvest, _temp) = common::setup_test_env();
    let kvest = Arc::new(kvest);
    let cred = common::provision(&kvest, "alice");
    kvest.create_bucket(&cred, "b").unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let kvest = kvest.clone();
            let cred = cred.clone();
            thread::spawn(move || {
                let value = format!(r#"{{"writer":{},"pad":"{}"}}"#, i, "x".repeat(i * 64));
                kvest.set_entry(&cred, "b", "k", value.as_bytes()).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let stored: Value = serde_json::from_slice(&kvest.get_entry(&cred, "b", "k").unwrap()).unwrap();
    let writer = stored["writer"].as_u64().unwrap() as usize;
    assert!(writer < 8);
    // never a mix of two writes
    assert_eq!(stored["pad"].as_str().unwrap(), "x".repeat(writer * 64));
}

#[test]
fn test_concurrent_readers_and_writers() {
    let (kvest, _temp) = common::setup_test_env();
    let kvest = Arc::new(kvest);
    let cred = common::provision(&kvest, "alice");
    kvest.create_bucket(&cred, "b").unwrap();

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let kvest = kvest.clone();
            let cred = cred.clone();
            thread::spawn(move || {
                if i % 2 == 0 {
                    let key = format!("k{:02}", i);
                    kvest.set_entry(&cred, "b", &key, b"{}").unwrap();
                } else {
                    kvest.list_keys(&cred, "b").unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(kvest.list_keys(&cred, "b").unwrap().len(), 8);
}

#[test]
fn test_concurrent_provisioning_of_distinct_tenants() {
    let (kvest, _temp) = common::setup_test_env();
    let kvest = Arc::new(kvest);

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let kvest = kvest.clone();
            thread::spawn(move || {
                let cred = common::provision(&kvest, &format!("tenant-{}", i));
                kvest.create_bucket(&cred, "b").unwrap();
                cred
            })
        })
        .collect();
    let creds: Vec<Credential> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    for (i, cred) in creds.iter().enumerate() {
        assert_eq!(
            kvest.registry().lookup(&format!("tenant-{}", i)).unwrap(),
            Some(cred.clone())
        );
        assert_eq!(kvest.list_buckets(cred).unwrap(), vec!["b"]);
    }
}

#[test]
fn test_rotation_during_traffic() {
    let (kvest, _temp) = common::setup_test_env();
    let kvest = Arc::new(kvest);
    let old = common::provision_with_entry(&kvest, "alice", "b", "k");

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let kvest = kvest.clone();
            let old = old.clone();
            thread::spawn(move || {
                for _ in 0..20 {
                    match kvest.get_entry(&old, "b", "k") {
                        Ok(raw) => assert_eq!(raw, br#"{"owner":"alice"}"#),
                        Err(e) => assert_eq!(e.kind(), ErrorKind::Unauthorized),
                    }
                }
            })
        })
        .collect();

    let new = kvest
        .rotate_credential(Some(common::ADMIN_KEY), "alice")
        .unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(
        kvest.get_entry(&new, "b", "k").unwrap(),
        br#"{"owner":"alice"}"#
    );
    assert!(!kvest.router().path_for(&old).exists());
}
