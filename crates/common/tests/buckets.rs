//! Integration tests for bucket and entry operations through the engine

mod common;

use ::common::prelude::*;
use serde_json::{json, Value};

#[test]
fn test_end_to_end_entry_flow() {
    let (kvest, _temp) = common::setup_test_env();
    let cred = common::provision(&kvest, "alice");

    kvest.create_bucket(&cred, "testbucket").unwrap();
    kvest
        .set_entry(&cred, "testbucket", "testkey", br#"{"name":"test"}"#)
        .unwrap();

    let raw = kvest.get_entry(&cred, "testbucket", "testkey").unwrap();
    let value: Value = serde_json::from_slice(&raw).unwrap();
    assert_eq!(value, json!({"name": "test"}));

    kvest.delete_entry(&cred, "testbucket", "testkey").unwrap();
    assert!(matches!(
        kvest.get_entry(&cred, "testbucket", "testkey"),
        Err(KvError::KeyNotFound(_))
    ));

    kvest.delete_bucket(&cred, "testbucket").unwrap();
    assert!(kvest.list_buckets(&cred).unwrap().is_empty());
}

#[test]
fn test_value_round_trips_semantically() {
    let (kvest, _temp) = common::setup_test_env();
    let cred = common::provision(&kvest, "alice");
    kvest.create_bucket(&cred, "b").unwrap();

    let input = br#"{
        "z": [1, 2, {"b": false, "a": null}],
        "a": "text"
    }"#;
    kvest.set_entry(&cred, "b", "k", input).unwrap();

    let stored: Value = serde_json::from_slice(&kvest.get_entry(&cred, "b", "k").unwrap()).unwrap();
    let expected: Value = serde_json::from_slice(input).unwrap();
    assert_eq!(stored, expected);
}

#[test]
fn test_invalid_values_are_rejected_without_side_effects() {
    let (kvest, _temp) = common::setup_test_env();
    let cred = common::provision(&kvest, "alice");
    kvest.create_bucket(&cred, "b").unwrap();

    for bad in [&b"not json"[..], b"[1,2,3]", b"{\"open\": "] {
        let err = kvest.set_entry(&cred, "b", "k", bad).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
    assert!(kvest.list_keys(&cred, "b").unwrap().is_empty());
}

#[test]
fn test_delete_entry_semantics() {
    let (kvest, _temp) = common::setup_test_env();
    let cred = common::provision(&kvest, "alice");
    kvest.create_bucket(&cred, "b").unwrap();

    // missing key under an existing bucket is a no-op
    kvest.delete_entry(&cred, "b", "ghost").unwrap();

    // missing bucket is an error
    assert!(matches!(
        kvest.delete_entry(&cred, "missing", "ghost"),
        Err(KvError::BucketNotFound(_))
    ));
}

#[test]
fn test_reserved_bucket_is_rejected_everywhere() {
    let (kvest, _temp) = common::setup_test_env();
    let cred = common::provision(&kvest, "alice");

    let results = [
        kvest.create_bucket(&cred, RESERVED_BUCKET).err(),
        kvest.delete_bucket(&cred, RESERVED_BUCKET).err(),
        kvest.set_entry(&cred, RESERVED_BUCKET, "k", b"{}").err(),
        kvest.get_entry(&cred, RESERVED_BUCKET, "k").err(),
        kvest.delete_entry(&cred, RESERVED_BUCKET, "k").err(),
        kvest.list_keys(&cred, RESERVED_BUCKET).err(),
    ];
    for err in results {
        assert_eq!(err.unwrap().kind(), ErrorKind::MethodNotAllowed);
    }
    assert!(kvest.list_buckets(&cred).unwrap().is_empty());
}

#[test]
fn test_unknown_credential_is_unauthorized() {
    let (kvest, _temp) = common::setup_test_env();
    let stranger = Credential::generate().unwrap();

    let err = kvest.list_buckets(&stranger).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    let err = kvest.create_bucket(&stranger, "b").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    // resolution never creates a store as a side effect
    assert!(kvest.router().resolve(&stranger).is_err());
}

#[test]
fn test_tenants_are_isolated() {
    let (kvest, _temp) = common::setup_test_env();
    let alice = common::provision_with_entry(&kvest, "alice", "shared-name", "k");
    let bob = common::provision(&kvest, "bob");

    assert!(kvest.list_buckets(&bob).unwrap().is_empty());
    assert!(matches!(
        kvest.get_entry(&bob, "shared-name", "k"),
        Err(KvError::BucketNotFound(_))
    ));

    kvest.create_bucket(&bob, "shared-name").unwrap();
    kvest
        .set_entry(&bob, "shared-name", "k", br#"{"owner":"bob"}"#)
        .unwrap();
    kvest.delete_bucket(&bob, "shared-name").unwrap();

    let raw = kvest.get_entry(&alice, "shared-name", "k").unwrap();
    assert_eq!(raw, br#"{"owner":"alice"}"#);
}
