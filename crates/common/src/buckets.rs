//! Bucket and entry operations against one opened tenant store.
//!
//! Each function runs exactly one redb transaction. Buckets are redb tables
//! keyed by entry name with canonical JSON bytes as values.

use redb::{
    Database, ReadOnlyTable, ReadTransaction, ReadableTable, TableDefinition, TableError,
    TableHandle, WriteTransaction,
};

use crate::error::KvError;
use crate::namespace::is_reserved;

type EntryTable<'a> = TableDefinition<'a, &'static str, &'static [u8]>;

fn entries(bucket: &str) -> EntryTable<'_> {
    TableDefinition::new(bucket)
}

fn bucket_exists(txn: &WriteTransaction, bucket: &str) -> Result<bool, KvError> {
    Ok(txn.list_tables()?.any(|table| table.name() == bucket))
}

fn open_bucket(
    txn: &ReadTransaction,
    bucket: &str,
) -> Result<ReadOnlyTable<&'static str, &'static [u8]>, KvError> {
    match txn.open_table(entries(bucket)) {
        Ok(table) => Ok(table),
        Err(TableError::TableDoesNotExist(_)) => Err(KvError::BucketNotFound(bucket.to_string())),
        Err(e) => Err(e.into()),
    }
}

/// Create `bucket` if it does not exist yet.
pub fn create_bucket(db: &Database, bucket: &str) -> Result<(), KvError> {
    let txn = db.begin_write()?;
    txn.open_table(entries(bucket))?;
    txn.commit()?;
    Ok(())
}

pub fn delete_bucket(db: &Database, bucket: &str) -> Result<(), KvError> {
    let txn = db.begin_write()?;
    if !txn.delete_table(entries(bucket))? {
        txn.abort()?;
        return Err(KvError::BucketNotFound(bucket.to_string()));
    }
    txn.commit()?;
    Ok(())
}

pub fn list_buckets(db: &Database) -> Result<Vec<String>, KvError> {
    let txn = db.begin_read()?;
    let mut names: Vec<String> = txn
        .list_tables()?
        .map(|table| table.name().to_string())
        .filter(|name| !is_reserved(name))
        .collect();
    names.sort();
    Ok(names)
}

/// Store already canonicalized JSON bytes under `key`.
pub fn set_entry(db: &Database, bucket: &str, key: &str, value: &[u8]) -> Result<(), KvError> {
    let txn = db.begin_write()?;
    if !bucket_exists(&txn, bucket)? {
        txn.abort()?;
        return Err(KvError::BucketNotFound(bucket.to_string()));
    }
    {
        let mut table = txn.open_table(entries(bucket))?;
        table.insert(key, value)?;
    }
    txn.commit()?;
    Ok(())
}

pub fn get_entry(db: &Database, bucket: &str, key: &str) -> Result<Vec<u8>, KvError> {
    let txn = db.begin_read()?;
    let table = open_bucket(&txn, bucket)?;
    let value = table
        .get(key)?
        .map(|v| v.value().to_vec())
        .ok_or_else(|| KvError::KeyNotFound(key.to_string()))?;
    Ok(value)
}

/// Remove `key`; a missing key is not an error.
pub fn delete_entry(db: &Database, bucket: &str, key: &str) -> Result<(), KvError> {
    let txn = db.begin_write()?;
    if !bucket_exists(&txn, bucket)? {
        txn.abort()?;
        return Err(KvError::BucketNotFound(bucket.to_string()));
    }
    {
        let mut table = txn.open_table(entries(bucket))?;
        table.remove(key)?;
    }
    txn.commit()?;
    Ok(())
}

/// Keys of `bucket` in store order (bytewise over the UTF-8 key).
pub fn list_keys(db: &Database, bucket: &str) -> Result<Vec<String>, KvError> {
    let txn = db.begin_read()?;
    let table = open_bucket(&txn, bucket)?;
    let mut keys = Vec::new();
    for item in table.iter()? {
        let (key, _) = item?;
        keys.push(key.value().to_string());
    }
    Ok(keys)
}
