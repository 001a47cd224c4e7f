use crate::error::KvError;

/// Bucket name kept for internal bookkeeping; never reachable by tenants.
pub const RESERVED_BUCKET: &str = "_system";

pub fn is_reserved(bucket: &str) -> bool {
    bucket == RESERVED_BUCKET
}

/// Reject the reserved bucket and empty names before any store is touched.
pub fn check_bucket(bucket: &str) -> Result<(), KvError> {
    if is_reserved(bucket) {
        return Err(KvError::ReservedBucket(bucket.to_string()));
    }
    if bucket.is_empty() {
        return Err(KvError::InvalidInput("bucket name cannot be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_bucket() {
        assert!(check_bucket("orders").is_ok());
        assert!(matches!(
            check_bucket(RESERVED_BUCKET),
            Err(KvError::ReservedBucket(_))
        ));
        assert!(matches!(check_bucket(""), Err(KvError::InvalidInput(_))));
        // only an exact match is reserved
        assert!(check_bucket("_system2").is_ok());
    }
}
