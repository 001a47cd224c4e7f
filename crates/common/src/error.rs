use std::fmt;

/// Coarse classification of every failure the engine can report.
///
/// Transports map a kind to their own reply format (status codes for HTTP,
/// message text for the bot) without inspecting individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Unauthorized,
    NotFound,
    Conflict,
    InvalidInput,
    MethodNotAllowed,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::NotFound => "not found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::MethodNotAllowed => "method not allowed",
            ErrorKind::Internal => "internal error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum KvError {
    #[error("missing or invalid credential")]
    Unauthorized,
    #[error("unknown credential")]
    UnknownCredential,
    #[error("malformed credential")]
    MalformedCredential,
    #[error("tenant not found: {0}")]
    TenantNotFound(String),
    #[error("bucket not found: {0}")]
    BucketNotFound(String),
    #[error("key not found: {0}")]
    KeyNotFound(String),
    #[error("tenant already exists: {0}")]
    Conflict(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("bucket name is reserved: {0}")]
    ReservedBucket(String),
    #[error("storage error: {0}")]
    Storage(#[from] redb::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to gather randomness: {0}")]
    Entropy(String),
}

impl KvError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            KvError::Unauthorized | KvError::UnknownCredential | KvError::MalformedCredential => {
                ErrorKind::Unauthorized
            }
            KvError::TenantNotFound(_) | KvError::BucketNotFound(_) | KvError::KeyNotFound(_) => {
                ErrorKind::NotFound
            }
            KvError::Conflict(_) => ErrorKind::Conflict,
            KvError::InvalidInput(_) => ErrorKind::InvalidInput,
            KvError::ReservedBucket(_) => ErrorKind::MethodNotAllowed,
            KvError::Storage(_) | KvError::Io(_) | KvError::Entropy(_) => ErrorKind::Internal,
        }
    }
}

// redb splits its errors by phase; all of them are terminal storage failures here.
macro_rules! storage_error {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for KvError {
                fn from(e: $ty) -> Self {
                    KvError::Storage(e.into())
                }
            }
        )*
    };
}

storage_error!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);
