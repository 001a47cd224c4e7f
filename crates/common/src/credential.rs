use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KvError;

/// Number of random bytes behind a credential (128 bits).
pub const CREDENTIAL_ENTROPY_BYTES: usize = 16;

/// Upper bound on accepted credential length, owner prefix included.
pub const MAX_CREDENTIAL_LEN: usize = 128;

/// Opaque token that names a tenant's store.
///
/// A credential is always a safe filename stem: ASCII hex digits and `-`
/// only, so it can be joined onto the data directory without escaping it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Credential(String);

impl Credential {
    /// Generate a fresh credential from OS randomness, hex encoded.
    pub fn generate() -> Result<Self, KvError> {
        Ok(Self(random_hex()?))
    }

    /// Generate a credential scoped to a numeric owner, `{owner}-{hex}`.
    ///
    /// Used by the bot transport, where the chat user id is the tenant.
    pub fn generate_owned(owner: i64) -> Result<Self, KvError> {
        Ok(Self(format!("{}{}", owner_prefix(owner), random_hex()?)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Filename prefix shared by every store belonging to `owner`.
pub fn owner_prefix(owner: i64) -> String {
    format!("{}-", owner)
}

fn random_hex() -> Result<String, KvError> {
    let mut bytes = [0u8; CREDENTIAL_ENTROPY_BYTES];
    getrandom::getrandom(&mut bytes).map_err(|e| KvError::Entropy(e.to_string()))?;
    Ok(hex::encode(bytes))
}

impl FromStr for Credential {
    type Err = KvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(KvError::Unauthorized);
        }
        if s.len() > MAX_CREDENTIAL_LEN
            || !s.bytes().all(|b| b.is_ascii_hexdigit() || b == b'-')
        {
            return Err(KvError::MalformedCredential);
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for Credential {
    type Error = KvError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Credential> for String {
    fn from(value: Credential) -> Self {
        value.0
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate() {
        let a = Credential::generate().unwrap();
        let b = Credential::generate().unwrap();
        assert_eq!(a.as_str().len(), CREDENTIAL_ENTROPY_BYTES * 2);
        assert_ne!(a, b);
        assert!(a.as_str().parse::<Credential>().is_ok());
    }

    #[test]
    fn test_generate_owned() {
        let cred = Credential::generate_owned(4242).unwrap();
        assert!(cred.as_str().starts_with("4242-"));
        assert!(cred.as_str().parse::<Credential>().is_ok());
    }

    #[test]
    fn test_rejects_unsafe_stems() {
        assert!(matches!("".parse::<Credential>(), Err(KvError::Unauthorized)));
        for bad in ["../users", "users", "abc/def", "ab cd", "a.db"] {
            assert!(
                matches!(bad.parse::<Credential>(), Err(KvError::MalformedCredential)),
                "{bad} should be rejected"
            );
        }
        let long = "a".repeat(MAX_CREDENTIAL_LEN + 1);
        assert!(long.parse::<Credential>().is_err());
    }
}
