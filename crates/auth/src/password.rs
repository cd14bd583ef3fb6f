use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("failed to hash password")]
    Hash,

    #[error("failed to verify password")]
    Verify,
}

/// Credential hashing seam used at registration and login.
///
/// `verify` returns `Ok(false)` for a well-formed hash that does not match;
/// `Err` is reserved for malformed hashes and hashing failures.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError>;
    fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, PasswordError>;
}

/// bcrypt-backed hasher (adaptive cost).
#[derive(Debug, Clone)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        bcrypt::hash(plaintext, self.cost).map_err(|_| PasswordError::Hash)
    }

    fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, PasswordError> {
        bcrypt::verify(plaintext, hash).map_err(|_| PasswordError::Verify)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimum bcrypt cost (4) keeps these tests fast; production uses DEFAULT_COST.
    // bcrypt::MIN_COST is private in this version, so the value is inlined.
    fn hasher() -> BcryptHasher {
        BcryptHasher::new(4)
    }

    #[test]
    fn hash_verify_round_trip() {
        let h = hasher();
        let hash = h.hash("hunter2").unwrap();

        assert!(h.verify("hunter2", &hash).unwrap());
        assert!(!h.verify("hunter3", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error_not_a_mismatch() {
        let h = hasher();
        assert_eq!(
            h.verify("hunter2", "not-a-bcrypt-hash"),
            Err(PasswordError::Verify)
        );
    }
}
