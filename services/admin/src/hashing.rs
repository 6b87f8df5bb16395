//! Password hashing used when an admin sets a user's credential

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};

use crate::error::{AdminError, AdminResult};

/// Hashing scheme injected into the user repository
pub trait CredentialHasher: Send + Sync {
    /// Hash a plaintext password into a storable string
    fn hash(&self, password: &str) -> AdminResult<String>;

    /// Check a plaintext password against a stored hash
    fn verify(&self, password: &str, hash: &str) -> AdminResult<bool>;
}

/// Argon2id hasher producing PHC strings
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> AdminResult<String> {
        let salt = SaltString::generate(&mut rand::thread_rng());
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AdminError::Hashing(format!("Failed to hash password: {}", e)))?
            .to_string();

        Ok(hash)
    }

    fn verify(&self, password: &str, hash: &str) -> AdminResult<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AdminError::Hashing(format!("Failed to parse password hash: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_differs_from_plaintext_and_verifies() {
        let hasher = Argon2Hasher;
        let hash = hasher.hash("s3cret-pass").unwrap();

        assert_ne!(hash, "s3cret-pass");
        assert!(hash.starts_with("$argon2"));
        assert!(hasher.verify("s3cret-pass", &hash).unwrap());
        assert!(!hasher.verify("wrong-pass", &hash).unwrap());
    }

    #[test]
    fn test_same_password_gets_fresh_salt() {
        let hasher = Argon2Hasher;
        let first = hasher.hash("repeat").unwrap();
        let second = hasher.hash("repeat").unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        let hasher = Argon2Hasher;
        assert!(matches!(
            hasher.verify("anything", "plaintext"),
            Err(AdminError::Hashing(_))
        ));
    }
}
