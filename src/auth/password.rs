//! Argon2id password hashing.
//!
//! Hashes are PHC strings (`$argon2id$v=19$m=..,t=..,p=..$salt$digest`), so
//! the cost parameters travel with every stored hash and verification always
//! recomputes with the parameters the hash was created with.

use super::refresh::{fill_exact, EntropyError, EntropySource, OsEntropy};
use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::Arc;

const SALT_BYTES: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("failed to draw salt: {0}")]
    Entropy(#[from] EntropyError),

    #[error("unrecognized password hash encoding: {0}")]
    Format(String),
}

/// Salted, memory-hard password hashing with the library's default cost.
#[derive(Clone)]
pub struct PasswordHasher {
    entropy: Arc<dyn EntropySource>,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(Arc::new(OsEntropy))
    }
}

impl PasswordHasher {
    pub fn new(entropy: Arc<dyn EntropySource>) -> Self {
        Self { entropy }
    }

    /// Hashes a password using Argon2id.
    ///
    /// Returns a PHC-formatted hash string.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let mut salt = [0u8; SALT_BYTES];
        fill_exact(self.entropy.as_ref(), &mut salt)?;
        let salt = SaltString::encode_b64(&salt)
            .map_err(|e| PasswordError::Format(format!("salt encoding: {}", e)))?;

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::Format(e.to_string()))
    }

    /// Verifies a password against a PHC hash.
    ///
    /// A wrong password is `Ok(false)`; only an undecodable hash is an error.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| PasswordError::Format(e.to_string()))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::Format(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::password_hash::PasswordHasher as _;
    use argon2::{Algorithm, Params, Version};
    use rstest::rstest;

    struct EmptySource;

    impl EntropySource for EmptySource {
        fn read(&self, _buf: &mut [u8]) -> Result<usize, EntropyError> {
            Ok(0)
        }
    }

    #[rstest]
    #[case("passwrod")]
    #[case("21321n4rd")]
    #[case("12mdmd")]
    #[case("!@$@!$@((!JDN@!@BSNN!@NJB DB ))")]
    #[case("")]
    #[case("pässwörd ✓")]
    fn test_hash_then_verify(#[case] password: &str) {
        let hasher = PasswordHasher::default();

        let hash = hasher.hash(password).expect("should hash password");

        assert_ne!(hash, password);
        assert!(hash.starts_with("$argon2id$"), "hash should be in PHC format");
        assert!(hasher.verify(password, &hash).expect("should verify"));
    }

    #[rstest]
    #[case("correct_password", "wrong_password")]
    #[case("password", "Password")]
    #[case("password", "password ")]
    fn test_wrong_password_does_not_match(#[case] stored: &str, #[case] attempt: &str) {
        let hasher = PasswordHasher::default();
        let hash = hasher.hash(stored).expect("should hash password");

        assert!(!hasher.verify(attempt, &hash).expect("should verify"));
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let hasher = PasswordHasher::default();

        let a = hasher.hash("same").unwrap();
        let b = hasher.hash("same").unwrap();

        assert_ne!(a, b, "each hash should use a fresh salt");
    }

    #[rstest]
    #[case("")]
    #[case("plaintext")]
    #[case("$2b$12$abcdefghijklmnopqrstuv")]
    fn test_unrecognized_hash_is_format_error(#[case] hash: &str) {
        let result = PasswordHasher::default().verify("anything", hash);

        assert!(matches!(result, Err(PasswordError::Format(_))));
    }

    #[test]
    fn test_exhausted_entropy_is_entropy_error() {
        let hasher = PasswordHasher::new(Arc::new(EmptySource));

        assert!(matches!(
            hasher.hash("password"),
            Err(PasswordError::Entropy(_))
        ));
    }

    #[test]
    fn test_verifies_hash_made_with_other_cost() {
        let params = Params::new(8 * 1024, 1, 1, None).unwrap();
        let cheap = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let salt = SaltString::encode_b64(b"0123456789abcdef").unwrap();
        let hash = cheap
            .hash_password(b"legacy", &salt)
            .unwrap()
            .to_string();

        let hasher = PasswordHasher::default();
        assert!(hasher.verify("legacy", &hash).unwrap());
        assert!(!hasher.verify("other", &hash).unwrap());
    }
}
