//! Opaque refresh token generation.
//!
//! Refresh tokens carry no claims: they are 32 random bytes rendered as 64
//! lowercase hex characters, and all of their state (owner, expiry,
//! revocation) lives in the store.

use rand::{rngs::OsRng, TryRngCore};
use std::sync::Arc;

/// Number of random bytes in a refresh token.
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// The random source could not supply the requested bytes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntropyError {
    #[error("entropy source failed: {0}")]
    Source(String),

    #[error("read {got} random bytes; expected {expected}")]
    ShortRead { got: usize, expected: usize },
}

/// A cryptographically secure byte source.
///
/// Returns how many bytes of `buf` were filled; callers treat anything short
/// of `buf.len()` as a failure.
pub trait EntropySource: Send + Sync {
    fn read(&self, buf: &mut [u8]) -> Result<usize, EntropyError>;
}

/// Operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn read(&self, buf: &mut [u8]) -> Result<usize, EntropyError> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|e| EntropyError::Source(e.to_string()))?;
        Ok(buf.len())
    }
}

/// Fills `buf` completely from `source` or fails.
pub(crate) fn fill_exact(source: &dyn EntropySource, buf: &mut [u8]) -> Result<(), EntropyError> {
    let got = source.read(buf)?;
    if got != buf.len() {
        return Err(EntropyError::ShortRead {
            got,
            expected: buf.len(),
        });
    }
    Ok(())
}

/// Generates refresh tokens.
#[derive(Clone)]
pub struct RefreshTokenIssuer {
    entropy: Arc<dyn EntropySource>,
}

impl Default for RefreshTokenIssuer {
    fn default() -> Self {
        Self::new(Arc::new(OsEntropy))
    }
}

impl RefreshTokenIssuer {
    pub fn new(entropy: Arc<dyn EntropySource>) -> Self {
        Self { entropy }
    }

    /// Draws a fresh 256-bit token.
    pub fn generate(&self) -> Result<String, EntropyError> {
        let mut key = [0u8; REFRESH_TOKEN_BYTES];
        fill_exact(self.entropy.as_ref(), &mut key)?;
        Ok(hex::encode(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct ShortSource(usize);

    impl EntropySource for ShortSource {
        fn read(&self, buf: &mut [u8]) -> Result<usize, EntropyError> {
            let n = self.0.min(buf.len());
            buf[..n].fill(0xab);
            Ok(n)
        }
    }

    struct BrokenSource;

    impl EntropySource for BrokenSource {
        fn read(&self, _buf: &mut [u8]) -> Result<usize, EntropyError> {
            Err(EntropyError::Source("device unavailable".into()))
        }
    }

    #[test]
    fn test_generate_format() {
        let token = RefreshTokenIssuer::default()
            .generate()
            .expect("should generate");

        assert_eq!(token.len(), 64, "token should be 64 hex characters");
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)),
            "token should be lowercase hex"
        );
    }

    #[test]
    fn test_generate_is_unique() {
        let issuer = RefreshTokenIssuer::default();
        let tokens: HashSet<String> = (0..10_000)
            .map(|_| issuer.generate().expect("should generate"))
            .collect();

        assert_eq!(tokens.len(), 10_000, "all tokens should be distinct");
        assert!(tokens.iter().all(|t| t.len() == 64));
    }

    #[test]
    fn test_short_read_is_rejected() {
        let issuer = RefreshTokenIssuer::new(Arc::new(ShortSource(31)));

        assert_eq!(
            issuer.generate(),
            Err(EntropyError::ShortRead {
                got: 31,
                expected: 32
            })
        );
    }

    #[test]
    fn test_source_failure_is_propagated() {
        let issuer = RefreshTokenIssuer::new(Arc::new(BrokenSource));

        assert!(matches!(issuer.generate(), Err(EntropyError::Source(_))));
    }
}
