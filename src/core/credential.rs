//! Opaque API credentials.
//!
//! Keys flow from config into checkers without ever being printed. Logs and
//! `validate` output identify a key by a short SHA-256 fingerprint instead.

use sha2::{Digest, Sha256};

/// Number of hex characters kept in a fingerprint.
const FINGERPRINT_LEN: usize = 12;

/// A secret API key.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The raw secret, for building request headers only.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Stable short identifier for the key.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.0.as_bytes());
        let digest = hex::encode(hasher.finalize());
        digest[..FINGERPRINT_LEN].to_string()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credential(sha256:{})", self.fingerprint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_never_prints_secret() {
        let cred = Credential::new("sk-very-secret");
        let rendered = format!("{cred:?}");
        assert!(!rendered.contains("sk-very-secret"));
        assert!(rendered.starts_with("Credential(sha256:"));
    }

    #[test]
    fn fingerprint_is_stable_and_short() {
        let a = Credential::new("key-1");
        let b = Credential::new("key-1");
        let c = Credential::new("key-2");
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_eq!(a.fingerprint().len(), FINGERPRINT_LEN);
    }

    #[test]
    fn whitespace_key_is_empty() {
        assert!(Credential::new("  ").is_empty());
        assert!(!Credential::new("k").is_empty());
    }
}
