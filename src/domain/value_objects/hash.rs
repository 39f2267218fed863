//! Content Fingerprint Value Object
//!
//! A validated, immutable hash representing the content of a file.
//! Both the local tree and the host manifest are compared through it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Content fingerprint value object
///
/// Wraps a SHA-256 hash string with the `sha256:` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Prefix for SHA-256 hashes
    pub const PREFIX: &'static str = "sha256:";

    /// Create a fingerprint from a raw hash string (with or without prefix)
    ///
    /// Hex digits are lowercased so `sha256sum` and `shasum` output compare equal.
    pub fn new(raw_hash: &str) -> Self {
        let hex = raw_hash
            .trim()
            .strip_prefix(Self::PREFIX)
            .unwrap_or(raw_hash.trim());
        Self(format!("{}{}", Self::PREFIX, hex.to_ascii_lowercase()))
    }

    /// Compute the SHA-256 fingerprint of raw content
    pub fn from_bytes(content: &[u8]) -> Self {
        use sha2::{Digest, Sha256};
        let hash = Sha256::digest(content);
        Self(format!("{}{:x}", Self::PREFIX, hash))
    }

    /// Digest over an ordered list of `(path, fingerprint)` pairs.
    ///
    /// Identifies a whole tree snapshot in the audit log.
    pub fn digest_of<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a Fingerprint)>,
    {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        for (path, fingerprint) in entries {
            hasher.update(path.as_bytes());
            hasher.update([0u8]);
            hasher.update(fingerprint.as_str().as_bytes());
            hasher.update([b'\n']);
        }
        Self(format!("{}{:x}", Self::PREFIX, hasher.finalize()))
    }

    /// Get the full hash string with prefix
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get just the hex part without prefix
    pub fn hex(&self) -> &str {
        self.0.strip_prefix(Self::PREFIX).unwrap_or(&self.0)
    }

    /// Abbreviated form for human output
    pub fn short(&self) -> &str {
        let hex = self.hex();
        &hex[..hex.len().min(12)]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Fingerprint {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
