//! Content fingerprints for change detection.

use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 fingerprint of a sub-document's canonical bytes, hex encoded.
///
/// Equal byte sequences always produce equal fingerprints. Monitors compare
/// fingerprints instead of version numbers because individual sub-documents
/// carry no version of their own.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint of `bytes`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use options_monitor::core::Fingerprint;
    ///
    /// let a = Fingerprint::of(br#"{"N":1}"#);
    /// let b = Fingerprint::of(br#"{"N":1}"#);
    /// assert_eq!(a, b);
    /// assert_ne!(a, Fingerprint::of(br#"{"N":2}"#));
    /// ```
    pub fn of(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        Self(hex::encode(digest))
    }

    /// The hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
