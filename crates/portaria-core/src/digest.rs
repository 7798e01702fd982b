//! One-way password digests.
//!
//! The server stores password hashes and compares them with what the
//! controller sends, so the controller only ever transmits the digest.

use sha2::{Digest, Sha256};

/// One-way transform of a password into a fixed-length hex string.
pub trait PasswordDigest: Send + Sync {
    fn digest(&self, plaintext: &str) -> String;
}

/// SHA-256 rendered as 64 lowercase hex characters.
///
/// # Examples
///
/// ```
/// use portaria_core::{PasswordDigest, Sha256Digest};
///
/// let digest = Sha256Digest.digest("1234");
/// assert_eq!(digest.len(), 64);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Digest;

impl PasswordDigest for Sha256Digest {
    fn digest(&self, plaintext: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(plaintext.as_bytes());
        hex::encode(hasher.finalize())
    }
}
