//! Content digests.
//!
//! Used two ways: the document's metadata carries a digest of the *binary*
//! workbook source (never invented from the model, §3 invariant), and the
//! chunking store's manifest carries a digest of each chunk file's rendered
//! bytes so staleness and tamper checks are cheap byte comparisons.

use sha2::{Digest as _, Sha256};

/// A hex-encoded SHA-256 digest.
pub type ContentDigest = String;

/// Digest arbitrary bytes (the binary workbook source, or a rendered chunk
/// file) into a hex string.
pub fn digest_bytes(bytes: &[u8]) -> ContentDigest {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        use std::fmt::Write;
        let mut out = String::with_capacity(bytes.as_ref().len() * 2);
        for b in bytes.as_ref() {
            let _ = write!(out, "{:02x}", b);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_deterministic() {
        let a = digest_bytes(b"hello world");
        let b = digest_bytes(b"hello world");
        assert_eq!(a, b);
    }

    #[test]
    fn test_digest_differs_for_different_input() {
        assert_ne!(digest_bytes(b"a"), digest_bytes(b"b"));
    }

    #[test]
    fn test_digest_is_hex_sha256_length() {
        let d = digest_bytes(b"x");
        assert_eq!(d.len(), 64);
        assert!(d.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
