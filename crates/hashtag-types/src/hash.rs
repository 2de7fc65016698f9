use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque 32-byte pointer to off-chain content.
///
/// The marketplace never fetches or interprets the referenced blob; the
/// hash is stored and handed back to indexers verbatim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Content-address an in-memory blob.
    pub fn digest(content: &[u8]) -> Self {
        Self(*blake3::hash(content).as_bytes())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_deterministic() {
        let a = ContentHash::digest(b"item metadata");
        let b = ContentHash::digest(b"item metadata");
        assert_eq!(a, b);
        assert_ne!(a, ContentHash::digest(b"other metadata"));
    }
}
