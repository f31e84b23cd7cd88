//! Opaque identifier generation.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Generates a new opaque identifier (UUID v4, hyphenated).
#[must_use]
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Derives a stable key from components.
///
/// Used for notification records so that a dispatcher receiving the same
/// record twice can drop the duplicate.
#[must_use]
pub fn dedupe_key(components: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(components.join(":").as_bytes());
    let digest = hasher.finalize();
    format!("ntf:{}", hex::encode(&digest[..16]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_unique() {
        assert_ne!(generate_id(), generate_id());
    }

    #[test]
    fn test_dedupe_key_stable() {
        let a = dedupe_key(&["p1", "mapping", "submitted"]);
        let b = dedupe_key(&["p1", "mapping", "submitted"]);
        let c = dedupe_key(&["p1", "mapping", "approved"]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("ntf:"));
        assert_eq!(a.len(), 4 + 32);
    }
}
