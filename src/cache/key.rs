//! Request fingerprinting.

use sha2::{Digest, Sha256};

/// Cache key for the parameterless "list models" operation.
pub const MODELS_KEY: &str = "models:list";

/// SHA-256 hex digest over the canonical serialization of a request.
///
/// `serde_json` object maps are ordered, so two structurally identical
/// requests produce the same digest regardless of field insertion order.
pub fn fingerprint(request: &serde_json::Value) -> String {
    let canonical = serde_json::to_string(request).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// SHA-256 hex of an arbitrary key, for use as a safe storage filename.
pub(crate) fn storage_hash(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hasher.finalize().iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_order_does_not_change_fingerprint() {
        let a = json!({
            "model": "llama-3",
            "messages": [{"role": "user", "content": "hi"}],
            "temperature": 0.7,
            "stream": false
        });
        let b = json!({
            "stream": false,
            "temperature": 0.7,
            "messages": [{"content": "hi", "role": "user"}],
            "model": "llama-3"
        });
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn any_field_change_diverges() {
        let base = json!({
            "model": "llama-3",
            "messages": [{"role": "user", "content": "hi"}],
            "temperature": 0.7
        });

        let other_model = json!({
            "model": "llama-2",
            "messages": [{"role": "user", "content": "hi"}],
            "temperature": 0.7
        });
        let other_content = json!({
            "model": "llama-3",
            "messages": [{"role": "user", "content": "hello"}],
            "temperature": 0.7
        });
        let other_temp = json!({
            "model": "llama-3",
            "messages": [{"role": "user", "content": "hi"}],
            "temperature": 0.2
        });

        let fp = fingerprint(&base);
        assert_ne!(fp, fingerprint(&other_model));
        assert_ne!(fp, fingerprint(&other_content));
        assert_ne!(fp, fingerprint(&other_temp));
    }

    #[test]
    fn digest_is_hex_sha256() {
        let fp = fingerprint(&json!({"k": "v"}));
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
