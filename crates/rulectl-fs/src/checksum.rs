//! SHA-256 checksum utilities
//!
//! Provides a single canonical checksum format (`sha256:<hex>`) used by the
//! baseline record to detect divergence from the last-synced content.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Prefix for all checksums produced by this module
const PREFIX: &str = "sha256:";

/// Compute the SHA-256 checksum of string content.
///
/// Returns a string in the canonical format `"sha256:<hex>"`.
pub fn compute_content_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{}{:x}", PREFIX, hasher.finalize())
}

/// Compute the checksum of a JSON document in canonical form.
///
/// `serde_json` maps keep their keys sorted, so two documents that differ
/// only in key order hash identically.
pub fn compute_json_checksum(value: &Value) -> String {
    compute_content_checksum(&value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn content_checksum_known_value() {
        let checksum = compute_content_checksum("hello world");
        assert_eq!(
            checksum,
            "sha256:b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn json_checksum_ignores_key_order() {
        let a: Value = serde_json::from_str(r#"{"name":"x","severity":1}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"severity":1,"name":"x"}"#).unwrap();
        assert_eq!(compute_json_checksum(&a), compute_json_checksum(&b));
    }

    #[test]
    fn json_checksum_detects_value_change() {
        let a = json!({"name": "x", "severity": 1});
        let b = json!({"name": "x", "severity": 2});
        assert_ne!(compute_json_checksum(&a), compute_json_checksum(&b));
    }
}
