//! Content hashing

use sha2::{Digest, Sha256};

/// Hex SHA-256 of `data`, truncated to 16 characters.
pub fn stable_hash(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    hex[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::stable_hash;

    #[test]
    fn hash_is_stable_and_short() {
        let a = stable_hash(b"hello");
        assert_eq!(a, stable_hash(b"hello"));
        assert_eq!(a.len(), 16);
        assert_ne!(a, stable_hash(b"hello!"));
        assert_eq!(a, "2cf24dba5fb0a30e");
    }
}
