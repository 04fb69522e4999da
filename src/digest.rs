use sha2::{Digest, Sha256};

/// SHA-256 of the given bytes.
pub fn sha256(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(bytes).into()
}

/// SHA-256 of the given bytes as a 0x-prefixed lowercase hex string.
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(sha256(bytes)))
}
