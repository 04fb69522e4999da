use k256::ecdsa::{signature::hazmat::PrehashSigner, RecoveryId, Signature, SigningKey};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha3::{Digest as Sha3Digest, Keccak256};

use crate::{canonical, digest};

#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("signing key must be 32 bytes of hex (64 hex chars)")]
    InvalidKey,

    #[error("digest must be 32 bytes of hex (64 hex chars)")]
    InvalidDigest,

    #[error(transparent)]
    Encoding(#[from] canonical::EncodingError),

    #[error("ecdsa signing failed: {0}")]
    Ecdsa(#[from] k256::ecdsa::Error),
}

/// Recoverable secp256k1 signature over a 32-byte digest.
///
/// `v` uses the 27/28 convention (raw recovery bit + 27) so address-recovery
/// verifiers can reconstruct the public key from `r`, `s`, `v` and
/// `msg_hash` alone. `msg_hash` is the digest that was signed, reported for
/// display; it is not itself an extra signed input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcdsaSignature {
    pub v: u8,
    pub r: String,
    pub s: String,
    pub msg_hash: String,
    pub signer_addr: String,
}

/// What to sign: either a ready-made digest (hex, `0x` optional) or a
/// structured payload that is canonicalized and hashed internally.
pub enum SignInput<'a> {
    DigestHex(&'a str),
    Payload(&'a Value),
}

/// ECDSA (secp256k1) signer with an Ethereum-style checksummed address.
pub struct EcdsaSigner {
    signing_key: SigningKey,
    /// EIP-55 checksummed address derived from the public key.
    pub signer_addr: String,
}

impl EcdsaSigner {
    /// Create from a hex-encoded 32-byte secret, with or without `0x`.
    pub fn from_hex(key_hex: &str) -> Result<Self, SigningError> {
        let trimmed = key_hex.trim();
        let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let raw = hex::decode(stripped).map_err(|_| SigningError::InvalidKey)?;
        if raw.len() != 32 {
            return Err(SigningError::InvalidKey);
        }
        let mut key = [0u8; 32];
        key.copy_from_slice(&raw);
        Self::from_key_bytes(&key)
    }

    /// Create from raw 32-byte key material.
    pub fn from_key_bytes(key_bytes: &[u8; 32]) -> Result<Self, SigningError> {
        let signing_key =
            SigningKey::from_bytes(key_bytes.into()).map_err(|_| SigningError::InvalidKey)?;
        let verifying_key = signing_key.verifying_key();

        // Uncompressed public key is 65 bytes with a 0x04 prefix; the
        // address is keccak256 of the remaining 64 bytes, last 20 bytes.
        let pk_encoded = verifying_key.to_encoded_point(false);
        let hash = Keccak256::digest(&pk_encoded.as_bytes()[1..]);
        let signer_addr = checksum_address(&hash[12..32]);

        Ok(EcdsaSigner {
            signing_key,
            signer_addr,
        })
    }

    /// Sign a ready-made digest or a payload; both paths produce the same
    /// digest for the same payload content.
    pub fn sign(&self, input: SignInput<'_>) -> Result<EcdsaSignature, SigningError> {
        let digest32 = match input {
            SignInput::DigestHex(h) => decode_digest_hex(h)?,
            SignInput::Payload(payload) => digest::sha256(&canonical::canonical_bytes(payload)?),
        };
        self.sign_digest(&digest32)
    }

    /// Sign a 32-byte digest. Deterministic per RFC 6979.
    pub fn sign_digest(&self, digest32: &[u8; 32]) -> Result<EcdsaSignature, SigningError> {
        let (signature, recovery_id): (Signature, RecoveryId) =
            self.signing_key.sign_prehash(&digest32[..])?;
        let sig_bytes = signature.to_bytes();

        Ok(EcdsaSignature {
            v: recovery_id.to_byte() + 27,
            r: format!("0x{}", hex::encode(&sig_bytes[..32])),
            s: format!("0x{}", hex::encode(&sig_bytes[32..])),
            msg_hash: format!("0x{}", hex::encode(digest32)),
            signer_addr: self.signer_addr.clone(),
        })
    }
}

fn decode_digest_hex(h: &str) -> Result<[u8; 32], SigningError> {
    let trimmed = h.trim();
    let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let raw = hex::decode(stripped).map_err(|_| SigningError::InvalidDigest)?;
    raw.as_slice()
        .try_into()
        .map_err(|_| SigningError::InvalidDigest)
}

/// EIP-55 checksum casing for a 20-byte address.
pub fn checksum_address(addr: &[u8]) -> String {
    let lower = hex::encode(addr);
    let hash = Keccak256::digest(lower.as_bytes());
    let mut out = String::with_capacity(2 + lower.len());
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = if i % 2 == 0 {
            hash[i / 2] >> 4
        } else {
            hash[i / 2] & 0x0f
        };
        if nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::VerifyingKey;
    use serde_json::json;

    const TEST_KEY_HEX: &str = "59c6995e998f97a5a0044966f094538b292a2e2b0f1b9b7a0f6f4b9b9b2e8d4a";

    fn test_signer() -> EcdsaSigner {
        EcdsaSigner::from_hex(TEST_KEY_HEX).unwrap()
    }

    #[test]
    fn test_accepts_key_with_and_without_prefix() {
        let a = EcdsaSigner::from_hex(TEST_KEY_HEX).unwrap();
        let b = EcdsaSigner::from_hex(&format!("0x{TEST_KEY_HEX}")).unwrap();
        assert_eq!(a.signer_addr, b.signer_addr);
    }

    #[test]
    fn test_rejects_wrong_length_key() {
        // 31 bytes
        assert!(matches!(
            EcdsaSigner::from_hex(&"ab".repeat(31)),
            Err(SigningError::InvalidKey)
        ));
        // 33 bytes
        assert!(matches!(
            EcdsaSigner::from_hex(&"ab".repeat(33)),
            Err(SigningError::InvalidKey)
        ));
        // not hex at all
        assert!(matches!(
            EcdsaSigner::from_hex("zz"),
            Err(SigningError::InvalidKey)
        ));
    }

    #[test]
    fn test_rejects_malformed_digest() {
        let signer = test_signer();
        assert!(matches!(
            signer.sign(SignInput::DigestHex("not-hex")),
            Err(SigningError::InvalidDigest)
        ));
        assert!(matches!(
            signer.sign(SignInput::DigestHex(&"ab".repeat(31))),
            Err(SigningError::InvalidDigest)
        ));
    }

    #[test]
    fn test_v_uses_27_28_convention() {
        let signer = test_signer();
        for i in 0u8..8 {
            let digest = crate::digest::sha256(&[i]);
            let sig = signer.sign_digest(&digest).unwrap();
            assert!(sig.v == 27 || sig.v == 28, "v was {}", sig.v);
        }
    }

    #[test]
    fn test_signing_is_deterministic() {
        let signer = test_signer();
        let digest = crate::digest::sha256(b"fixed input");
        let a = signer.sign_digest(&digest).unwrap();
        let b = signer.sign_digest(&digest).unwrap();
        assert_eq!(a.r, b.r);
        assert_eq!(a.s, b.s);
        assert_eq!(a.v, b.v);
        assert_eq!(a.msg_hash, b.msg_hash);
        assert_eq!(a.signer_addr, b.signer_addr);
    }

    #[test]
    fn test_digest_and_payload_inputs_agree() {
        let signer = test_signer();
        let payload = json!({
            "random": 1,
            "timestamp": "2024-01-01T00:00:00Z",
            "hash_alg": "SHA-256",
            "signature_type": "X",
        });
        let via_payload = signer.sign(SignInput::Payload(&payload)).unwrap();
        let via_digest = signer
            .sign(SignInput::DigestHex(
                "0x4ba61f1ec87bad762fe8ad86b73cce8504c86ef0af7a07cf1c86084fae15176b",
            ))
            .unwrap();
        assert_eq!(via_payload.msg_hash, via_digest.msg_hash);
        assert_eq!(via_payload.r, via_digest.r);
        assert_eq!(via_payload.s, via_digest.s);
    }

    #[test]
    fn test_address_recoverable_from_signature() {
        let signer = test_signer();
        let digest = crate::digest::sha256(b"recover me");
        let sig = signer.sign_digest(&digest).unwrap();

        let mut rs = [0u8; 64];
        hex::decode_to_slice(&sig.r[2..], &mut rs[..32]).unwrap();
        hex::decode_to_slice(&sig.s[2..], &mut rs[32..]).unwrap();
        let parsed = Signature::from_slice(&rs).unwrap();
        let recid = RecoveryId::from_byte(sig.v - 27).unwrap();

        let recovered = VerifyingKey::recover_from_prehash(&digest, &parsed, recid).unwrap();
        let pk = recovered.to_encoded_point(false);
        let hash = Keccak256::digest(&pk.as_bytes()[1..]);
        assert_eq!(checksum_address(&hash[12..32]), sig.signer_addr);
    }

    #[test]
    fn test_eip55_checksum_vectors() {
        let cases = [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        ];
        for expected in cases {
            let raw = hex::decode(expected[2..].to_lowercase()).unwrap();
            assert_eq!(checksum_address(&raw), expected);
        }
    }

    #[test]
    fn test_signer_addr_is_checksummed() {
        let signer = test_signer();
        let addr = &signer.signer_addr;
        assert!(addr.starts_with("0x"));
        assert_eq!(addr.len(), 42);
        let raw = hex::decode(addr[2..].to_lowercase()).unwrap();
        assert_eq!(checksum_address(&raw), *addr);
    }
}
