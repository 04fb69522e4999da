use serde::{Deserialize, Serialize};

/// Flattened attestation returned by GET /v1/random/dual. PQ blob fields
/// are omitted entirely when the capability produced nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DualResponse {
    pub random: u32,
    pub timestamp: String,
    pub hash_alg: String,
    pub signature_type: String,
    pub msg_hash: String,
    pub v: u8,
    pub r: String,
    pub s: String,
    pub signer_addr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sig_pq_b64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pq_pubkey_b64: Option<String>,
    pub pq_scheme: String,
    pub mode: String,
    pub version: String,
}

/// The attested payload as reported in the full shape, with the derived
/// `msg_hash` attached for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadView {
    pub random: u32,
    pub timestamp: String,
    pub hash_alg: String,
    pub signature_type: String,
    pub msg_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcdsaBlock {
    pub v: u8,
    pub r: String,
    pub s: String,
    pub msg_hash: String,
    pub signer_addr: String,
}

/// PQ block in the full shape. Blob fields default to empty strings so
/// the schema is complete whether or not real PQ signing occurred.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PqBlock {
    pub sig_pq_b64: String,
    pub pq_pubkey_b64: String,
    pub pq_scheme: String,
}

/// Nested attestation returned by GET /v1/random/full.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullResponse {
    pub payload: PayloadView,
    pub ecdsa: EcdsaBlock,
    pub pq: PqBlock,
    pub mode: String,
    pub version: String,
}

/// Either response shape, serialized without a wrapper tag.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AttestationResponse {
    Dual(Box<DualResponse>),
    Full(Box<FullResponse>),
}
