use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::rand_core::TryRngCore;
use rand::rngs::OsRng;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::pq::{self, PqError, PqOutcome, PqSigner};
use crate::signing::{EcdsaSigner, SigningError};
use crate::types::{
    AttestationResponse, DualResponse, EcdsaBlock, FullResponse, PayloadView, PqBlock,
};
use crate::{canonical, digest};

pub const HASH_ALG: &str = "SHA-256";
pub const SIGNATURE_TYPE: &str = "ECDSA(secp256k1) + ML-DSA-65";
pub const RESPONSE_VERSION: &str = "1.0";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Entropy source for the minted random value. Injected so tests can
/// pin the value.
pub trait Entropy: Send + Sync {
    fn random_u32(&self) -> u32;
}

/// Wall-clock source. Injected so tests can pin the timestamp.
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;
}

pub struct OsEntropy;

impl Entropy for OsEntropy {
    fn random_u32(&self) -> u32 {
        let mut buf = [0u8; 4];
        OsRng
            .try_fill_bytes(&mut buf)
            .expect("OS entropy source failed");
        u32::from_be_bytes(buf)
    }
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Which response shape the merge step produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    Dual,
    Full,
}

/// The payload that gets canonicalized and hashed. `msg_hash` is
/// derived from these four fields and attached afterwards; it is never
/// part of the hashed bytes.
#[derive(Debug, Clone, Serialize)]
struct AttestationPayload {
    random: u32,
    timestamp: String,
    hash_alg: &'static str,
    signature_type: &'static str,
}

/// Orchestrates one attestation: build payload, canonicalize and hash,
/// sign classically (mandatory), sign post-quantum (best-effort with a
/// bounded timeout), merge into the requested shape. Single attempt per
/// signer, no retries.
pub struct Composer {
    signer: EcdsaSigner,
    pq: Option<Arc<dyn PqSigner>>,
    default_scheme: String,
    pq_timeout: Duration,
    entropy: Arc<dyn Entropy>,
    clock: Arc<dyn Clock>,
}

impl Composer {
    pub fn new(
        signer: EcdsaSigner,
        pq: Option<Arc<dyn PqSigner>>,
        default_scheme: impl Into<String>,
        pq_timeout: Duration,
    ) -> Self {
        Composer {
            signer,
            pq,
            default_scheme: default_scheme.into(),
            pq_timeout,
            entropy: Arc::new(OsEntropy),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the entropy source (test seam).
    pub fn with_entropy(mut self, entropy: Arc<dyn Entropy>) -> Self {
        self.entropy = entropy;
        self
    }

    /// Replace the clock (test seam).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Mint and attest one random value.
    pub async fn attest(&self, shape: ResponseShape) -> Result<AttestationResponse, SigningError> {
        let payload = AttestationPayload {
            random: self.entropy.random_u32(),
            timestamp: self.clock.now_utc().format(TIMESTAMP_FORMAT).to_string(),
            hash_alg: HASH_ALG,
            signature_type: SIGNATURE_TYPE,
        };
        let payload_value = serde_json::to_value(&payload)
            .map_err(|e| SigningError::Encoding(canonical::EncodingError::Serialize(e)))?;

        let canonical_bytes = canonical::canonical_bytes(&payload_value)?;
        let msg_hash = digest::sha256(&canonical_bytes);

        // PQ signing has no data dependency on the classical signature;
        // dispatch it first, then sign classically while it runs.
        let pq_pending = self.dispatch_pq(&payload_value);
        let ecdsa = self.signer.sign_digest(&msg_hash)?;
        let pq_outcome = self.await_pq(pq_pending).await;

        if let PqOutcome::Failed(reason) = &pq_outcome {
            warn!(%reason, "pq signing failed, continuing without pq signature");
        }
        let pq_fields = pq::resolve_fields(&pq_outcome, &self.default_scheme);

        let response = match shape {
            ResponseShape::Dual => AttestationResponse::Dual(Box::new(DualResponse {
                random: payload.random,
                timestamp: payload.timestamp,
                hash_alg: HASH_ALG.to_string(),
                signature_type: SIGNATURE_TYPE.to_string(),
                msg_hash: ecdsa.msg_hash.clone(),
                v: ecdsa.v,
                r: ecdsa.r,
                s: ecdsa.s,
                signer_addr: ecdsa.signer_addr,
                sig_pq_b64: pq_fields.sig_b64,
                pq_pubkey_b64: pq_fields.pubkey_b64,
                pq_scheme: pq_fields.scheme,
                mode: "dual".to_string(),
                version: RESPONSE_VERSION.to_string(),
            })),
            ResponseShape::Full => AttestationResponse::Full(Box::new(FullResponse {
                payload: PayloadView {
                    random: payload.random,
                    timestamp: payload.timestamp,
                    hash_alg: HASH_ALG.to_string(),
                    signature_type: SIGNATURE_TYPE.to_string(),
                    msg_hash: ecdsa.msg_hash.clone(),
                },
                ecdsa: EcdsaBlock {
                    v: ecdsa.v,
                    r: ecdsa.r,
                    s: ecdsa.s,
                    msg_hash: ecdsa.msg_hash,
                    signer_addr: ecdsa.signer_addr,
                },
                pq: PqBlock {
                    sig_pq_b64: pq_fields.sig_b64.unwrap_or_default(),
                    pq_pubkey_b64: pq_fields.pubkey_b64.unwrap_or_default(),
                    pq_scheme: pq_fields.scheme,
                },
                mode: "full".to_string(),
                version: RESPONSE_VERSION.to_string(),
            })),
        };
        Ok(response)
    }

    fn dispatch_pq(
        &self,
        payload: &Value,
    ) -> Option<JoinHandle<Result<Map<String, Value>, PqError>>> {
        let signer = self.pq.clone()?;
        let payload = payload.clone();
        Some(tokio::task::spawn_blocking(move || signer.sign(&payload)))
    }

    async fn await_pq(
        &self,
        pending: Option<JoinHandle<Result<Map<String, Value>, PqError>>>,
    ) -> PqOutcome {
        let Some(handle) = pending else {
            return PqOutcome::Absent;
        };
        match tokio::time::timeout(self.pq_timeout, handle).await {
            Ok(Ok(Ok(fields))) => PqOutcome::Signed(fields),
            Ok(Ok(Err(e))) => PqOutcome::Failed(e.to_string()),
            Ok(Err(join_err)) => PqOutcome::Failed(format!("pq task panicked: {join_err}")),
            Err(_) => PqOutcome::Failed(format!(
                "pq signing timed out after {}ms",
                self.pq_timeout.as_millis()
            )),
        }
    }
}
