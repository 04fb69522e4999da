use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{Map, Value};

/// Accepted field-name aliases for the PQ signature blob, in priority order.
pub const SIG_ALIASES: [&str; 3] = ["sig_pq_b64", "pq_sig_b64", "sig_b64"];
/// Accepted aliases for the PQ public key blob, in priority order.
pub const PUBKEY_ALIASES: [&str; 4] = [
    "pq_pubkey_b64",
    "pubkey_pq_b64",
    "pubkey_b64_pq",
    "pubkey_b64",
];
/// Accepted aliases for the PQ scheme name, in priority order.
pub const SCHEME_ALIASES: [&str; 2] = ["pq_scheme", "scheme"];

#[derive(Debug, thiserror::Error)]
#[error("pq signer failed: {0}")]
pub struct PqError(pub String);

/// Pluggable post-quantum signing capability. Implementations may be
/// stubs returning static blobs or real signers; historical backends
/// disagree on output field names, so the raw mapping is returned as-is
/// and normalized later via the alias tables above.
pub trait PqSigner: Send + Sync {
    fn sign(&self, payload: &Value) -> Result<Map<String, Value>, PqError>;
}

/// Outcome of one best-effort PQ signing attempt. `Failed` is absorbed
/// by the composer (logged, never surfaced to the caller) so the
/// swallowed-failure path stays visible in signatures and tests.
#[derive(Debug, Clone, PartialEq)]
pub enum PqOutcome {
    Signed(Map<String, Value>),
    Absent,
    Failed(String),
}

impl PqOutcome {
    fn fields(&self) -> Option<&Map<String, Value>> {
        match self {
            PqOutcome::Signed(map) => Some(map),
            _ => None,
        }
    }
}

/// PQ fields after alias resolution. Blob fields stay `None` when no
/// non-empty value was found; the scheme always resolves, falling back
/// to the configured default so the output schema is stable.
#[derive(Debug, Clone, PartialEq)]
pub struct PqFields {
    pub sig_b64: Option<String>,
    pub pubkey_b64: Option<String>,
    pub scheme: String,
}

/// Normalize a PQ outcome: for each output field, pick the first
/// non-empty string among its aliases.
pub fn resolve_fields(outcome: &PqOutcome, default_scheme: &str) -> PqFields {
    let lookup = |aliases: &[&str]| -> Option<String> {
        let map = outcome.fields()?;
        aliases.iter().find_map(|key| {
            map.get(*key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
    };

    PqFields {
        sig_b64: lookup(&SIG_ALIASES),
        pubkey_b64: lookup(&PUBKEY_ALIASES),
        scheme: lookup(&SCHEME_ALIASES).unwrap_or_else(|| default_scheme.to_string()),
    }
}

/// Stub signer returning statically configured blobs. Stands in for a
/// real ML-DSA backend; blobs default to empty, which downstream
/// resolution treats the same as absent.
pub struct EnvStubSigner {
    scheme: String,
    sig_b64: String,
    pubkey_b64: String,
}

impl EnvStubSigner {
    pub fn new(
        scheme: impl Into<String>,
        sig_b64: impl Into<String>,
        pubkey_b64: impl Into<String>,
    ) -> Result<Self, PqError> {
        let sig_b64 = sig_b64.into();
        let pubkey_b64 = pubkey_b64.into();
        for (name, blob) in [("PQ_SIG_B64", &sig_b64), ("PQ_PUBKEY_B64", &pubkey_b64)] {
            if !blob.is_empty() && BASE64.decode(blob).is_err() {
                return Err(PqError(format!("{name} is not valid base64")));
            }
        }
        Ok(EnvStubSigner {
            scheme: scheme.into(),
            sig_b64,
            pubkey_b64,
        })
    }
}

impl PqSigner for EnvStubSigner {
    fn sign(&self, _payload: &Value) -> Result<Map<String, Value>, PqError> {
        let mut out = Map::new();
        out.insert("sig_pq_b64".to_string(), Value::String(self.sig_b64.clone()));
        out.insert(
            "pq_pubkey_b64".to_string(),
            Value::String(self.pubkey_b64.clone()),
        );
        out.insert("pq_scheme".to_string(), Value::String(self.scheme.clone()));
        Ok(out)
    }
}
