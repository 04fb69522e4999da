use std::env;

use tracing::warn;

/// Demo key, not for production. Override with ECDSA_PRIVKEY=0x...
pub const DEFAULT_DEMO_PRIVKEY: &str =
    "0x59c6995e998f97a5a0044966f094538b292a2e2b0f1b9b7a0f6f4b9b9b2e8d4a";

const DEFAULT_API_KEY: &str = "demo";
const DEFAULT_PQ_SCHEME: &str = "ML-DSA-65(stub)";

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_int(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Immutable process configuration, loaded once at startup. The
/// classical secret lives here until it is handed to the signer; it is
/// never logged.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared secret checked against the X-API-Key header.
    pub api_key: String,
    /// Hex-encoded 32-byte secp256k1 secret (0x prefix optional).
    pub ecdsa_privkey: String,
    /// Scheme label reported when the PQ slot resolves none.
    pub pq_scheme: String,
    /// Optional static PQ demo blobs served by the stub signer.
    pub pq_pubkey_b64: String,
    pub pq_sig_b64: String,
    /// Budget for the best-effort PQ signing attempt.
    pub pq_timeout_ms: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = env_or("API_KEY", DEFAULT_API_KEY);
        if api_key.is_empty() {
            anyhow::bail!("API_KEY must not be empty");
        }
        if api_key == DEFAULT_API_KEY {
            warn!("API_KEY not set, using the public demo key");
        }

        let ecdsa_privkey = env_or("ECDSA_PRIVKEY", DEFAULT_DEMO_PRIVKEY);
        if ecdsa_privkey == DEFAULT_DEMO_PRIVKEY {
            warn!("ECDSA_PRIVKEY not set, using the public demo key");
        }

        let pq_timeout_ms = env_int("PQ_TIMEOUT_MS", 250) as u64;
        if pq_timeout_ms == 0 {
            anyhow::bail!("PQ_TIMEOUT_MS must be greater than 0");
        }

        Ok(Config {
            api_key,
            ecdsa_privkey,
            pq_scheme: env_or("PQ_SCHEME", DEFAULT_PQ_SCHEME),
            pq_pubkey_b64: env_or("PQ_PUBKEY_B64", ""),
            pq_sig_b64: env_or("PQ_SIG_B64", ""),
            pq_timeout_ms,
        })
    }
}
