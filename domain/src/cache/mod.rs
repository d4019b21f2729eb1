//! Determinism fingerprints.
//!
//! A fingerprint is a SHA-256 digest over exactly the inputs that
//! determine an agent's output. Equal fingerprints mean the stored output
//! can be reused without a backend call.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Digest of `task|context|agent|macro`.
    pub fn compute(task: &str, context: &str, agent: &str, macro_name: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(task.as_bytes());
        hasher.update(b"|");
        hasher.update(context.as_bytes());
        hasher.update(b"|");
        hasher.update(agent.as_bytes());
        hasher.update(b"|");
        hasher.update(macro_name.as_bytes());
        let digest = hasher.finalize();
        Self(digest.iter().map(|b| format!("{b:02x}")).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading characters for log lines.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
