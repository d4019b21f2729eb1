//! Determinism cache port
//!
//! Entries are keyed by [`Fingerprint`] and never evicted. Writing the same
//! fingerprint twice stores identical content, so no locking is needed.

use guildhall_domain::Fingerprint;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("Cache write failed for {fingerprint}: {message}")]
pub struct CacheError {
    pub fingerprint: String,
    pub message: String,
}

pub trait OutputCache: Send + Sync {
    fn lookup(&self, fingerprint: &Fingerprint) -> Option<String>;

    fn store(&self, fingerprint: &Fingerprint, output: &str) -> Result<(), CacheError>;
}

/// Cache that never hits and discards writes.
pub struct NoCache;

impl OutputCache for NoCache {
    fn lookup(&self, _fingerprint: &Fingerprint) -> Option<String> {
        None
    }

    fn store(&self, _fingerprint: &Fingerprint, _output: &str) -> Result<(), CacheError> {
        Ok(())
    }
}
