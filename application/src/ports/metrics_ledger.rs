//! Port for the append-only metrics ledger.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while the ledger keeps one machine-readable
//! record per agent invocation (JSONL) across runs.

use chrono::{DateTime, Utc};
use guildhall_domain::MetricRecord;

/// Append-only record store.
///
/// `append` is intentionally synchronous and non-fallible so a logging
/// failure never disrupts the run. Records are never mutated or deleted.
pub trait MetricsLedger: Send + Sync {
    fn append(&self, record: &MetricRecord);

    /// Records with a timestamp at or after `since`.
    fn since(&self, since: DateTime<Utc>) -> Vec<MetricRecord>;

    /// The last `n` raw ledger lines.
    fn tail(&self, n: usize) -> Vec<String>;
}

/// No-op ledger for tests and dry runs.
pub struct NoMetricsLedger;

impl MetricsLedger for NoMetricsLedger {
    fn append(&self, _record: &MetricRecord) {}

    fn since(&self, _since: DateTime<Utc>) -> Vec<MetricRecord> {
        Vec::new()
    }

    fn tail(&self, _n: usize) -> Vec<String> {
        Vec::new()
    }
}
