//! Logging infrastructure: the append-only metrics ledger.
//!
//! Provides [`JsonlMetricsLedger`], a JSONL file writer that implements
//! the [`MetricsLedger`](guildhall_application::MetricsLedger) port.

mod jsonl_ledger;

pub use jsonl_ledger::{JsonlMetricsLedger, LEDGER_PATH};
