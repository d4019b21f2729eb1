//! One ledger entry per agent invocation.

use crate::gate::GateVerdict;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Gate result as recorded in the ledger.
///
/// Cache hits and skips are recorded distinctly so dashboards do not
/// count them as fresh passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateOutcome {
    Pass,
    Retry,
    Warn,
    Halt,
    Cache,
    Skipped,
}

impl From<GateVerdict> for GateOutcome {
    fn from(verdict: GateVerdict) -> Self {
        match verdict {
            GateVerdict::Pass => GateOutcome::Pass,
            GateVerdict::Retry => GateOutcome::Retry,
            GateVerdict::Warn => GateOutcome::Warn,
            GateVerdict::Halt => GateOutcome::Halt,
        }
    }
}

/// Append-only record. Never mutated after it is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub timestamp: DateTime<Utc>,
    pub run_id: String,
    pub agent: String,
    #[serde(rename = "macro")]
    pub macro_name: String,
    pub task_id: String,
    pub fingerprint: String,
    pub latency_ms: u64,
    pub prompt_chars: usize,
    pub output_chars: usize,
    pub gate_result: GateOutcome,
    pub sections_found: usize,
    pub concur_count: usize,
    pub qualify_count: usize,
    pub dissent_count: usize,
    pub confidence: String,
    pub cache_hit: bool,
    #[serde(default)]
    pub attempts: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> MetricRecord {
        MetricRecord {
            timestamp: "2026-03-01T10:00:00Z".parse().unwrap(),
            run_id: "2026-03-01-charge-a".to_string(),
            agent: "C++ Lead".to_string(),
            macro_name: "charge".to_string(),
            task_id: "GEN-1".to_string(),
            fingerprint: "abc".to_string(),
            latency_ms: 1200,
            prompt_chars: 5000,
            output_chars: 900,
            gate_result: GateOutcome::Pass,
            sections_found: 9,
            concur_count: 1,
            qualify_count: 0,
            dissent_count: 0,
            confidence: "HIGH".to_string(),
            cache_hit: false,
            attempts: 1,
        }
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["macro"], "charge");
        assert_eq!(json["gate_result"], "PASS");
        assert_eq!(json["cache_hit"], false);
    }

    #[test]
    fn test_reads_records_without_attempts() {
        let mut json = serde_json::to_value(record()).unwrap();
        json.as_object_mut().unwrap().remove("attempts");
        let back: MetricRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back.attempts, 0);
    }

    #[test]
    fn test_from_verdict() {
        assert_eq!(GateOutcome::from(GateVerdict::Halt), GateOutcome::Halt);
    }
}
