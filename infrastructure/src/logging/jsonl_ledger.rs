//! JSONL metrics ledger.
//!
//! Each [`MetricRecord`] is serialized as one JSON line and appended to
//! `town/metrics.jsonl`. The file is opened per append so concurrent runs
//! on the same checkout interleave whole lines.

use chrono::{DateTime, Utc};
use guildhall_application::ports::metrics_ledger::MetricsLedger;
use guildhall_domain::MetricRecord;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Ledger location inside the agents directory.
pub const LEDGER_PATH: &str = "town/metrics.jsonl";

pub struct JsonlMetricsLedger {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonlMetricsLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn in_agents_dir(agents_dir: &Path) -> Self {
        Self::new(agents_dir.join(LEDGER_PATH))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lines(&self) -> Vec<String> {
        std::fs::read_to_string(&self.path)
            .map(|text| {
                text.lines()
                    .filter(|l| !l.trim().is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn write_line(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)
    }
}

impl MetricsLedger for JsonlMetricsLedger {
    fn append(&self, record: &MetricRecord) {
        let line = match serde_json::to_string(record) {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to serialize metric record: {}", e);
                return;
            }
        };
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        if let Err(e) = self.write_line(&line) {
            warn!("Failed to append to {}: {}", self.path.display(), e);
        }
    }

    fn since(&self, since: DateTime<Utc>) -> Vec<MetricRecord> {
        let mut skipped = 0usize;
        let records: Vec<MetricRecord> = self
            .lines()
            .iter()
            .filter_map(|line| match serde_json::from_str::<MetricRecord>(line) {
                Ok(record) => Some(record),
                Err(_) => {
                    skipped += 1;
                    None
                }
            })
            .filter(|r| r.timestamp >= since)
            .collect();
        if skipped > 0 {
            debug!("Skipped {} unreadable ledger lines", skipped);
        }
        records
    }

    fn tail(&self, n: usize) -> Vec<String> {
        let lines = self.lines();
        let start = lines.len().saturating_sub(n);
        lines[start..].to_vec()
    }
}
