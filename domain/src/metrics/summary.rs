//! Dashboard over a trailing window of metric records.

use super::record::{GateOutcome, MetricRecord};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgentReliability {
    pub total: usize,
    pub passed: usize,
}

impl AgentReliability {
    pub fn percent(&self) -> usize {
        percent(self.passed, self.total)
    }
}

fn percent(part: usize, total: usize) -> usize {
    100 * part / total.max(1)
}

/// Aggregates over a set of records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSummary {
    pub window_days: i64,
    pub total: usize,
    pub passed: usize,
    pub retried: usize,
    pub halted: usize,
    pub warned: usize,
    pub cache_hits: usize,
    pub avg_latency_ms: f64,
    pub per_agent: BTreeMap<String, AgentReliability>,
}

impl MetricsSummary {
    pub fn from_records(records: &[MetricRecord], window_days: i64) -> Self {
        let mut summary = Self {
            window_days,
            total: records.len(),
            ..Self::default()
        };
        let mut latency: u64 = 0;
        for r in records {
            match r.gate_result {
                GateOutcome::Pass => summary.passed += 1,
                GateOutcome::Retry => summary.retried += 1,
                GateOutcome::Halt => summary.halted += 1,
                GateOutcome::Warn => summary.warned += 1,
                GateOutcome::Cache | GateOutcome::Skipped => {}
            }
            if r.cache_hit {
                summary.cache_hits += 1;
            }
            latency += r.latency_ms;
            let agent = summary.per_agent.entry(r.agent.clone()).or_default();
            agent.total += 1;
            if r.gate_result == GateOutcome::Pass {
                agent.passed += 1;
            }
        }
        summary.avg_latency_ms = latency as f64 / records.len().max(1) as f64;
        summary
    }

    /// Markdown dashboard.
    pub fn render_markdown(&self) -> String {
        if self.total == 0 {
            return "No trailing metrics available yet.".to_string();
        }
        let t = self.total;
        let mut lines = vec![
            format!("## Pipeline Metrics (trailing {} days)", self.window_days),
            String::new(),
            "| Metric | Value |".to_string(),
            "|--------|-------|".to_string(),
            format!("| Total agent calls | {t} |"),
            format!("| Pass rate | {}/{t} ({}%) |", self.passed, percent(self.passed, t)),
            format!("| Retry rate | {}/{t} |", self.retried),
            format!("| Halt rate | {}/{t} |", self.halted),
            format!("| Warn rate | {}/{t} |", self.warned),
            format!(
                "| Cache hit rate | {}/{t} ({}%) |",
                self.cache_hits,
                percent(self.cache_hits, t)
            ),
            format!("| Avg latency | {:.0}ms |", self.avg_latency_ms),
            String::new(),
            "### Agent Reliability".to_string(),
            String::new(),
            "| Agent | Pass Rate |".to_string(),
            "|-------|-----------|".to_string(),
        ];
        for (agent, stats) in &self.per_agent {
            lines.push(format!(
                "| {agent} | {}/{} ({}%) |",
                stats.passed,
                stats.total,
                stats.percent()
            ));
        }
        lines.join("\n")
    }
}
