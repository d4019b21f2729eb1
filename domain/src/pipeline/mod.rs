//! Pipeline run state.
//!
//! [`PipelineRun`] owns the per-agent outcomes, the rolling handoff text,
//! and the halt flag. Once set, the halt is never cleared.

pub mod handoff;
pub mod record;

pub use handoff::{INDEPENDENT_HANDOFF, INITIAL_HANDOFF, carry_forward, lead_handoff};
pub use record::{AgentOutcome, AgentOutputRecord};

use chrono::{DateTime, Utc};

/// What stopped the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltSource {
    Gate,
    GuildReview,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HaltReason {
    pub source: HaltSource,
    pub agent: String,
    pub message: String,
}

impl std::fmt::Display for HaltReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.agent, self.message)
    }
}

/// `<date>-<macro|run>-<HHMMSS>`.
pub fn run_id(at: DateTime<Utc>, macro_name: Option<&str>) -> String {
    let label = macro_name
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_lowercase)
        .unwrap_or_else(|| "run".to_string());
    format!("{}-{label}-{}", at.format("%Y-%m-%d"), at.format("%H%M%S"))
}

#[derive(Debug, Clone)]
pub struct PipelineRun {
    run_id: String,
    outcomes: Vec<AgentOutcome>,
    halt: Option<HaltReason>,
    handoff: String,
}

impl PipelineRun {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            outcomes: Vec::new(),
            halt: None,
            handoff: INITIAL_HANDOFF.to_string(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn is_halted(&self) -> bool {
        self.halt.is_some()
    }

    pub fn halt_reason(&self) -> Option<&HaltReason> {
        self.halt.as_ref()
    }

    /// Halt the run. The first reason sticks; later calls are ignored.
    pub fn halt(&mut self, reason: HaltReason) {
        if self.halt.is_none() {
            self.halt = Some(reason);
        }
    }

    pub fn handoff(&self) -> &str {
        &self.handoff
    }

    pub fn set_handoff(&mut self, handoff: String) {
        self.handoff = handoff;
    }

    pub fn record(&mut self, outcome: AgentOutcome) {
        self.outcomes.push(outcome);
    }

    /// Record a skip for an agent scheduled after the halt.
    pub fn skip(&mut self, agent: &str) {
        let reason = self
            .halt
            .as_ref()
            .map(|h| h.to_string())
            .unwrap_or_else(|| "pipeline halted".to_string());
        self.outcomes.push(AgentOutcome::Skipped {
            agent: agent.to_string(),
            reason,
        });
    }

    pub fn outcomes(&self) -> &[AgentOutcome] {
        &self.outcomes
    }

    pub fn completed(&self) -> impl Iterator<Item = &AgentOutputRecord> {
        self.outcomes.iter().filter_map(AgentOutcome::as_completed)
    }

    /// `(agent, public text)` for every completed agent, in order.
    pub fn public_outputs(&self) -> Vec<(String, String)> {
        self.completed()
            .map(|r| (r.agent.clone(), r.public_text().to_string()))
            .collect()
    }

    /// `(agent, recommendation)` for every agent that left one.
    pub fn next_run_recommendations(&self) -> Vec<(String, String)> {
        self.completed()
            .filter_map(|r| r.fields.next_run.clone().map(|n| (r.agent.clone(), n)))
            .collect()
    }

    /// Completed output of one agent.
    pub fn output_of(&self, agent: &str) -> Option<&AgentOutputRecord> {
        self.completed().find(|r| r.agent == agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(agent: &str) -> HaltReason {
        HaltReason {
            source: HaltSource::Gate,
            agent: agent.to_string(),
            message: "High dissent".to_string(),
        }
    }

    #[test]
    fn test_run_id_format() {
        let at: DateTime<Utc> = "2026-03-04T05:06:07Z".parse().unwrap();
        assert_eq!(run_id(at, Some("Charge")), "2026-03-04-charge-050607");
        assert_eq!(run_id(at, None), "2026-03-04-run-050607");
    }

    #[test]
    fn test_halt_is_irreversible_and_first_wins() {
        let mut run = PipelineRun::new("r");
        assert!(!run.is_halted());
        run.halt(reason("Lead"));
        run.halt(reason("Guru"));
        assert_eq!(run.halt_reason().unwrap().agent, "Lead");
        assert!(run.is_halted());
    }

    #[test]
    fn test_skip_records_reason() {
        let mut run = PipelineRun::new("r");
        run.halt(reason("Lead"));
        run.skip("Guru");
        match &run.outcomes()[0] {
            AgentOutcome::Skipped { agent, reason } => {
                assert_eq!(agent, "Guru");
                assert_eq!(reason, "Lead: High dissent");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(run.public_outputs().is_empty());
    }

    #[test]
    fn test_initial_handoff() {
        assert_eq!(PipelineRun::new("r").handoff(), INITIAL_HANDOFF);
    }
}
