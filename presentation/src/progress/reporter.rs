//! Progress reporting for pipeline runs

use colored::Colorize;
use guildhall_application::{ProgressNotifier, Stage};
use guildhall_domain::GateVerdict;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Mutex;

/// Reports progress with an indicatif bar per stage.
///
/// Draws to stderr so stdout stays clean for the JSON summary.
pub struct ProgressReporter {
    multi: MultiProgress,
    stage_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::with_draw_target(ProgressDrawTarget::stderr()),
            stage_bar: Mutex::new(None),
        }
    }

    fn stage_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=>-")
    }

    fn stage_display_name(stage: Stage) -> &'static str {
        match stage {
            Stage::Agents => "Agents",
            Stage::GuildReview => "Guild Review",
            Stage::Patch => "Patch",
            Stage::Apply => "Apply",
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        let guard = self.stage_bar.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(pb) = guard.as_ref() {
            f(pb);
        }
    }

    fn verdict_mark(verdict: GateVerdict, cache_hit: bool) -> String {
        let mark = match verdict {
            GateVerdict::Pass => "v".green(),
            GateVerdict::Retry | GateVerdict::Warn => "!".yellow(),
            GateVerdict::Halt => "x".red(),
        };
        if cache_hit {
            format!("{} {}", mark, "(cached)".dimmed())
        } else {
            mark.to_string()
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_stage_start(&self, stage: Stage, total: usize) {
        let pb = self.multi.add(ProgressBar::new(total as u64));
        pb.set_style(Self::stage_style());
        pb.set_prefix(Self::stage_display_name(stage).to_string());
        pb.set_message("Starting...");

        *self.stage_bar.lock().unwrap_or_else(|p| p.into_inner()) = Some(pb);
    }

    fn on_agent_start(&self, agent: &str, _index: usize) {
        self.with_bar(|pb| pb.set_message(agent.to_string()));
    }

    fn on_agent_complete(&self, agent: &str, verdict: GateVerdict, cache_hit: bool) {
        self.with_bar(|pb| {
            pb.set_message(format!("{} {}", Self::verdict_mark(verdict, cache_hit), agent));
            pb.inc(1);
        });
    }

    fn on_agent_skipped(&self, agent: &str) {
        self.with_bar(|pb| {
            pb.set_message(format!("{} {}", "-".dimmed(), agent));
            pb.inc(1);
        });
    }

    fn on_backend_retry(&self, attempt: u32, error: &str) {
        self.with_bar(|pb| pb.set_message(format!("retry {attempt}: {error}").yellow().to_string()));
    }

    fn on_stage_complete(&self, stage: Stage) {
        if let Some(pb) = self
            .stage_bar
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take()
        {
            pb.finish_with_message(format!("{} complete", stage.as_str().green()));
        }
    }
}

/// Simple text-based progress (no fancy UI), written to stderr
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_stage_start(&self, stage: Stage, total: usize) {
        eprintln!(
            "{} {} ({} steps)",
            "->".cyan(),
            ProgressReporter::stage_display_name(stage).bold(),
            total
        );
    }

    fn on_agent_complete(&self, agent: &str, verdict: GateVerdict, cache_hit: bool) {
        eprintln!(
            "  {} {} {}",
            ProgressReporter::verdict_mark(verdict, cache_hit),
            agent,
            verdict.as_str().dimmed()
        );
    }

    fn on_agent_skipped(&self, agent: &str) {
        eprintln!("  {} {} (skipped)", "-".dimmed(), agent);
    }

    fn on_backend_retry(&self, attempt: u32, error: &str) {
        eprintln!("  {} retry {}: {}", "!".yellow(), attempt, error);
    }

    fn on_stage_complete(&self, _stage: Stage) {
        eprintln!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reporter_survives_events_without_stage() {
        let reporter = ProgressReporter::new();
        reporter.on_agent_complete("C++ Lead", GateVerdict::Pass, false);
        reporter.on_stage_start(Stage::Agents, 2);
        reporter.on_agent_start("C++ Lead", 0);
        reporter.on_agent_complete("C++ Lead", GateVerdict::Halt, false);
        reporter.on_agent_skipped("Vulkan Guru");
        reporter.on_stage_complete(Stage::Agents);
        assert!(reporter.stage_bar.lock().unwrap().is_none());
    }

    #[test]
    fn test_verdict_mark_notes_cache() {
        colored::control::set_override(false);
        assert_eq!(ProgressReporter::verdict_mark(GateVerdict::Pass, true), "v (cached)");
        assert_eq!(ProgressReporter::verdict_mark(GateVerdict::Halt, false), "x");
    }
}
