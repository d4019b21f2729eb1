//! Quality gate: structural and semantic checks on one agent output.
//!
//! Rules run in a fixed order and the first decisive rule wins:
//!
//! | Order | Rule | Verdict |
//! |-------|------|---------|
//! | 1 | Output shorter than the minimum | RETRY |
//! | 1 | Fewer sections than required | RETRY |
//! | 2 | Dissent ratio above threshold | HALT |
//! | 3 | `Combined confidence: LOW` (if enabled) | HALT |
//! | 4 | References to missing source files | WARN |
//! | 5 | Nothing found | PASS |

pub mod file_refs;

pub use file_refs::referenced_source_files;

use crate::macros::{MacroPreset, MacroSchema};
use crate::output::{Confidence, MarkerCounts, count_markers, count_sections, extract_confidence};
use serde::{Deserialize, Serialize};

/// Gate judgment for a single output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateVerdict {
    Pass,
    Retry,
    Warn,
    Halt,
}

impl GateVerdict {
    pub fn is_halt(&self) -> bool {
        matches!(self, GateVerdict::Halt)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GateVerdict::Pass => "PASS",
            GateVerdict::Retry => "RETRY",
            GateVerdict::Warn => "WARN",
            GateVerdict::Halt => "HALT",
        }
    }
}

impl std::fmt::Display for GateVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Thresholds for one evaluation, resolved from the schema and preset.
#[derive(Debug, Clone, PartialEq)]
pub struct GateRules {
    pub min_output_length: usize,
    pub sections: Vec<String>,
    pub required_sections: usize,
    pub dissent_threshold: f64,
    pub halt_on_low_confidence: bool,
    pub validate_file_refs: bool,
    pub source_extensions: Vec<String>,
}

impl GateRules {
    pub fn from_schema(schema: &MacroSchema, preset: &MacroPreset) -> Self {
        Self {
            min_output_length: schema.validation.min_output_length,
            sections: schema.gate_sections(preset),
            required_sections: schema.required_section_count(preset),
            dissent_threshold: schema.quality_gates.dissent_threshold,
            halt_on_low_confidence: schema.quality_gates.halt_on_low_confidence,
            validate_file_refs: schema.quality_gates.validate_file_refs,
            source_extensions: schema.quality_gates.source_extensions.clone(),
        }
    }
}

/// Verdict plus everything measured along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct GateReport {
    pub verdict: GateVerdict,
    pub message: String,
    pub sections_found: usize,
    pub markers: MarkerCounts,
    pub confidence: Confidence,
    pub invalid_file_refs: Vec<String>,
}

impl GateReport {
    fn new(verdict: GateVerdict, message: impl Into<String>) -> Self {
        Self {
            verdict,
            message: message.into(),
            sections_found: 0,
            markers: MarkerCounts::default(),
            confidence: Confidence::Unknown,
            invalid_file_refs: Vec::new(),
        }
    }

    /// A second consecutive RETRY becomes a WARN so the run proceeds.
    pub fn downgrade_retry(mut self) -> Self {
        if self.verdict == GateVerdict::Retry {
            self.verdict = GateVerdict::Warn;
            self.message = format!("Persistent structural failure: {}", self.message);
        }
        self
    }
}

/// Evaluate `output` against `rules`.
///
/// `exists` answers whether a repository-relative path exists; it is the
/// only window onto the working tree.
pub fn evaluate(output: &str, rules: &GateRules, exists: impl Fn(&str) -> bool) -> GateReport {
    let length = output.trim().len();
    let sections_found = count_sections(output, &rules.sections);
    let markers = count_markers(output);
    let confidence = extract_confidence(output);

    let measured = |verdict, message: String| GateReport {
        sections_found,
        markers,
        confidence,
        ..GateReport::new(verdict, message)
    };

    if length < rules.min_output_length {
        return measured(
            GateVerdict::Retry,
            format!(
                "Output too short ({length} chars, minimum {}). Rewrite with all required sections.",
                rules.min_output_length
            ),
        );
    }

    if sections_found < rules.required_sections {
        return measured(
            GateVerdict::Retry,
            format!(
                "Missing sections: {sections_found}/{} found. Include: {}",
                rules.required_sections,
                rules.sections.join(", ")
            ),
        );
    }

    if let Some(ratio) = markers.dissent_ratio()
        && ratio > rules.dissent_threshold
    {
        return measured(
            GateVerdict::Halt,
            format!(
                "High dissent: {}/{} findings marked DISSENT (threshold {:.0}%). Halting pipeline.",
                markers.dissent,
                markers.total(),
                rules.dissent_threshold * 100.0
            ),
        );
    }

    if rules.halt_on_low_confidence && confidence == Confidence::Low {
        return measured(
            GateVerdict::Halt,
            "Combined confidence is LOW. Halting pipeline, not safe to continue.".to_string(),
        );
    }

    if rules.validate_file_refs {
        let bad: Vec<String> = referenced_source_files(output, &rules.source_extensions)
            .into_iter()
            .filter(|path| !exists(path) && !exists(&format!("src/{path}")))
            .collect();
        if !bad.is_empty() {
            let shown = bad.iter().take(5).cloned().collect::<Vec<_>>().join(", ");
            let mut report = measured(
                GateVerdict::Warn,
                format!("References non-existent files: {shown}"),
            );
            report.invalid_file_refs = bad;
            return report;
        }
    }

    measured(GateVerdict::Pass, "All gates passed.".to_string())
}
