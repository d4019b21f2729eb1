//! Size budget for the code context section.

use serde::{Deserialize, Serialize};

/// Two knobs:
/// - `total_chars`: ceiling for the whole assembled context
/// - `per_file_chars`: ceiling for a single file excerpt (head+tail kept)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextBudget {
    total_chars: usize,
    per_file_chars: usize,
}

impl ContextBudget {
    pub fn new(total_chars: usize, per_file_chars: usize) -> Self {
        Self {
            total_chars,
            per_file_chars,
        }
    }

    pub fn total_chars(&self) -> usize {
        self.total_chars
    }

    pub fn per_file_chars(&self) -> usize {
        self.per_file_chars
    }

    pub fn with_total_chars(mut self, total_chars: usize) -> Self {
        self.total_chars = total_chars;
        self
    }
}

impl Default for ContextBudget {
    fn default() -> Self {
        Self {
            total_chars: 12_000,
            per_file_chars: 3_000,
        }
    }
}
