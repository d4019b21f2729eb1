//! Presentation layer for guildhall
//!
//! This crate contains the CLI definition, markdown and JSON renderers for
//! finished runs, the artifact writer, console output and progress
//! reporters.

pub mod artifacts;
pub mod cli;
pub mod output;
pub mod progress;
pub mod report;

// Re-export commonly used types
pub use artifacts::{ArtifactPaths, ArtifactWriter};
pub use cli::commands::{Cli, OutputFormat};
pub use output::console::ConsoleFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
pub use report::RunSummary;
