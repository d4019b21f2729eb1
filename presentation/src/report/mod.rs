//! Markdown and JSON renderings of a finished run.
//!
//! Renderers are pure: they turn an [`AutorunReport`](guildhall_application::AutorunReport)
//! into text. Persisting that text is the job of [`crate::artifacts`].

#[cfg(test)]
pub(crate) mod fixtures;
pub mod next_task;
pub mod proposal;
pub mod run_report;
pub mod summary;

pub use next_task::{NextTask, render_next_task};
pub use proposal::render_proposal;
pub use run_report::{pipeline_status, render_full_log, render_report};
pub use summary::RunSummary;
