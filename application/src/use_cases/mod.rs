//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod apply_patch;
pub mod build_context;
pub mod generate;
pub mod generate_patch;
pub mod governance;
pub mod guild_review;
pub mod run_autorun;
pub mod run_pipeline;
pub mod scope;
pub mod self_task;
