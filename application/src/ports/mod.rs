//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod artifact_store;
pub mod command_runner;
pub mod generation;
pub mod metrics_ledger;
pub mod output_cache;
pub mod progress;
pub mod version_control;
pub mod workspace;
