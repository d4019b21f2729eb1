//! Macro presets: named bundles of agents, execution mode, and size knobs.
//!
//! A [`MacroSchema`] is loaded once at startup. [`MacroSchema::resolve`]
//! turns an optional macro name into a single immutable [`MacroPreset`]
//! which is then passed explicitly to every component that needs a knob.

pub mod preset;
pub mod schema;

pub use preset::{ExecutionMode, MacroPreset, MacroResolution};
pub use schema::{
    AgentSpec, MacroDefinition, MacroSchema, QualityGateConfig, RetryPolicy, ValidationRules,
};
