//! Prompt domain
//!
//! [`composer`] builds the per-agent request body and enforces the prompt
//! ceiling; [`contract`] renders the output-structure contract;
//! [`PromptTemplate`] holds the fixed prompts for the auxiliary calls
//! (self task, guild review, patch generation).

pub mod composer;
pub mod contract;
mod template;

pub use composer::{AgentPromptInput, ComposedPrompt, PromptLimits, TrimStep, compose};
pub use contract::section_contract;
pub use template::{PatchPromptInput, PromptTemplate};
