//! Code context assembly.
//!
//! Turns a resolved scope file list into one bounded excerpt:
//!
//! 1. [`relevance::rank_by_relevance`] orders files by task keywords and size
//! 2. [`pairing::pair_counterparts`] puts declaration/definition pairs together
//! 3. [`excerpt::assemble`] concatenates capped excerpts under a [`ContextBudget`]
//!
//! All of it is pure; reading files is the caller's job.

pub mod budget;
pub mod excerpt;
pub mod pairing;
pub mod relevance;

pub use budget::ContextBudget;
pub use excerpt::{FileExcerpt, NO_SCOPE_FILES, assemble};
pub use pairing::pair_counterparts;
pub use relevance::{ScopedFile, rank_by_relevance};
