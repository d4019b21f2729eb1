//! Patch derivation from search/replace edit blocks.
//!
//! The generation backend is asked for `FILE / SEARCH / REPLACE` blocks
//! rather than a raw diff. This module holds the pure parts:
//!
//! - [`grammar`]: three block grammars tried in order
//! - [`block`]: edit blocks and the scope allowlist check
//! - [`matcher`]: exact, trailing-whitespace, and indent-agnostic matching
//! - [`diff`]: reading unified diffs and `--numstat` output

pub mod block;
pub mod diff;
pub mod grammar;
pub mod matcher;

pub use block::{EditBlock, PatchProposal};
pub use diff::{DiffStat, changed_files, extract_legacy_patch, numstat_paths, parse_numstat};
pub use grammar::{BlockGrammar, ParsedBlocks, parse_edit_blocks};
pub use matcher::{BlockOutcome, EditResult, MatchError, MatchTier, apply_blocks, apply_edit};
