//! Guild review: API inventory and the reviewer's verdict.

pub mod inventory;
pub mod verdict;

pub use inventory::{ApiInventory, api_inventory};
pub use verdict::{GuildReview, ReviewVerdict, parse_review};
