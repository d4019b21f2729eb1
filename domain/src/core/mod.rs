//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`] - domain-level errors
//! - [`string`] - UTF-8 safe truncation helpers used by every size budget

pub mod error;
pub mod string;
