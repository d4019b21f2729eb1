//! Configuration loading for guildhall
//!
//! This module handles file I/O and merging of configuration from multiple
//! sources. The priority order (highest to lowest):
//!
//! 1. Environment variables (`LLM_MODEL`, `MACRO_MODE`, ...)
//! 2. `--config <path>` specified file
//! 3. Project root: `./guildhall.toml` or `./.guildhall.toml`
//! 4. Global: `~/.config/guildhall/config.toml`
//! 5. Default values
//!
//! The macro schema is a separate JSON document loaded by
//! [`SchemaLoader`].

mod file_config;
mod loader;
mod schema_loader;

pub use file_config::{
    ConfigValidationError, FileCacheConfig, FileConfig, FileContextConfig, FileLlmConfig,
    FilePatchConfig, FilePathsConfig, FileTaskConfig,
};
pub use loader::{ConfigLoader, ENV_KEYS};
pub use schema_loader::{SchemaError, SchemaLoader};
