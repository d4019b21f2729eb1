//! Macro schema document loader (`town/macros.json`).

use guildhall_domain::{DomainError, MacroSchema};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Schema location inside the agents directory.
pub const SCHEMA_PATH: &str = "town/macros.json";

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Invalid(#[from] DomainError),
}

pub struct SchemaLoader;

impl SchemaLoader {
    /// Load and validate the schema under `agents_dir`.
    ///
    /// A missing document yields the built-in defaults with a warning; a
    /// present but broken one is an error.
    pub fn load(agents_dir: &Path) -> Result<MacroSchema, SchemaError> {
        let path = agents_dir.join(SCHEMA_PATH);
        if !path.exists() {
            warn!(
                "Macro schema not found at {}; using built-in defaults",
                path.display()
            );
            return Ok(MacroSchema::default());
        }
        let text = std::fs::read_to_string(&path).map_err(|source| SchemaError::Io {
            path: path.clone(),
            source,
        })?;
        Self::parse(&text, &path)
    }

    pub fn parse(text: &str, path: &Path) -> Result<MacroSchema, SchemaError> {
        let schema: MacroSchema = serde_json::from_str(text).map_err(|source| SchemaError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        schema.validate()?;
        debug!(
            "Loaded macro schema: {} macros, {} roster agents",
            schema.macros.len(),
            schema.roster.len()
        );
        Ok(schema)
    }
}
