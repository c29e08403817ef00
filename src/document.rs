//! PDL document loading
//!
//! A PDL document is kept as a generic key-ordered YAML mapping. Only the
//! root shape is checked here; everything below the root is the validator's
//! job.

use std::path::Path;

use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::error::ConvertError;

/// Loaded PDL document: the root mapping, in source key order.
#[derive(Debug, Clone, PartialEq)]
pub struct PdlDocument {
    root: Mapping,
}

impl PdlDocument {
    pub fn new(root: Mapping) -> Self {
        Self { root }
    }

    /// Raw value for a top-level key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    /// The `scenario` entry when it is a mapping.
    pub fn scenario(&self) -> Option<&Mapping> {
        self.get("scenario").and_then(Value::as_mapping)
    }

    /// `scenario.id` when it is a string (may be blank).
    pub fn scenario_id(&self) -> Option<&str> {
        self.scenario()
            .and_then(|s| s.get("id"))
            .and_then(Value::as_str)
    }

    /// `entities` when it is a sequence.
    pub fn entities(&self) -> Option<&[Value]> {
        self.get("entities")
            .and_then(Value::as_sequence)
            .map(Vec::as_slice)
    }

    /// `events` when it is a sequence. Absent or null events are not a list either.
    pub fn events(&self) -> Option<&[Value]> {
        self.get("events")
            .and_then(Value::as_sequence)
            .map(Vec::as_slice)
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.root
    }

    pub fn into_mapping(self) -> Mapping {
        self.root
    }
}

/// Read and parse a PDL file.
pub fn load_pdl_file(path: &Path) -> Result<PdlDocument, ConvertError> {
    debug!("Loading PDL document from {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|source| ConvertError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_pdl_str(&content, path)
}

/// Parse PDL text. `origin` is only used to label errors.
pub fn parse_pdl_str(content: &str, origin: &Path) -> Result<PdlDocument, ConvertError> {
    let value: Value = serde_yaml::from_str(content).map_err(|source| ConvertError::Parse {
        path: origin.to_path_buf(),
        source,
    })?;

    match value {
        Value::Mapping(root) => Ok(PdlDocument::new(root)),
        _ => Err(ConvertError::RootNotMapping {
            path: origin.to_path_buf(),
        }),
    }
}
