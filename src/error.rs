//! Error types for PDL conversion
//!
//! Two tiers: validation-kind failures (the document has the wrong shape) and
//! everything else (I/O, malformed YAML). The command surface picks its exit
//! code from [`ConvertError::is_validation`].

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("PDL root must be a mapping/object.")]
    RootNotMapping { path: PathBuf },

    #[error("{}", render_defects(.path, .defects))]
    Validation { path: PathBuf, defects: Vec<String> },

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to serialize experiment config for {}: {source}", .path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to scan directory {}: {message}", .path.display())]
    ReadDir { path: PathBuf, message: String },

    #[error("Invalid file pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

impl ConvertError {
    /// True for failures caused by the document's shape rather than by I/O or parsing.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ConvertError::RootNotMapping { .. } | ConvertError::Validation { .. }
        )
    }

    /// Defects carried by a validation failure, empty for other kinds.
    pub fn defects(&self) -> &[String] {
        match self {
            ConvertError::Validation { defects, .. } => defects,
            _ => &[],
        }
    }
}

fn render_defects(path: &std::path::Path, defects: &[String]) -> String {
    let details = defects
        .iter()
        .map(|d| format!("- {}", d))
        .collect::<Vec<_>>()
        .join("\n");
    format!("PDL validation failed for {}:\n{}", path.display(), details)
}
