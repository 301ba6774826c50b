//! Error types for the storage module.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Failures while reading, writing or decoding a session snapshot.
#[derive(Debug, Error, Diagnostic)]
pub enum SnapshotError {
    /// Filesystem access failed.
    #[error("Failed to access {}: {source}", path.display())]
    #[diagnostic(
        code("COMBAT::SNAPSHOT_IO"),
        help("Check that the data directory exists and is writable")
    )]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The text is not JSON at all.
    #[error("Malformed snapshot: {0}")]
    #[diagnostic(
        code("COMBAT::SNAPSHOT_PARSE"),
        help("Make sure the file is a combat export (valid JSON)")
    )]
    Parse(#[source] serde_json::Error),

    /// Valid JSON, but the top level is not an object.
    #[error("Snapshot must be a JSON object, found {found}")]
    #[diagnostic(
        code("COMBAT::SNAPSHOT_NOT_AN_OBJECT"),
        help("Combat exports start with '{{' and hold round, combatants and log")
    )]
    NotAnObject { found: &'static str },

    #[error("Failed to serialize snapshot: {0}")]
    #[diagnostic(code("COMBAT::SNAPSHOT_SERIALIZE"))]
    Serialize(#[source] serde_json::Error),
}

impl SnapshotError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
