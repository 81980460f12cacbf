use std::io;
use std::path::PathBuf;

use serde::Serialize;

/// Per-line parse failures. All of these are recoverable: the driver
/// records the line number and moves on to the next line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
pub enum ParseError {
    #[error("expected 5 fields, got {0}")]
    FieldCount(usize),

    #[error("invalid status code: {0}")]
    InvalidStatus(String),

    #[error("timestamp too short for a minute bucket: {0}")]
    ShortTimestamp(String),
}

/// Batch-level failures. These abort the whole run before or after the
/// pipeline stages; individual bad lines never end up here.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("reading input {}: {source}", path.display())]
    Input { path: PathBuf, source: io::Error },

    #[error("writing report to {target}: {source}")]
    Output { target: String, source: io::Error },
}
