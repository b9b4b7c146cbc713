// Pipeline error types - structural failures that halt the run
//
// Two error classes exist in this system. Structural problems (a required
// file or column is absent) are fatal and stop the chain. Data-level
// problems (unparseable numbers, malformed region text, missing cells) are
// NOT errors: cleaning filters them and quality counts them.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A stage input file does not exist on disk.
    #[error("required file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The file exists but its header is missing a required column.
    #[error("required column '{column}' missing from {}", .path.display())]
    MissingColumn { column: String, path: PathBuf },

    /// A persisted table could not be read back (truncated, ragged, or
    /// not CSV at all). Distinct from an empty-but-well-formed table,
    /// which is valid.
    #[error("malformed table file {}: {reason}", .path.display())]
    MalformedTable { path: PathBuf, reason: String },
}
