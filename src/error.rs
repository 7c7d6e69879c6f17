//! Error types for clineval.

use thiserror::Error;

/// Result type for clineval operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for clineval operations.
///
/// Only run-fatal conditions travel as `Error`. Recoverable conditions
/// (skipped files, dropped rows, zeroed scores) are surfaced as
/// [`crate::diag::Diagnostic`] values instead.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Flat-table header does not match any known schema.
    ///
    /// A header mismatch means the file belongs to a different subtask or is
    /// malformed as a whole, so the run cannot continue.
    #[error(
        "unrecognized header in {path}: [{found}]; expected one of \
         [filename, mark, label, off0, off1, span], \
         [filename, mark, label, off0, off1, span, code] or \
         [filename, mark, label, off0, off1, span, code, semantic_rel]"
    )]
    HeaderShape {
        /// Path of the offending table file.
        path: String,
        /// The header columns actually found, comma-joined.
        found: String,
    },

    /// A flat-table row could not be interpreted.
    #[error("table parse error in {path}: {detail}")]
    Table {
        /// Path of the offending table file.
        path: String,
        /// What went wrong with the row.
        detail: String,
    },

    /// An input produced no annotations where annotations are required.
    #[error("no parsed {side} annotations in {path}")]
    EmptyInput {
        /// Which side of the evaluation is empty ("gold standard" or "predicted").
        side: String,
        /// The input path that produced nothing.
        path: String,
    },

    /// The run was configured inconsistently.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Create a header-shape error.
    pub fn header_shape(path: impl Into<String>, found: &[String]) -> Self {
        Error::HeaderShape {
            path: path.into(),
            found: found.join(", "),
        }
    }

    /// Create a table parse error.
    pub fn table(path: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::Table {
            path: path.into(),
            detail: detail.into(),
        }
    }

    /// Create an empty-input error.
    pub fn empty_input(side: impl Into<String>, path: impl Into<String>) -> Self {
        Error::EmptyInput {
            side: side.into(),
            path: path.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}
