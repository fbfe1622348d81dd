//! Error types for the generation and load stages.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fatal errors raised while generating a dataset.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("could not draw a unique email for user {user_id} after {attempts} attempts ({generated} unique emails so far)")]
    EmailsExhausted {
        user_id: u32,
        generated: usize,
        attempts: usize,
    },

    #[error("invalid generation config: {0}")]
    InvalidConfig(String),
}

/// Errors raised while loading a single flat file into the store.
///
/// Every variant names the file (or table) it concerns so a failed
/// ingest run can be resumed by hand.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("missing input file: {}", file.display())]
    MissingInputFile { file: PathBuf },

    #[error("malformed row in {} at line {line}: {reason}", file.display())]
    MalformedRow {
        file: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("duplicate key in {}: {column} = {value} (line {line})", file.display())]
    DuplicateKeyViolation {
        file: PathBuf,
        column: String,
        value: String,
        line: u64,
    },

    #[error("failed to read {}", file.display())]
    Io {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store error while loading {} into table {table}", file.display())]
    Store {
        file: PathBuf,
        table: String,
        #[source]
        source: duckdb::Error,
    },
}

impl LoadError {
    /// The input file this error concerns
    pub fn file(&self) -> &Path {
        match self {
            LoadError::MissingInputFile { file }
            | LoadError::MalformedRow { file, .. }
            | LoadError::DuplicateKeyViolation { file, .. }
            | LoadError::Io { file, .. }
            | LoadError::Store { file, .. } => file,
        }
    }
}

pub type LoadResult<T> = Result<T, LoadError>;
