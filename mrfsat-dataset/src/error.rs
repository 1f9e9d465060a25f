//! Dataset error types

use std::path::PathBuf;
use thiserror::Error;

/// Error type for dataset preparation
#[derive(Error, Debug)]
pub enum DatasetError {
    /// A file could not be opened, read or written
    #[error("IO error on '{}': {source}", path.display())]
    Io {
        /// Offending path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
    /// CSV decoding or encoding failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// A required column is absent
    #[error("Missing column '{0}'")]
    MissingColumn(String),
    /// Pipeline configuration could not be parsed
    #[error("Config error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// Configuration or dataset shape is inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl DatasetError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for dataset operations
pub type DatasetResult<T> = Result<T, DatasetError>;
