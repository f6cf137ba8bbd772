//! Error types for parsing and persisting sale and amenity data

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaleError {
    #[error("Missing required field [{field}]")]
    MissingField { field: &'static str },

    #[error("Malformed value for field [{field}]: {value:?} ({reason})")]
    MalformedValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Could not access file {path:?}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl SaleError {
    pub fn missing(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    pub fn malformed(field: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self::MalformedValue {
            field,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn file_access(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source,
        }
    }
}

pub type SaleResult<T> = Result<T, SaleError>;
