//! Error types shared by the store, input parsing and configuration

use std::path::PathBuf;
use thiserror::Error;

/// A required input was missing or malformed.
///
/// Always raised before the store is mutated.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("invalid {field}: '{value}'")]
    InvalidValue { field: &'static str, value: String },

    #[error("invalid requirement id: '{0}'")]
    InvalidId(String),

    #[error("no traced requirement ids were given")]
    EmptyTargetList,

    #[error("requirement {0} does not exist")]
    UnknownRequirement(i64),
}

/// Errors returned by `RequirementStore` operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A trace link in the batch already exists; the whole batch was rolled back
    #[error("traceability relationship {source_id} -> {target_id} already exists")]
    IntegrityConflict { source_id: i64, target_id: i64 },

    #[error("database {0:?} is already open in another process")]
    Locked(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// True when the error is a duplicate trace link
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::IntegrityConflict { .. })
    }

    /// Returns the validation failure, if this error is one
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            StoreError::Validation(e) => Some(e),
            _ => None,
        }
    }
}

/// Errors raised while locating or reading the config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to determine home directory")]
    NoHomeDir,

    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
