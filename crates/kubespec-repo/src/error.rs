//! Error types for bundle loading and configuration

use kubespec_core::CoreError;
use thiserror::Error;

/// Bundle loading and configuration errors
#[derive(Debug, Error)]
pub enum RepoError {
    // ============ Configuration Errors ============
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    // ============ Bundle Errors ============
    #[error("Cannot read bundle {resource}: {message}")]
    Archive { resource: String, message: String },

    #[error("Malformed schema {member} in bundle {resource}: {source}")]
    MalformedSpec {
        resource: String,
        member: String,
        #[source]
        source: CoreError,
    },

    #[error("Bundle {resource} exceeds load limits: {message}")]
    LimitExceeded { resource: String, message: String },

    // ============ Cache Errors ============
    #[error("Cache error: {message}")]
    CacheError { message: String },

    // ============ IO Errors ============
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for bundle and configuration operations
pub type Result<T> = std::result::Result<T, RepoError>;

impl From<serde_yaml::Error> for RepoError {
    fn from(e: serde_yaml::Error) -> Self {
        RepoError::Serialization(e.to_string())
    }
}
