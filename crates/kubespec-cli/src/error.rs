//! CLI error types with exit code handling

use kubespec_repo::RepoError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI error type that carries its exit code
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Invalid arguments that clap cannot catch
    #[error("{message}")]
    #[diagnostic(code(kubespec::cli::usage))]
    Usage {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// A queried resource or path has no schema
    #[error("{message}")]
    #[diagnostic(code(kubespec::cli::not_found))]
    NotFound {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Bundles could not be loaded
    #[error("Schema error: {message}")]
    #[diagnostic(code(kubespec::cli::schema))]
    Schema {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Configuration could not be read or written
    #[error("Configuration error: {message}")]
    #[diagnostic(code(kubespec::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Linting found errors
    #[error("Linting failed with {errors} error(s) and {warnings} warning(s)")]
    #[diagnostic(code(kubespec::cli::lint))]
    LintFailed { errors: usize, warnings: usize },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(kubespec::cli::io))]
    Io { message: String },

    #[error("{message}")]
    #[diagnostic(code(kubespec::cli::error))]
    Other { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage { .. } => exit_codes::USAGE_ERROR,
            CliError::LintFailed { .. } => exit_codes::LINT_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::NotFound { .. }
            | CliError::Schema { .. }
            | CliError::Config { .. }
            | CliError::Other { .. } => exit_codes::ERROR,
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
            help: None,
        }
    }

    pub fn not_found(message: impl Into<String>, help: Option<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            help,
        }
    }

    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    pub fn lint_failed(errors: usize, warnings: usize) -> Self {
        Self::LintFailed { errors, warnings }
    }

    /// Create an IO error naming the file involved
    pub fn io_at(path: &std::path::Path, err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{}: {}", path.display(), err),
        }
    }
}

impl From<RepoError> for CliError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Io(e) => CliError::Io {
                message: e.to_string(),
            },
            RepoError::InvalidConfig { .. } | RepoError::Serialization(_) => CliError::Config {
                message: err.to_string(),
                help: None,
            },
            RepoError::Archive { .. }
            | RepoError::MalformedSpec { .. }
            | RepoError::LimitExceeded { .. } => CliError::Schema {
                message: err.to_string(),
                help: Some("Replace the bundle or select another version".to_string()),
            },
            RepoError::CacheError { .. } => CliError::Schema {
                message: err.to_string(),
                help: None,
            },
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Other {
            message: err.to_string(),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::usage("bad").exit_code(), exit_codes::USAGE_ERROR);
        assert_eq!(CliError::lint_failed(1, 0).exit_code(), exit_codes::LINT_ERROR);
        assert_eq!(
            CliError::not_found("missing", None).exit_code(),
            exit_codes::ERROR
        );
    }

    #[test]
    fn test_repo_error_mapping() {
        let io = RepoError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(CliError::from(io).exit_code(), exit_codes::IO_ERROR);

        let archive = RepoError::Archive {
            resource: "kubernetes-1.9.zip".to_string(),
            message: "bad".to_string(),
        };
        let err = CliError::from(archive);
        assert!(matches!(err, CliError::Schema { .. }));
        assert!(err.to_string().contains("kubernetes-1.9.zip"));
    }
}
