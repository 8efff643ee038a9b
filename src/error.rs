use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StampbakError {
    #[error("Invalid target path: {path}")]
    InvalidTargetPath { path: String },

    #[error("No valid source paths")]
    NoValidSources,

    #[error("Invalid source path: {path}")]
    InvalidSourcePath { path: String },

    #[error("Source is not an existing directory: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("IO error at {path}: {source}")]
    IoAt {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl StampbakError {
    /// Create a configuration error with a custom message
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a validation error with a custom message
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Attach the path a filesystem operation failed on
    pub fn io_at(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoAt {
            path: path.into(),
            source,
        }
    }

    /// A rejected source is skipped; the rest of the run carries on
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StampbakError::InvalidSourcePath { .. } | StampbakError::SourceNotFound { .. }
        )
    }

    /// Errors that stop a run before any filesystem write happens
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            StampbakError::InvalidTargetPath { .. }
                | StampbakError::NoValidSources
                | StampbakError::Config { .. }
        )
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        if self.is_configuration() || self.is_recoverable() {
            return 2;
        }
        match self {
            StampbakError::Validation { .. } => 2,
            _ => 1,
        }
    }

    /// Provide helpful suggestions for resolving the error
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            StampbakError::InvalidTargetPath { .. } => vec![
                "Use an absolute TargetPath below a filesystem root".to_string(),
                "The target cannot be a root directory itself".to_string(),
            ],
            StampbakError::NoValidSources => vec![
                "Check that every entry in SourcePaths is an absolute path".to_string(),
                "Make sure the source directories exist".to_string(),
                "See the run log for the rejected entries".to_string(),
            ],
            StampbakError::Config { .. } => vec![
                "Print a sample with --sample-config".to_string(),
                "Pass a different settings file with --config".to_string(),
            ],
            StampbakError::IoAt { source, .. } | StampbakError::Io(source)
                if source.kind() == std::io::ErrorKind::PermissionDenied =>
            {
                vec![
                    "Check file permissions".to_string(),
                    "Ensure the target directory is writable".to_string(),
                ]
            }
            _ => vec![],
        }
    }
}
