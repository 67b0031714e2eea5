use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Environment variable not found: {var_name}")]
    EnvVarNotFound { var_name: String },

    #[error("Failed to read referenced file {}: {message}", path.display())]
    FileReference { path: PathBuf, message: String },

    #[error("Invalid value for {var}: {message}")]
    InvalidOverride { var: String, message: String },

    #[error("Failed to load {}: {message}", path.display())]
    Dotenv { path: PathBuf, message: String },

    #[error("Invalid configuration for '{field}': {reason}")]
    Invalid { field: String, reason: String },

    /// Several reference errors reported together.
    #[error("{} configuration errors: {}", .0.len(), join(.0))]
    Multiple(Vec<ConfigError>),
}

fn join(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
