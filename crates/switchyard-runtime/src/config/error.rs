//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Ways loading or checking a [`SwitchyardConfig`](super::SwitchyardConfig)
/// can fail.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested file does not exist.
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// The file extension names no format compiled into this build.
    #[error("Unsupported configuration format for {}, enable the matching *-config feature", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// Merging defaults, files and environment failed, or the merged value
    /// does not fit the schema.
    #[error("Failed to load configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    /// A value was read but breaks a constraint.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// `adapters.<name>` does not fit the mapper's configuration type.
    #[error("Invalid configuration for adapter '{adapter}': {reason}")]
    AdapterSection { adapter: String, reason: String },
}

impl ConfigError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    pub fn adapter_section(adapter: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::AdapterSection {
            adapter: adapter.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Extract(Box::new(err))
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_section_message() {
        let err = ConfigError::adapter_section("aws", "invalid type: sequence");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for adapter 'aws': invalid type: sequence"
        );
    }
}
