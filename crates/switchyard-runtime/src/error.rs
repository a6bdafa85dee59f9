//! Runtime error types.

use switchyard_core::{AdapterError, RegistryError};
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur during runtime operations.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),

    #[error("Registration failed: {0}")]
    Registry(#[from] RegistryError),

    /// Handlers can only be registered before the consumer starts.
    #[error("Runtime already started, handlers can no longer be registered")]
    AlreadyStarted,

    #[error("Runtime has been shut down")]
    Stopped,
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
