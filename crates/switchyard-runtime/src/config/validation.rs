//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{LogOutput, LoggingConfig, SwitchyardConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &SwitchyardConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_adapter_keys(config.adapters.keys())?;
    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File {
        match &logging.file_path {
            None => {
                return Err(ConfigError::invalid(
                    "logging.file_path is required when logging.output is \"file\"",
                ));
            }
            Some(path) if path.file_name().is_none() => {
                return Err(ConfigError::invalid(format!(
                    "logging.file_path must name a file: {}",
                    path.display()
                )));
            }
            Some(_) => {}
        }
    }

    if let Some(module) = logging.filters.keys().find(|m| m.trim().is_empty()) {
        return Err(ConfigError::invalid(format!(
            "Invalid log filter target: {module:?}"
        )));
    }

    Ok(())
}

fn validate_adapter_keys<'a>(mut keys: impl Iterator<Item = &'a String>) -> ConfigResult<()> {
    if keys.any(|k| k.trim().is_empty()) {
        return Err(ConfigError::invalid("Adapter section names must not be empty"));
    }
    Ok(())
}
