//! Configuration loader using figment.
//!
//! # Feature Flags
//!
//! - `toml-config`: enables `switchyard.toml` / `config.toml`
//! - `yaml-config`: enables `switchyard.yaml` / `switchyard.yml` / `config.yaml` / `config.yml`
//!
//! With both enabled, both formats are searched and merged (YAML last).
//!
//! # Configuration Priority (lowest to highest)
//!
//! 1. Built-in defaults
//! 2. Profile-specific config file (`switchyard.{profile}.toml`)
//! 3. Main config file (`switchyard.toml`)
//! 4. Environment variables (`SWITCHYARD_*`)
//! 5. Programmatic overrides
//!
//! # Environment Variable Mapping
//!
//! Variables use the `SWITCHYARD_` prefix with `__` between nested keys:
//!
//! - `SWITCHYARD_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//! - `SWITCHYARD_SERVER__LOG_PAYLOADS=true` → `server.log_payloads = true`
//! - `SWITCHYARD_ADAPTERS__AWS__UNKNOWN_SOURCES=custom` → `adapters.aws.unknown_sources = "custom"`
//!
//! `SWITCHYARD_PROFILE` selects the profile.

use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "yaml-config", feature = "toml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::SwitchyardConfig;

const ENV_PREFIX: &str = "SWITCHYARD_";
const PROFILE_VAR: &str = "SWITCHYARD_PROFILE";

const FILE_STEMS: &[&str] = &["switchyard", "config"];

/// Extensions searched for each enabled file format.
const FORMATS: &[&[&str]] = &[
    #[cfg(feature = "toml-config")]
    &["toml"],
    #[cfg(feature = "yaml-config")]
    &["yaml", "yml"],
];

/// Configuration profile for environment-specific settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Development,
    Production,
    Custom(String),
}

impl Profile {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Parses a profile name; `prod` and `dev` are accepted as aliases.
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Reads the profile from `SWITCHYARD_PROFILE`, defaulting to development.
    pub fn from_env() -> Self {
        std::env::var(PROFILE_VAR)
            .map(|p| Self::parse(&p))
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration loader with figment-based multi-source support.
///
/// ```rust,ignore
/// let config = ConfigLoader::new()
///     .file("switchyard.toml")
///     .profile("production")
///     .load()?;
/// ```
pub struct ConfigLoader {
    overrides: Figment,
    profile: Profile,
    search_paths: Vec<PathBuf>,
    load_env: bool,
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            overrides: Figment::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.profile = Profile::parse(profile.as_ref());
        self
    }

    /// Adds a directory to search for configuration files.
    ///
    /// Without explicit search paths, the current directory and the user
    /// configuration directory are searched.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Loads exactly this file instead of searching.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges a configuration on top of every other source.
    pub fn merge(mut self, config: SwitchyardConfig) -> Self {
        self.overrides = self.overrides.merge(Serialized::defaults(config));
        self
    }

    /// Loads and returns the configuration.
    pub fn load(self) -> ConfigResult<SwitchyardConfig> {
        let profile = self.profile.clone();
        let config: SwitchyardConfig = self.build_figment()?.extract()?;

        debug!(
            profile = %profile,
            logging_level = %config.logging.level,
            adapters = config.adapters.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    fn build_figment(self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(SwitchyardConfig::default()));

        if let Some(path) = &self.config_file {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.clone()));
            }
            info!(path = %path.display(), "Loading configuration file");
            figment = Self::merge_config_file(figment, path)?;
        } else {
            figment = self.load_config_files(figment);
        }

        if self.load_env {
            trace!("Loading environment variables with {ENV_PREFIX} prefix");
            figment = figment.merge(
                Env::prefixed(ENV_PREFIX)
                    .ignore(&["PROFILE"])
                    .split("__"),
            );
        }

        Ok(figment.merge(self.overrides))
    }

    /// Merges a single file, dispatching on its extension.
    fn merge_config_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            #[cfg(feature = "toml-config")]
            "toml" => Ok(figment.merge(Toml::file(path))),
            #[cfg(feature = "yaml-config")]
            "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    fn resolve_search_paths(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }
        std::env::current_dir()
            .ok()
            .into_iter()
            .chain(dirs::config_dir().map(|dir| dir.join("switchyard")))
            .collect()
    }

    /// Finds the main file for one format: the first `{stem}.{ext}` that
    /// exists, trying directories in order, then stems, then extensions.
    fn find_file(search_dirs: &[PathBuf], extensions: &[&str]) -> Option<PathBuf> {
        search_dirs.iter()
            .flat_map(|dir| {
                FILE_STEMS.iter().flat_map(move |stem| {
                    extensions
                        .iter()
                        .map(move |ext| dir.join(format!("{stem}.{ext}")))
                })
            })
            .find(|path| path.is_file())
    }

    /// `switchyard.toml` → `switchyard.production.toml`.
    fn profile_variant(&self, path: &Path) -> Option<PathBuf> {
        let stem = path.file_stem()?.to_str()?;
        let ext = path.extension()?.to_str()?;
        let variant = path.with_file_name(format!("{stem}.{}.{ext}", self.profile));
        variant.is_file().then_some(variant)
    }

    /// Merges the main file of every enabled format, each preceded by its
    /// profile variant. Later formats override earlier ones.
    fn load_config_files(&self, mut figment: Figment) -> Figment {
        let search_dirs = self.resolve_search_paths();
        let mut found = false;

        for extensions in FORMATS {
            let Some(path) = Self::find_file(&search_dirs, extensions) else {
                continue;
            };
            if let Some(variant) = self.profile_variant(&path) {
                debug!(path = %variant.display(), "Loading profile-specific config");
                figment = Self::merge_file_unchecked(figment, &variant);
            }
            info!(path = %path.display(), "Loading configuration file");
            figment = Self::merge_file_unchecked(figment, &path);
            found = true;
        }

        if !found {
            warn!("No configuration file found, using defaults");
        }
        figment
    }

    /// Merges a file whose extension is known to belong to an enabled format.
    fn merge_file_unchecked(figment: Figment, path: &Path) -> Figment {
        Self::merge_config_file(figment.clone(), path).unwrap_or(figment)
    }
}

/// Loads configuration from the default locations.
pub fn load_config() -> ConfigResult<SwitchyardConfig> {
    ConfigLoader::new().load()
}

/// Loads configuration from one file plus the environment.
pub fn load_config_from_file(path: impl AsRef<Path>) -> ConfigResult<SwitchyardConfig> {
    ConfigLoader::new().file(path).load()
}

// =============================================================================
// Tests
// =============================================================================
