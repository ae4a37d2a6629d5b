//! Configuration management for module-loader
//!
//! Handles configuration loading, validation, and building a loader from
//! the declared modules.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

use crate::module::fetch::{ManifestFetcher, TimeoutFetcher};
use crate::module::loader::ModuleLoader;
use crate::module::registry::ModuleDeclaration;
use crate::module::traits::ModuleError;

/// Loader configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Directory holding module documents
    #[serde(default = "default_modules_dir")]
    pub modules_dir: String,

    /// Fetch bundles before modules
    #[serde(default)]
    pub load_bundles: bool,

    /// Timeout for one fetch batch (none = wait indefinitely)
    #[serde(default)]
    pub fetch_timeout_seconds: Option<u64>,

    /// Identifiers never fetched
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Dynamic module declarations, in registration order
    #[serde(default)]
    pub modules: Vec<ModuleDeclaration>,

    /// Modules available without fetching, keyed by category
    #[serde(default)]
    pub required: IndexMap<String, Vec<Value>>,

    /// Logging configuration
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log filter (e.g. "info", "module_loader=debug"); RUST_LOG wins if set
    #[serde(default)]
    pub filter: Option<String>,

    /// Emit JSON lines (requires the `json-logging` feature)
    #[serde(default)]
    pub json_format: bool,
}

fn default_modules_dir() -> String {
    "modules".to_string()
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            modules_dir: default_modules_dir(),
            load_bundles: false,
            fetch_timeout_seconds: None,
            exclude: Vec::new(),
            modules: Vec::new(),
            required: IndexMap::new(),
            logging: None,
        }
    }
}

impl LoaderConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ModuleError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ModuleError::Config(format!(
                "Failed to read config file {:?}: {}",
                path.as_ref(),
                e
            ))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ModuleError> {
        let config: LoaderConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ModuleError> {
        if self.modules_dir.trim().is_empty() {
            return Err(ModuleError::Config(
                "modules_dir cannot be empty".to_string(),
            ));
        }

        if self.fetch_timeout_seconds == Some(0) {
            return Err(ModuleError::Config(
                "fetch_timeout_seconds must be greater than 0".to_string(),
            ));
        }

        for declaration in &self.modules {
            declaration.validate()?;
        }

        Ok(())
    }

    /// Fetch timeout, if one is configured
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_seconds.map(Duration::from_secs)
    }

    /// Register the declared modules and exclusions on a loader
    pub fn apply<T>(&self, loader: &mut ModuleLoader<T>) -> Result<(), ModuleError>
    where
        T: Clone + Send + 'static,
    {
        loader.add_list(self.modules.iter().cloned())?;
        for identifier in &self.exclude {
            loader.remove(identifier.clone());
        }
        Ok(())
    }

    /// Build a loader reading modules from `modules_dir`
    pub fn build_loader(&self) -> Result<ModuleLoader<Value>, ModuleError> {
        self.validate()?;

        let fetcher = ManifestFetcher::new(&self.modules_dir);
        let required = self.required.clone();
        let mut loader = match self.fetch_timeout() {
            Some(timeout) => ModuleLoader::new(required, TimeoutFetcher::new(fetcher, timeout))?,
            None => ModuleLoader::new(required, fetcher)?,
        };

        self.apply(&mut loader)?;
        Ok(loader)
    }
}
