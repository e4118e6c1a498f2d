//! Configuration loader - YAML manifest + .env overrides

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::filter::FilterDefaults;
use crate::store::SettingsStore;

/// Main configuration loaded from dashboard.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_path: PathBuf,
    /// Settings file, relative to the application root. Unset means the
    /// fixed `settings.json` under the root.
    pub settings_path: Option<PathBuf>,
    pub log_dir: PathBuf,
    /// Country selected when no saved filter applies
    pub default_country: Option<String>,
    /// Lower bound of the default year range
    pub default_start_year: i32,
}

/// Path overrides loaded from the environment / .env
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub data_path: Option<PathBuf>,
    pub settings_path: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/Inflasi.csv"),
            settings_path: None,
            log_dir: PathBuf::from("logs"),
            default_country: Some("Indonesia".to_string()),
            default_start_year: 2000,
        }
    }
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            tracing::info!("Loading config from {:?}", path);
            Self::load(path)
        } else {
            tracing::warn!("Config file not found: {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    pub fn filter_defaults(&self) -> FilterDefaults {
        FilterDefaults {
            country: self.default_country.clone(),
            start_year: self.default_start_year,
        }
    }

    /// Settings store for an application rooted at `root`
    pub fn settings_store(&self, root: &Path) -> SettingsStore {
        match &self.settings_path {
            Some(path) => SettingsStore::new(root.join(path)),
            None => SettingsStore::in_dir(root),
        }
    }

    /// Apply environment overrides on top of the file values
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(path) = overrides.data_path {
            self.data_path = path;
        }
        if let Some(path) = overrides.settings_path {
            self.settings_path = Some(path);
        }
        if let Some(dir) = overrides.log_dir {
            self.log_dir = dir;
        }
        self
    }
}

impl Overrides {
    /// Load overrides from .env file
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        Overrides {
            data_path: std::env::var("DASH_DATA_PATH").ok().map(PathBuf::from),
            settings_path: std::env::var("DASH_SETTINGS_PATH").ok().map(PathBuf::from),
            log_dir: std::env::var("DASH_LOG_DIR").ok().map(PathBuf::from),
        }
    }
}
