use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::error::ConfigError;
use crate::submission::FieldMap;
use crate::tasks::{TaskCatalog, DEFAULT_LABELS};

pub const DEFAULT_CONFIRMATION_CODE: &str = "EYE-7Q4K";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Form endpoint receiving the session; `None` keeps submissions local
    pub endpoint: Option<String>,
    /// Code shown to the participant on the final screen
    pub confirmation_code: String,
    pub labels: Vec<String>,
    pub field_map: FieldMap,
    pub request_timeout_secs: u64,
    pub archive_responses: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: None,
            confirmation_code: DEFAULT_CONFIRMATION_CODE.to_string(),
            labels: DEFAULT_LABELS.iter().map(|l| l.to_string()).collect(),
            field_map: FieldMap::default(),
            request_timeout_secs: 15,
            archive_responses: true,
        }
    }
}

impl Config {
    /// Task labels, checked for count and for form fields behind every label
    pub fn catalog(&self) -> Result<TaskCatalog, ConfigError> {
        let catalog = TaskCatalog::new(self.labels.clone())?;
        if let Some(label) = catalog
            .labels()
            .iter()
            .find(|label| self.field_map.get(label.as_str()).is_none())
        {
            return Err(ConfigError::MissingFields(label.clone()));
        }
        Ok(catalog)
    }

    /// Command-line values win over the file
    pub fn with_endpoint(mut self, endpoint: Option<String>) -> Self {
        if endpoint.is_some() {
            self.endpoint = endpoint;
        }
        self
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<(), ConfigError>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("eyelab_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Like [`ConfigStore::load`] but reports a broken file instead of
    /// falling back. A missing file still yields the defaults.
    pub fn try_load(&self) -> Result<Config, ConfigError> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let bytes = fs::read(&self.path)?;
        let cfg = serde_json::from_slice::<Config>(&bytes)?;
        cfg.catalog()?;
        Ok(cfg)
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                return cfg;
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
