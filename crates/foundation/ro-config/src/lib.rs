//! Service configuration.
//!
//! Resolution order, later wins:
//!
//! ```text
//! defaults ─▶ YAML file ─▶ RO_SEARCH_* environment ─▶ CLI flags (ro-server)
//! ```
//!
//! The YAML file comes from an explicit path, then `RO_SEARCH_CONFIG`, then
//! `<config dir>/ro-search/config.yaml` if it exists.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const CONFIG_PATH_ENV: &str = "RO_SEARCH_CONFIG";

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub mongodb: MongoConfig,
    pub people: PeopleConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    pub collection: String,
    /// Create the wildcard text index on startup.
    pub ensure_text_index: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeopleConfig {
    /// Person directory root. Names are not resolved when unset.
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub success_stage: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "sead".to_string(),
            collection: "ro".to_string(),
            ensure_text_index: false,
        }
    }
}

impl Default for PeopleConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 10,
            user_agent: concat!("ro-search/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            success_stage: ro_core::DEFAULT_SUCCESS_STAGE.to_string(),
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl PeopleConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from the first available source, apply the
    /// process environment, and validate.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match config_path(explicit) {
            Some(path) => Self::from_file(&path)?,
            None => {
                debug!("no config file found, using defaults");
                Self::default()
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "loaded config");
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Override fields from `RO_SEARCH_*` variables found through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("RO_SEARCH_BIND") {
            self.server.bind = v;
        }
        if let Some(v) = get("RO_SEARCH_MONGO_URI") {
            self.mongodb.uri = v;
        }
        if let Some(v) = get("RO_SEARCH_MONGO_DB") {
            self.mongodb.database = v;
        }
        if let Some(v) = get("RO_SEARCH_MONGO_COLLECTION") {
            self.mongodb.collection = v;
        }
        if let Some(v) = get("RO_SEARCH_PEOPLE_URL") {
            self.people.base_url = Some(v);
        }
        if let Some(v) = get("RO_SEARCH_SUCCESS_STAGE") {
            self.search.success_stage = v;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.mongodb.database.trim().is_empty() {
            return Err(ConfigError::Invalid("mongodb.database is empty".into()));
        }
        if self.mongodb.collection.trim().is_empty() {
            return Err(ConfigError::Invalid("mongodb.collection is empty".into()));
        }
        if self.search.success_stage.is_empty() {
            return Err(ConfigError::Invalid("search.success_stage is empty".into()));
        }
        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "server.request_timeout_secs must be positive".into(),
            ));
        }
        if self.people.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "people.timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }
}

fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    dirs::config_dir()
        .map(|dir| dir.join("ro-search").join("config.yaml"))
        .filter(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.search.success_stage, "Success");
        assert_eq!(config.people.base_url, None);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml(
            "mongodb:\n  database: pdt\npeople:\n  base_url: http://localhost:8080/pdt\n",
        )
        .unwrap();
        assert_eq!(config.mongodb.database, "pdt");
        assert_eq!(config.mongodb.collection, "ro");
        assert_eq!(config.people.base_url.as_deref(), Some("http://localhost:8080/pdt"));
        assert_eq!(config.server.request_timeout_secs, 30);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(Config::from_yaml("  \n").unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            Config::from_yaml("server: [unclosed"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "search:\n  success_stage: Published").unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.search.success_stage, "Published");
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file(Path::new("/nonexistent/ro-search.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("RO_SEARCH_BIND", "127.0.0.1:9000"),
            ("RO_SEARCH_MONGO_URI", "mongodb://db:27017"),
            ("RO_SEARCH_PEOPLE_URL", "http://people"),
            ("RO_SEARCH_MONGO_DB", ""),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.server.bind, "127.0.0.1:9000");
        assert_eq!(config.mongodb.uri, "mongodb://db:27017");
        assert_eq!(config.people.base_url.as_deref(), Some("http://people"));
        // blank values do not override
        assert_eq!(config.mongodb.database, "sead");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.mongodb.collection = " ".into();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.search.success_stage.clear();
        assert!(config.validate().is_err());
    }
}
