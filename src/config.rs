use std::path::{Path, PathBuf};

use crate::catalog::Kind;
use crate::semantic::embeddings::{DEFAULT_API_BASE, DEFAULT_MODEL, DEFAULT_TIMEOUT};
use crate::semantic::DEFAULT_THROTTLE_MS;
use crate::storage::{BackendLocal, StorageManager};
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "config.yaml";

const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";
const DEFAULT_SEARCH_LIMIT: i64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config is malformed: {0}")]
    Malformed(#[from] serde_yml::Error),

    #[error("config file is not valid utf8")]
    NotUtf8,

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Where one kind's items live and where its catalog is persisted.
///
/// Relative paths are resolved against the base directory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub source_dir: String,
    #[serde(default)]
    pub catalog_file: String,
}

impl CatalogConfig {
    fn default_for(kind: Kind) -> Self {
        Self {
            source_dir: kind.default_source_dir().to_string(),
            catalog_file: kind.default_catalog_file().to_string(),
        }
    }
}

fn default_models() -> CatalogConfig {
    CatalogConfig::default_for(Kind::Models)
}

fn default_stages() -> CatalogConfig {
    CatalogConfig::default_for(Kind::Stages)
}

fn default_motions() -> CatalogConfig {
    CatalogConfig::default_for(Kind::Motions)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogsConfig {
    #[serde(default = "default_models")]
    pub models: CatalogConfig,
    #[serde(default = "default_stages")]
    pub stages: CatalogConfig,
    #[serde(default = "default_motions")]
    pub motions: CatalogConfig,
}

impl Default for CatalogsConfig {
    fn default() -> Self {
        Self {
            models: default_models(),
            stages: default_stages(),
            motions: default_motions(),
        }
    }
}

impl CatalogsConfig {
    /// Blank paths fall back to the kind's defaults.
    fn fill_defaults(&mut self) {
        for kind in Kind::ALL {
            let defaults = CatalogConfig::default_for(kind);
            let catalog = match kind {
                Kind::Models => &mut self.models,
                Kind::Stages => &mut self.stages,
                Kind::Motions => &mut self.motions,
            };
            if catalog.source_dir.trim().is_empty() {
                catalog.source_dir = defaults.source_dir;
            }
            if catalog.catalog_file.trim().is_empty() {
                catalog.catalog_file = defaults.catalog_file;
            }
        }
    }

    pub fn get(&self, kind: Kind) -> &CatalogConfig {
        match kind {
            Kind::Models => &self.models,
            Kind::Stages => &self.stages,
            Kind::Motions => &self.motions,
        }
    }
}

/// Embedding provider settings. The API key itself is never stored here,
/// only the name of the environment variable holding it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Delay between provider calls during batch generation
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            throttle_ms: default_throttle_ms(),
        }
    }
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_throttle_ms() -> u64 {
    DEFAULT_THROTTLE_MS
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_limit")]
    pub default_limit: i64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

fn default_search_limit() -> i64 {
    DEFAULT_SEARCH_LIMIT
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
        }
    }
}

fn default_per_page() -> i64 {
    crate::catalog::page::DEFAULT_PER_PAGE
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalogs: CatalogsConfig,
    #[serde(default)]
    pub embeddings: EmbeddingConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: PathBuf,
}

impl Config {
    fn validate(&self) -> Result<(), ConfigError> {
        let emb = &self.embeddings;
        if emb.api_base.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "embeddings.api_base must not be empty".to_string(),
            ));
        }
        if emb.model.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "embeddings.model must not be empty".to_string(),
            ));
        }
        if emb.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "embeddings.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.pagination.per_page <= 0 {
            return Err(ConfigError::Invalid(format!(
                "pagination.per_page must be greater than 0, got {}",
                self.pagination.per_page
            )));
        }

        Ok(())
    }

    /// Load `config.yaml` from `base_path`, writing defaults on first run.
    pub fn load_with(base_path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let base_path = base_path.as_ref();
        let store = BackendLocal::new(base_path).map_err(|source| ConfigError::Io {
            path: base_path.display().to_string(),
            source,
        })?;

        // create new if does not exist
        if !store.exists(CONFIG_FILE) {
            log::info!("writing default config to {}", base_path.join(CONFIG_FILE).display());
            write(&store, &serde_yml::to_string(&Self::default())?)?;
        }

        let bytes = store.read(CONFIG_FILE).map_err(|source| ConfigError::Io {
            path: CONFIG_FILE.to_string(),
            source,
        })?;
        let config_str = String::from_utf8(bytes).map_err(|_| ConfigError::NotUtf8)?;
        let mut config: Self = serde_yml::from_str(&config_str)?;

        config.base_path = base_path.to_path_buf();
        config.catalogs.fill_defaults();

        config.validate()?;

        // resave in case config version needs an upgrade
        let current = serde_yml::to_string(&config)?;
        if config_str != current {
            write(&store, &current)?;
        }

        Ok(config)
    }

    /// Resolve a configured path against the base directory.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }

    pub fn throttle(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.embeddings.throttle_ms)
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.embeddings.timeout_secs)
    }
}

fn write(store: &BackendLocal, config_str: &str) -> Result<(), ConfigError> {
    store
        .write(CONFIG_FILE, config_str.as_bytes())
        .map_err(|source| ConfigError::Io {
            path: CONFIG_FILE.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_run_writes_defaults() {
        let tmp = tempfile::tempdir().unwrap();

        let config = Config::load_with(tmp.path()).unwrap();

        assert!(tmp.path().join(CONFIG_FILE).exists());
        assert_eq!(config.embeddings.model, DEFAULT_MODEL);
        assert_eq!(config.embeddings.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.embeddings.timeout_secs, 30);
        assert_eq!(config.embeddings.throttle_ms, 100);
        assert_eq!(config.search.default_limit, 10);
        assert_eq!(config.pagination.per_page, 100);
        assert_eq!(config.catalogs.get(Kind::Stages).source_dir, "data/Stages");
        assert_eq!(config.catalogs.motions.catalog_file, "data/motions.json");
    }

    #[test]
    fn partial_config_is_filled_and_resaved() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join(CONFIG_FILE),
            "embeddings:\n  model: text-embedding-3-small\n",
        )
        .unwrap();

        let config = Config::load_with(tmp.path()).unwrap();
        assert_eq!(config.embeddings.model, "text-embedding-3-small");
        assert_eq!(config.embeddings.api_base, DEFAULT_API_BASE);

        let saved = std::fs::read_to_string(tmp.path().join(CONFIG_FILE)).unwrap();
        assert!(saved.contains("pagination"));
        assert!(saved.contains("text-embedding-3-small"));
    }

    #[test]
    fn partial_catalog_entry_keeps_kind_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join(CONFIG_FILE),
            "catalogs:\n  stages:\n    source_dir: /srv/stages\n",
        )
        .unwrap();

        let config = Config::load_with(tmp.path()).unwrap();

        assert_eq!(config.catalogs.stages.source_dir, "/srv/stages");
        assert_eq!(config.catalogs.stages.catalog_file, "data/stages.json");
        assert_eq!(config.catalogs.models.source_dir, "data/Models");
    }

    #[test]
    fn rejects_zero_timeout() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join(CONFIG_FILE),
            "embeddings:\n  timeout_secs: 0\n",
        )
        .unwrap();

        assert!(matches!(
            Config::load_with(tmp.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_malformed_yaml() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE), "search: [").unwrap();

        assert!(matches!(
            Config::load_with(tmp.path()),
            Err(ConfigError::Malformed(_))
        ));
    }

    #[test]
    fn resolves_relative_paths_against_base() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load_with(tmp.path()).unwrap();

        assert_eq!(config.resolve("data/Models"), tmp.path().join("data/Models"));
        assert_eq!(config.resolve("/srv/mmd"), PathBuf::from("/srv/mmd"));
    }
}
