use crate::{
    app::{errors::AppError, service::CatalogService, App},
    catalog::{CatalogItem, Model, Motion, Stage},
    config::Config,
    semantic::{EmbeddingProvider, OpenAiEmbeddings},
    storage::{self, StorageManager},
};
use anyhow::{Context, Result};
use homedir::my_home;
use std::path::PathBuf;
use std::sync::Arc;

/// Builds services from the configuration in the base directory.
pub struct AppFactory {
    config: Config,
    storage: Arc<dyn StorageManager>,
    provider: Arc<dyn EmbeddingProvider>,
}

impl AppFactory {
    pub fn new(
        config: Config,
        storage: Arc<dyn StorageManager>,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self {
            config,
            storage,
            provider,
        }
    }

    /// Load config from the base directory and wire the local storage and
    /// OpenAI provider. A missing API key is not an error here; it only
    /// fails search and embedding calls.
    pub fn from_base_path(base_path: &std::path::Path) -> Result<Self, AppError> {
        let config = Config::load_with(base_path)?;
        let storage = storage::BackendLocal::new(base_path)?;

        let emb = &config.embeddings;
        let provider =
            OpenAiEmbeddings::from_env(&emb.api_base, &emb.model, &emb.api_key_env, config.timeout())?;
        if !provider.is_configured() {
            log::warn!(
                "{} is not set, search and embedding generation are unavailable",
                emb.api_key_env
            );
        } else {
            log::debug!("using embedding model {}", provider.model());
        }

        Ok(Self::new(config, Arc::new(storage), Arc::new(provider)))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Open the catalog service for one kind, refreshed against its source
    /// directory.
    pub fn service<T: CatalogItem>(&self) -> Result<CatalogService<T>, AppError> {
        let catalog = self.config.catalogs.get(T::KIND);

        CatalogService::open(
            self.config.resolve(&catalog.source_dir),
            catalog.catalog_file.clone(),
            self.storage.clone(),
            self.provider.clone(),
            self.config.throttle(),
        )
    }

    /// Open the catalog service for one kind exactly as persisted.
    pub fn load_service<T: CatalogItem>(&self) -> Result<CatalogService<T>, AppError> {
        let catalog = self.config.catalogs.get(T::KIND);

        CatalogService::load(
            self.config.resolve(&catalog.source_dir),
            catalog.catalog_file.clone(),
            self.storage.clone(),
            self.provider.clone(),
            self.config.throttle(),
        )
    }

    pub fn app(&self) -> Result<App, AppError> {
        Ok(App {
            models: self.service::<Model>()?,
            stages: self.service::<Stage>()?,
            motions: self.service::<Motion>()?,
        })
    }

    /// All three catalogs as persisted, for runs that report what the next
    /// refresh changes.
    pub fn load_app(&self) -> Result<App, AppError> {
        Ok(App {
            models: self.load_service::<Model>()?,
            stages: self.load_service::<Stage>()?,
            motions: self.load_service::<Motion>()?,
        })
    }

    /// `MMDC_BASE_PATH`, else `~/.local/share/mmdc`. Created if missing.
    pub fn base_path() -> Result<PathBuf> {
        let base_path = match std::env::var("MMDC_BASE_PATH") {
            Ok(path) => PathBuf::from(path),
            Err(_) => {
                let home = my_home()
                    .context("Could not determine home directory")?
                    .context("Home directory path is empty")?;
                home.join(".local/share/mmdc")
            }
        };

        std::fs::create_dir_all(&base_path)
            .context("Failed to create application base directory")?;

        Ok(base_path)
    }
}
