use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::app::errors::AppError;
use crate::catalog::{
    CatalogItem, CatalogStore, Change, Page, PurgeReport, ReconcileResult,
};
use crate::semantic::{self, EmbeddingProvider, GenerateReport};
use crate::storage::StorageManager;

/// Public surface of one catalog kind.
///
/// Reads share the lock; refresh, embedding generation and purge take it
/// exclusively for their whole run.
pub struct CatalogService<T: CatalogItem> {
    store: RwLock<CatalogStore<T>>,
    provider: Arc<dyn EmbeddingProvider>,
    throttle: Duration,
}

impl<T: CatalogItem> CatalogService<T> {
    pub fn new(
        store: CatalogStore<T>,
        provider: Arc<dyn EmbeddingProvider>,
        throttle: Duration,
    ) -> Self {
        Self {
            store: RwLock::new(store),
            provider,
            throttle,
        }
    }

    /// Load the catalog (missing file means empty) and refresh it.
    pub fn open(
        source_dir: impl Into<PathBuf>,
        catalog_file: impl Into<String>,
        storage: Arc<dyn StorageManager>,
        provider: Arc<dyn EmbeddingProvider>,
        throttle: Duration,
    ) -> Result<Self, AppError> {
        let store = CatalogStore::open(source_dir, catalog_file, storage)?;
        Ok(Self::new(store, provider, throttle))
    }

    /// Load the catalog as persisted, leaving reconciliation to an explicit
    /// `refresh`, `status` or `purge`.
    pub fn load(
        source_dir: impl Into<PathBuf>,
        catalog_file: impl Into<String>,
        storage: Arc<dyn StorageManager>,
        provider: Arc<dyn EmbeddingProvider>,
        throttle: Duration,
    ) -> Result<Self, AppError> {
        let store = CatalogStore::load_persisted(source_dir, catalog_file, storage)?;
        Ok(Self::new(store, provider, throttle))
    }

    pub fn get_page(&self, page: i64, per_page: i64) -> Result<Page<T>, AppError> {
        Ok(self.store.read()?.paginate(page, per_page))
    }

    pub fn get_all(&self) -> Result<Vec<T>, AppError> {
        Ok(self.store.read()?.items().to_vec())
    }

    pub fn refresh(&self) -> Result<ReconcileResult, AppError> {
        Ok(self.store.write()?.refresh()?)
    }

    pub fn search(&self, query: &str, limit: i64) -> Result<Vec<T>, AppError> {
        let store = self.store.read()?;
        Ok(semantic::search(store.items(), self.provider.as_ref(), query, limit)?)
    }

    pub fn generate_embeddings(&self) -> Result<GenerateReport, AppError> {
        Ok(self
            .store
            .write()?
            .generate_embeddings(self.provider.as_ref(), self.throttle)?)
    }

    pub fn status(&self) -> Result<Vec<Change>, AppError> {
        Ok(self.store.read()?.status()?)
    }

    pub fn purge(&self) -> Result<PurgeReport, AppError> {
        Ok(self.store.write()?.purge()?)
    }

    pub fn total(&self) -> Result<usize, AppError> {
        Ok(self.store.read()?.total())
    }

    pub fn is_empty(&self) -> Result<bool, AppError> {
        Ok(self.store.read()?.is_empty())
    }
}
