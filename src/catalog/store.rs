//! Ownership and persistence of one kind's catalog.
//!
//! The store is the only writer of its catalog file. Every mutation it
//! performs (refresh, embedding generation, purge) is followed by a save,
//! and saves replace the whole file atomically through [`StorageManager`].

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use super::changes::{diff, Change};
use super::page::Page;
use super::reconcile::{self, PurgeReport, ReconcileResult};
use super::scanner::{scan, ScanError};
use super::CatalogItem;
use crate::semantic::{generate_missing, EmbeddingError, EmbeddingProvider, GenerateReport};
use crate::storage::StorageManager;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("catalog file {0} does not exist")]
    Missing(String),

    #[error("catalog file {path} is corrupt: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode catalog {path}: {source}")]
    Encode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("i/o error on catalog file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("embedding generation aborted: {0}")]
    Embedding(#[from] EmbeddingError),
}

/// Authoritative in-memory catalog for one item kind.
pub struct CatalogStore<T: CatalogItem> {
    source_dir: PathBuf,
    ident: String,
    storage: Arc<dyn StorageManager>,
    items: Vec<T>,
}

impl<T: CatalogItem> CatalogStore<T> {
    /// Create an empty store for the catalog file `ident` (relative to the
    /// storage backend) mirroring `source_dir`.
    pub fn new(
        source_dir: impl Into<PathBuf>,
        ident: impl Into<String>,
        storage: Arc<dyn StorageManager>,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            ident: ident.into(),
            storage,
            items: Vec::new(),
        }
    }

    /// Load the persisted catalog, or start empty when it does not exist yet,
    /// then bring it up to date with the source directory.
    pub fn open(
        source_dir: impl Into<PathBuf>,
        ident: impl Into<String>,
        storage: Arc<dyn StorageManager>,
    ) -> Result<Self, StoreError> {
        let mut store = Self::load_persisted(source_dir, ident, storage)?;
        store.refresh()?;
        Ok(store)
    }

    /// Load the persisted catalog as it is on disk, without scanning.
    /// A missing file gives an empty catalog.
    pub fn load_persisted(
        source_dir: impl Into<PathBuf>,
        ident: impl Into<String>,
        storage: Arc<dyn StorageManager>,
    ) -> Result<Self, PersistenceError> {
        let mut store = Self::new(source_dir, ident, storage);

        match store.load() {
            Ok(()) => {}
            Err(PersistenceError::Missing(path)) => {
                log::info!("no {} catalog at {path}, starting empty", T::KIND);
            }
            Err(err) => return Err(err),
        }

        Ok(store)
    }

    /// Replace the in-memory catalog with the persisted one.
    ///
    /// A missing file is reported as [`PersistenceError::Missing`] so callers
    /// can tell first runs apart from unreadable files.
    pub fn load(&mut self) -> Result<(), PersistenceError> {
        let now = Instant::now();

        let bytes = self.storage.read(&self.ident).map_err(|source| match source.kind() {
            ErrorKind::NotFound => PersistenceError::Missing(self.ident.clone()),
            _ => PersistenceError::Io {
                path: self.ident.clone(),
                source,
            },
        })?;

        self.items = decode::<T>(&bytes).map_err(|source| PersistenceError::Corrupt {
            path: self.ident.clone(),
            source,
        })?;

        log::debug!(
            "took {}ms to read {} {}",
            now.elapsed().as_micros() as f64 / 1000.0,
            self.items.len(),
            T::KIND
        );

        Ok(())
    }

    /// Write the whole catalog to its backing file.
    pub fn save(&self) -> Result<(), PersistenceError> {
        let bytes = encode(&self.items).map_err(|source| PersistenceError::Encode {
            path: self.ident.clone(),
            source,
        })?;

        self.storage
            .write(&self.ident, &bytes)
            .map_err(|source| PersistenceError::Io {
                path: self.ident.clone(),
                source,
            })
    }

    /// Rescan the source directory, append new or changed items and persist.
    ///
    /// Nothing is written when the scan adds nothing and the catalog file
    /// already exists, which keeps an unchanged catalog byte-for-byte intact.
    pub fn refresh(&mut self) -> Result<ReconcileResult, StoreError> {
        let scanned = scan::<T>(&self.source_dir)?;
        let result = reconcile::reconcile(scanned, &mut self.items);

        if result.added > 0 || !self.storage.exists(&self.ident) {
            self.save()?;
        }

        log::info!(
            "refreshed {}: scanned {}, added {}, total {}",
            T::KIND,
            result.scanned,
            result.added,
            result.total
        );

        Ok(result)
    }

    /// Differences between the source directory and the catalog. Read-only.
    pub fn status(&self) -> Result<Vec<Change>, StoreError> {
        let scanned = scan::<T>(&self.source_dir)?;
        Ok(diff(&scanned, &self.items))
    }

    /// Drop rows for deleted directories and rows superseded by newer
    /// content. Never called implicitly.
    pub fn purge(&mut self) -> Result<PurgeReport, StoreError> {
        let scanned = scan::<T>(&self.source_dir)?;
        let report = reconcile::purge(scanned, &mut self.items);

        if report.changed() {
            self.save()?;
        }

        log::info!(
            "purged {}: removed {}, appended {}, total {}",
            T::KIND,
            report.removed,
            report.appended,
            report.total
        );

        Ok(report)
    }

    /// Embed every item that has no embedding yet and persist once if any
    /// item was updated.
    pub fn generate_embeddings(
        &mut self,
        provider: &dyn EmbeddingProvider,
        throttle: Duration,
    ) -> Result<GenerateReport, StoreError> {
        log::info!("generating embeddings for {} {}", self.items.len(), T::KIND);

        let report = generate_missing(&mut self.items, provider, throttle)?;

        if report.updated > 0 {
            self.save()?;
        } else {
            log::info!("no new {} embeddings to save", T::KIND);
        }

        Ok(report)
    }

    pub fn paginate(&self, page: i64, per_page: i64) -> Page<T> {
        Page::of(&self.items, page, per_page)
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }
}

/// `{"<kind field>": [items...]}`
struct CatalogDocument<'a, T>(&'a [T]);

impl<T: CatalogItem> Serialize for CatalogDocument<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(T::KIND.field(), self.0)?;
        map.end()
    }
}

fn encode<T: CatalogItem>(items: &[T]) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec_pretty(&CatalogDocument(items))
}

/// `{}` and a `null` kind field are empty catalogs. Any other object must
/// carry the kind's field, so a file written for another kind is rejected
/// instead of being overwritten.
fn decode<T: CatalogItem>(bytes: &[u8]) -> serde_json::Result<Vec<T>> {
    let mut document: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(bytes)?;

    match document.remove(T::KIND.field()) {
        None if document.is_empty() => Ok(Vec::new()),
        None => Err(serde::de::Error::missing_field(T::KIND.field())),
        Some(serde_json::Value::Null) => Ok(Vec::new()),
        Some(items) => serde_json::from_value(items),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Entry, Model, Motion, Stage};

    fn model(id: &str) -> Model {
        Model(Entry {
            id: id.to_string(),
            name: format!("{id}.pmx"),
            ..Default::default()
        })
    }

    #[test]
    fn document_uses_kind_field() {
        let json = String::from_utf8(encode(&[model("a")]).unwrap()).unwrap();
        assert!(json.starts_with("{\n  \"models\": ["));

        let stages: Vec<Stage> = Vec::new();
        let json = String::from_utf8(encode(&stages).unwrap()).unwrap();
        assert!(json.contains("\"stages\""));
    }

    #[test]
    fn decode_roundtrip() {
        let bytes = encode(&[model("a"), model("b")]).unwrap();
        let items: Vec<Model> = decode(&bytes).unwrap();
        assert_eq!(items, vec![model("a"), model("b")]);
    }

    #[test]
    fn decode_empty_document_is_empty() {
        let items: Vec<Motion> = decode(b"{}").unwrap();
        assert!(items.is_empty());

        let items: Vec<Motion> = decode(b"{\"motions\": null}").unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn decode_rejects_other_kinds_document() {
        let err = decode::<Motion>(b"{\"models\": []}").unwrap_err();
        assert!(err.to_string().contains("motions"));

        assert!(decode::<Stage>(b"{\"stage\": []}").is_err());
    }

    #[test]
    fn decode_rejects_non_objects() {
        assert!(decode::<Model>(b"[]").is_err());
        assert!(decode::<Model>(b"{\"models\": [").is_err());
        assert!(decode::<Model>(b"{\"models\": {}}").is_err());
    }
}
