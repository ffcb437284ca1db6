//! Content catalogs backed by directory trees.
//!
//! - `item`: typed records for models, stages and motions
//! - `scanner`: builds a fresh catalog from a source directory
//! - `reconcile`: merges a scan into the persisted catalog
//! - `changes`: dry-run diff between a scan and the persisted catalog
//! - `page`: pagination views
//! - `store`: owns one kind's catalog and its backing file

pub mod changes;
pub mod item;
pub mod page;
pub mod reconcile;
pub mod scanner;
pub mod store;

use serde::{de::DeserializeOwned, Serialize};

pub use changes::{diff, Change, ChangeKind};
pub use item::{Entry, Model, Motion, Stage};
pub use page::Page;
pub use reconcile::{reconcile, PurgeReport, ReconcileResult};
pub use scanner::{scan, ScanError, ScannedItem};
pub use store::{CatalogStore, PersistenceError, StoreError};

/// The content kinds the catalog knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Models,
    Stages,
    Motions,
}

impl Kind {
    pub const ALL: [Kind; 3] = [Kind::Models, Kind::Stages, Kind::Motions];

    /// Name of the array field in the persisted catalog document.
    pub fn field(self) -> &'static str {
        match self {
            Kind::Models => "models",
            Kind::Stages => "stages",
            Kind::Motions => "motions",
        }
    }

    pub fn default_source_dir(self) -> &'static str {
        match self {
            Kind::Models => "data/Models",
            Kind::Stages => "data/Stages",
            Kind::Motions => "data/Motions",
        }
    }

    pub fn default_catalog_file(self) -> &'static str {
        match self {
            Kind::Models => "data/models.json",
            Kind::Stages => "data/stages.json",
            Kind::Motions => "data/motions.json",
        }
    }

    /// Whether items of this kind carry a `video` media folder.
    pub fn has_video(self) -> bool {
        matches!(self, Kind::Motions)
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field())
    }
}

/// Capabilities the engine needs from an item kind.
///
/// Scanning, reconciliation, pagination, search and embedding generation are
/// written once against this trait.
pub trait CatalogItem: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: Kind;

    fn from_scan(scanned: ScannedItem) -> Self;

    fn entry(&self) -> &Entry;

    fn entry_mut(&mut self) -> &mut Entry;

    fn id(&self) -> &str {
        &self.entry().id
    }

    /// The stored embedding, if one has been generated.
    fn embedding(&self) -> Option<&[f64]> {
        self.entry()
            .embedding
            .as_deref()
            .filter(|embedding| !embedding.is_empty())
    }

    fn set_embedding(&mut self, embedding: Vec<f64>) {
        self.entry_mut().embedding = if embedding.is_empty() {
            None
        } else {
            Some(embedding)
        };
    }

    /// Text sent to the embedding provider for this item.
    fn embedding_text(&self) -> String {
        let entry = self.entry();
        crate::semantic::embedding_text(&entry.name, &entry.description)
    }

    /// Reconciliation equality: see [`Entry::same_content`].
    fn same_content(&self, other: &Self) -> bool {
        self.entry().same_content(other.entry())
    }
}
