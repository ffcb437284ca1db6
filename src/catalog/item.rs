use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

use super::{CatalogItem, Kind, ScannedItem};

/// Fields shared by every catalog kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub screenshots: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub original_path: String,
    #[serde(
        default,
        skip_serializing_if = "embedding_unset",
        deserialize_with = "empty_as_unset"
    )]
    pub embedding: Option<Vec<f64>>,
}

impl Entry {
    fn from_scan(scanned: &ScannedItem) -> Self {
        Entry {
            id: scanned.id.clone(),
            name: scanned.name.clone(),
            screenshots: scanned.screenshots.clone(),
            description: scanned.description.clone(),
            original_path: scanned.original_path.clone(),
            embedding: None,
        }
    }

    /// Two entries describe the same on-disk state when their identity and
    /// text fields match exactly and their screenshots hold the same paths in
    /// any order.
    /// Embeddings are ignored.
    pub fn same_content(&self, other: &Entry) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.description == other.description
            && self.original_path == other.original_path
            && same_set(&self.screenshots, &other.screenshots)
    }
}

fn same_set(a: &[String], b: &[String]) -> bool {
    a.len() == b.len()
        && a.iter().collect::<BTreeSet<_>>() == b.iter().collect::<BTreeSet<_>>()
}

fn embedding_unset(embedding: &Option<Vec<f64>>) -> bool {
    embedding.as_ref().map_or(true, |e| e.is_empty())
}

// Older catalog files carry `null` for empty lists.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn empty_as_unset<'de, D>(deserializer: D) -> Result<Option<Vec<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<f64>>::deserialize(deserializer)?.filter(|e| !e.is_empty()))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Model(pub Entry);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stage(pub Entry);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    #[serde(flatten)]
    pub entry: Entry,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub video: Vec<String>,
}

impl CatalogItem for Model {
    const KIND: Kind = Kind::Models;

    fn from_scan(scanned: ScannedItem) -> Self {
        Model(Entry::from_scan(&scanned))
    }

    fn entry(&self) -> &Entry {
        &self.0
    }

    fn entry_mut(&mut self) -> &mut Entry {
        &mut self.0
    }
}

impl CatalogItem for Stage {
    const KIND: Kind = Kind::Stages;

    fn from_scan(scanned: ScannedItem) -> Self {
        Stage(Entry::from_scan(&scanned))
    }

    fn entry(&self) -> &Entry {
        &self.0
    }

    fn entry_mut(&mut self) -> &mut Entry {
        &mut self.0
    }
}

impl CatalogItem for Motion {
    const KIND: Kind = Kind::Motions;

    fn from_scan(scanned: ScannedItem) -> Self {
        let entry = Entry::from_scan(&scanned);
        Motion {
            entry,
            video: scanned.video,
        }
    }

    fn entry(&self) -> &Entry {
        &self.entry
    }

    fn entry_mut(&mut self) -> &mut Entry {
        &mut self.entry
    }
}
