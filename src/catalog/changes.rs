use std::collections::BTreeMap;

use serde::Serialize;

use super::CatalogItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Directory with no persisted row for its id.
    Added,
    /// Persisted id whose rows all differ from the directory.
    Modified,
    /// Persisted id without a directory.
    Deleted,
    /// A current row exists, next to outdated or duplicate rows for the id.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub id: String,
    pub kind: ChangeKind,
}

/// Differences between a fresh scan and the persisted catalog, sorted by id.
pub fn diff<T: CatalogItem>(scanned: &[T], persisted: &[T]) -> Vec<Change> {
    let mut changes = BTreeMap::new();

    for item in scanned {
        let rows: Vec<&T> = persisted.iter().filter(|row| row.id() == item.id()).collect();
        let current = rows.iter().filter(|row| row.same_content(item)).count();
        let kind = if rows.is_empty() {
            ChangeKind::Added
        } else if current == 0 {
            ChangeKind::Modified
        } else if rows.len() > 1 {
            ChangeKind::Stale
        } else {
            continue;
        };
        changes.insert(item.id().to_string(), kind);
    }

    for row in persisted {
        if !scanned.iter().any(|item| item.id() == row.id()) {
            changes.insert(row.id().to_string(), ChangeKind::Deleted);
        }
    }

    changes
        .into_iter()
        .map(|(id, kind)| Change { id, kind })
        .collect()
}
