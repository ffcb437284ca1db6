//! Merging fresh scans into a persisted catalog.
//!
//! `reconcile` only ever appends: persisted rows, and the embeddings stored
//! on them, are never modified or removed. Cleaning up rows for deleted or
//! changed directories is left to `purge`, which has to be asked for
//! explicitly.

use std::collections::HashSet;

use serde::Serialize;

use super::CatalogItem;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileResult {
    /// Items found by the scan.
    pub scanned: usize,
    /// Scanned items appended because no equal row was persisted.
    pub added: usize,
    /// Catalog size after the merge.
    pub total: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
    /// Rows dropped (deleted directories and superseded rows).
    pub removed: usize,
    /// Current rows appended because they were not persisted yet.
    pub appended: usize,
    pub total: usize,
}

impl PurgeReport {
    pub fn changed(&self) -> bool {
        self.removed > 0 || self.appended > 0
    }
}

/// Append every scanned item that has no equal row in `persisted`.
///
/// Appended rows keep scan order and the catalog is not re-sorted.
pub fn reconcile<T: CatalogItem>(scanned: Vec<T>, persisted: &mut Vec<T>) -> ReconcileResult {
    let scanned_count = scanned.len();

    let missing: Vec<T> = scanned
        .into_iter()
        .filter(|item| !persisted.iter().any(|row| row.same_content(item)))
        .collect();

    let added = missing.len();
    persisted.extend(missing);

    ReconcileResult {
        scanned: scanned_count,
        added,
        total: persisted.len(),
    }
}

/// Drop rows whose directory is gone or whose content no longer matches the
/// directory, keeping exactly the rows equal to the current scan.
///
/// Rows equal to a scanned item keep their position and embedding. Scanned
/// items without an equal row are appended first, so a purge never loses a
/// current item.
pub fn purge<T: CatalogItem>(scanned: Vec<T>, persisted: &mut Vec<T>) -> PurgeReport {
    let appended = reconcile(scanned.clone(), persisted).added;

    // one row per scanned item, preferring a row that already has an embedding
    let keep: HashSet<usize> = scanned
        .iter()
        .filter_map(|item| {
            let equal: Vec<(usize, &T)> = persisted
                .iter()
                .enumerate()
                .filter(|(_, row)| row.same_content(item))
                .collect();
            equal
                .iter()
                .find(|(_, row)| row.embedding().is_some())
                .or_else(|| equal.first())
                .map(|(index, _)| *index)
        })
        .collect();

    let before = persisted.len();
    let mut index = 0;
    persisted.retain(|_| {
        let kept = keep.contains(&index);
        index += 1;
        kept
    });

    PurgeReport {
        removed: before - persisted.len(),
        appended,
        total: persisted.len(),
    }
}
