//! Builds a catalog from the current state of a source directory.
//!
//! Layout per item: `<root>/<id>/ruta.txt` (required),
//! `<root>/<id>/descripcion.txt` (optional), `<root>/<id>/screenshots/*` and,
//! for motions, `<root>/<id>/video/*`.

use std::path::{Path, PathBuf};

use super::CatalogItem;

const REFERENCE_FILE: &str = "ruta.txt";
const DESCRIPTION_FILE: &str = "descripcion.txt";
const SCREENSHOTS_DIR: &str = "screenshots";
const VIDEO_DIR: &str = "video";

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("failed to read source directory {path}: {source}")]
    ReadRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Kind-independent result of reading one item directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScannedItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub original_path: String,
    pub screenshots: Vec<String>,
    pub video: Vec<String>,
}

/// Scan `root` and return one item per valid subdirectory, sorted by id.
///
/// Only a failure to list `root` itself is an error. Subdirectories without
/// a reference file are skipped; unreadable optional files count as absent.
pub fn scan<T: CatalogItem>(root: &Path) -> Result<Vec<T>, ScanError> {
    let read_root = |source| ScanError::ReadRoot {
        path: root.to_path_buf(),
        source,
    };

    let mut items = Vec::new();
    for entry in std::fs::read_dir(root).map_err(read_root)? {
        let entry = entry.map_err(read_root)?;

        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !is_dir {
            continue;
        }

        let Ok(id) = entry.file_name().into_string() else {
            log::warn!("skipping non utf-8 directory name {:?}", entry.path());
            continue;
        };

        if let Some(scanned) = scan_item(&entry.path(), id, T::KIND.has_video()) {
            items.push(T::from_scan(scanned));
        }
    }

    items.sort_by(|a: &T, b: &T| a.id().cmp(b.id()));

    log::debug!("scanned {} {} in {}", items.len(), T::KIND, root.display());

    Ok(items)
}

fn scan_item(dir: &Path, id: String, with_video: bool) -> Option<ScannedItem> {
    let Some(reference) = read_text(&dir.join(REFERENCE_FILE)) else {
        log::debug!("{} has no {REFERENCE_FILE}, skipping", dir.display());
        return None;
    };

    let original_path = reference.trim().to_string();
    let name = last_segment(&original_path).to_string();
    let description = read_text(&dir.join(DESCRIPTION_FILE)).unwrap_or_default();
    let screenshots = list_media(&dir.join(SCREENSHOTS_DIR));
    let video = if with_video {
        list_media(&dir.join(VIDEO_DIR))
    } else {
        Vec::new()
    };

    Some(ScannedItem {
        id,
        name,
        description,
        original_path,
        screenshots,
        video,
    })
}

fn read_text(path: &Path) -> Option<String> {
    std::fs::read(path)
        .ok()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}

/// Final segment of a reference path. Both separators are honored since the
/// reference files are usually written on Windows.
fn last_segment(path: &str) -> &str {
    let trimmed = path.trim_end_matches(['/', '\\']);
    trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed)
}

/// Absolute paths of the plain files directly inside `dir`, sorted.
/// A missing or unreadable folder yields an empty list.
fn list_media(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut files: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| !t.is_dir()).unwrap_or(false))
        .filter_map(|entry| std::path::absolute(entry.path()).ok())
        .map(|path| path.to_string_lossy().into_owned())
        .collect();

    files.sort();
    files
}
