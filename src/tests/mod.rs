//! Scenario tests over real directory trees in temp dirs.


use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::semantic::{EmbeddingError, EmbeddingProvider};
use crate::storage::StorageManager;

/// Create `<root>/<id>` with a reference file and optional description and
/// screenshots.
pub fn make_item(
    root: &Path,
    id: &str,
    reference: &str,
    description: Option<&str>,
    screenshots: &[&str],
) {
    let dir = root.join(id);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("ruta.txt"), reference).unwrap();

    if let Some(description) = description {
        std::fs::write(dir.join("descripcion.txt"), description).unwrap();
    }

    if !screenshots.is_empty() {
        let shots = dir.join("screenshots");
        std::fs::create_dir_all(&shots).unwrap();
        for file in screenshots {
            std::fs::write(shots.join(file), b"png").unwrap();
        }
    }
}

/// Storage kept in memory that counts writes.
#[derive(Default)]
pub struct MemoryStorage {
    files: Mutex<HashMap<String, Vec<u8>>>,
    writes: AtomicUsize,
}

impl MemoryStorage {
    pub fn with_file(ident: &str, data: &[u8]) -> Self {
        let storage = Self::default();
        storage
            .files
            .lock()
            .unwrap()
            .insert(ident.to_string(), data.to_vec());
        storage
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn contents(&self, ident: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(ident).cloned()
    }
}

impl StorageManager for MemoryStorage {
    fn write(&self, ident: &str, data: &[u8]) -> std::io::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.files
            .lock()
            .unwrap()
            .insert(ident.to_string(), data.to_vec());
        Ok(())
    }

    fn read(&self, ident: &str) -> std::io::Result<Vec<u8>> {
        self.contents(ident)
            .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::NotFound))
    }

    fn exists(&self, ident: &str) -> bool {
        self.files.lock().unwrap().contains_key(ident)
    }
}

/// Scripted embedding provider.
///
/// Returns `vector` when set, otherwise a vector derived from the text.
/// Texts containing any of `fail_on` get a provider error.
#[derive(Default)]
pub struct FakeProvider {
    calls: AtomicUsize,
    vector: Option<Vec<f64>>,
    fail_on: Vec<String>,
    unconfigured: bool,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vector(vector: Vec<f64>) -> Self {
        Self {
            vector: Some(vector),
            ..Default::default()
        }
    }

    pub fn failing_on(mut self, needle: &str) -> Self {
        self.fail_on.push(needle.to_string());
        self
    }

    pub fn unconfigured() -> Self {
        Self {
            unconfigured: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingProvider for FakeProvider {
    fn generate_embedding(&self, text: &str) -> Result<Vec<f64>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.unconfigured {
            return Err(EmbeddingError::NotConfigured("OPENAI_API_KEY".to_string()));
        }
        if self.fail_on.iter().any(|needle| text.contains(needle.as_str())) {
            return Err(EmbeddingError::Provider {
                status: 500,
                body: "internal error".to_string(),
            });
        }

        Ok(self
            .vector
            .clone()
            .unwrap_or_else(|| vec![text.len() as f64, 1.0]))
    }
}
