use std::time::Duration;

use serde::Serialize;

use super::embeddings::{EmbeddingError, EmbeddingProvider};
use crate::catalog::CatalogItem;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GenerateReport {
    pub total: usize,
    /// Items that already had an embedding.
    pub skipped: usize,
    pub updated: usize,
    pub failed: usize,
}

/// Embed every item without an embedding, one request at a time.
///
/// Provider failures are counted per item and the batch carries on. A
/// missing credential fails every call alike, so it aborts the batch and
/// is returned. `throttle` is slept between consecutive provider calls.
pub fn generate_missing<T: CatalogItem>(
    items: &mut [T],
    provider: &dyn EmbeddingProvider,
    throttle: Duration,
) -> Result<GenerateReport, EmbeddingError> {
    let mut report = GenerateReport {
        total: items.len(),
        ..Default::default()
    };
    let mut called = false;

    for (i, item) in items.iter_mut().enumerate() {
        if item.embedding().is_some() {
            report.skipped += 1;
            continue;
        }

        if called && !throttle.is_zero() {
            std::thread::sleep(throttle);
        }
        called = true;

        log::info!("[{}/{}] embedding {}", i + 1, report.total, item.id());

        match provider.generate_embedding(&item.embedding_text()) {
            Ok(embedding) => {
                item.set_embedding(embedding);
                report.updated += 1;
            }
            Err(err) if err.is_configuration() => return Err(err),
            Err(err) => {
                log::warn!("failed to embed {} {}: {err}", T::KIND, item.id());
                report.failed += 1;
            }
        }
    }

    log::info!(
        "{} embeddings: {} updated, {} skipped, {} failed",
        T::KIND,
        report.updated,
        report.skipped,
        report.failed
    );

    Ok(report)
}
