use super::embeddings::{EmbeddingError, EmbeddingProvider};
use super::similarity::cosine_similarity;
use crate::catalog::CatalogItem;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("failed to embed query: {0}")]
    QueryEmbedding(#[source] EmbeddingError),
}

/// Rank the embedded items of a catalog by similarity to `query`.
///
/// Items without an embedding are not candidates. Equal scores keep catalog
/// order. `limit <= 0` returns every candidate.
pub fn search<T: CatalogItem>(
    items: &[T],
    provider: &dyn EmbeddingProvider,
    query: &str,
    limit: i64,
) -> Result<Vec<T>, SearchError> {
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let query_embedding = provider
        .generate_embedding(query)
        .map_err(SearchError::QueryEmbedding)?;

    let mut scored: Vec<(f64, &T)> = items
        .iter()
        .filter_map(|item| {
            item.embedding()
                .map(|embedding| (cosine_similarity(&query_embedding, embedding), item))
        })
        .collect();

    // sort_by is stable
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    if limit > 0 && (limit as u64) < scored.len() as u64 {
        scored.truncate(limit as usize);
    }

    log::debug!("query {query:?} matched {} {}", scored.len(), T::KIND);

    Ok(scored.into_iter().map(|(_, item)| item.clone()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Entry, Model};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        vector: Vec<f64>,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn new(vector: Vec<f64>) -> Self {
            Self {
                vector,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl EmbeddingProvider for Fixed {
        fn generate_embedding(&self, _text: &str) -> Result<Vec<f64>, EmbeddingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.vector.clone())
        }
    }

    struct Failing;

    impl EmbeddingProvider for Failing {
        fn generate_embedding(&self, _text: &str) -> Result<Vec<f64>, EmbeddingError> {
            Err(EmbeddingError::Provider {
                status: 500,
                body: "boom".to_string(),
            })
        }
    }

    fn model(id: &str, embedding: Option<Vec<f64>>) -> Model {
        let mut m = Model(Entry {
            id: id.to_string(),
            name: id.to_string(),
            ..Default::default()
        });
        if let Some(embedding) = embedding {
            m.set_embedding(embedding);
        }
        m
    }

    fn ids(items: &[Model]) -> Vec<&str> {
        items.iter().map(|m| m.id()).collect()
    }

    #[test]
    fn ranks_by_descending_similarity() {
        let items = vec![
            model("far", Some(vec![0.0, 1.0])),
            model("near", Some(vec![1.0, 0.1])),
            model("exact", Some(vec![1.0, 0.0])),
        ];
        let found = search(&items, &Fixed::new(vec![1.0, 0.0]), "q", 10).unwrap();
        assert_eq!(ids(&found), vec!["exact", "near", "far"]);
    }

    #[test]
    fn ties_keep_catalog_order() {
        let items = vec![
            model("b", Some(vec![1.0, 0.0])),
            model("a", Some(vec![2.0, 0.0])),
            model("c", Some(vec![3.0, 0.0])),
        ];
        let found = search(&items, &Fixed::new(vec![1.0, 0.0]), "q", 0).unwrap();
        assert_eq!(ids(&found), vec!["b", "a", "c"]);
    }

    #[test]
    fn limit_rules() {
        let items: Vec<Model> = (0..5)
            .map(|i| model(&i.to_string(), Some(vec![1.0, i as f64])))
            .collect();
        let provider = Fixed::new(vec![1.0, 0.0]);

        assert_eq!(search(&items, &provider, "q", 2).unwrap().len(), 2);
        assert_eq!(search(&items, &provider, "q", 0).unwrap().len(), 5);
        assert_eq!(search(&items, &provider, "q", -1).unwrap().len(), 5);
        assert_eq!(search(&items, &provider, "q", 50).unwrap().len(), 5);
    }

    #[test]
    fn skips_items_without_embedding() {
        let items = vec![model("a", None), model("b", Some(vec![1.0])), model("c", None)];
        let found = search(&items, &Fixed::new(vec![1.0]), "q", 0).unwrap();
        assert_eq!(ids(&found), vec!["b"]);
    }

    #[test]
    fn empty_catalog_skips_provider() {
        let provider = Fixed::new(vec![1.0]);
        let found = search::<Model>(&[], &provider, "q", 3).unwrap();
        assert!(found.is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unembedded_catalog_still_embeds_query() {
        let provider = Fixed::new(vec![1.0]);
        let found = search(&[model("a", None)], &provider, "q", 3).unwrap();
        assert!(found.is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn provider_failure_is_wrapped() {
        let err = search(&[model("a", Some(vec![1.0]))], &Failing, "q", 3).unwrap_err();
        assert!(matches!(
            err,
            SearchError::QueryEmbedding(EmbeddingError::Provider { status: 500, .. })
        ));
        assert!(std::error::Error::source(&err).is_some());
    }
}
