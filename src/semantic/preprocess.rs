//! Text prepared for embedding generation.

/// Input text for an item's embedding.
///
/// Both fields are passed through as-is so the stored embeddings stay
/// comparable with ones generated earlier from the same template.
pub fn embedding_text(name: &str, description: &str) -> String {
    format!("Name: {name}\nDescription: {description}")
}
