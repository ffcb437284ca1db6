//! Semantic search over catalog items.
//!
//! # Architecture
//!
//! - `embeddings`: provider contract and the OpenAI-compatible HTTP adapter
//! - `similarity`: cosine similarity
//! - `preprocess`: embedding input text
//! - `search`: query ranking
//! - `generate`: batch embedding generation for items without one

pub mod embeddings;
mod generate;
mod preprocess;
mod search;
mod similarity;

pub use embeddings::{EmbeddingError, EmbeddingProvider, OpenAiEmbeddings};
pub use generate::{generate_missing, GenerateReport};
pub use preprocess::embedding_text;
pub use search::{search, SearchError};
pub use similarity::cosine_similarity;

/// Default delay between two provider calls in a batch
pub const DEFAULT_THROTTLE_MS: u64 = 100;
