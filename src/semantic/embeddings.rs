//! Embedding provider adapter.
//!
//! Provides the seam between the catalog and whatever turns text into vectors:
//! - `EmbeddingProvider`: the contract the engine depends on
//! - `OpenAiEmbeddings`: blocking client for OpenAI-compatible `/embeddings`

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default request timeout for a single embedding call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default embedding model (3072 dimensions)
pub const DEFAULT_MODEL: &str = "text-embedding-3-large";

/// Default API base
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Error type for embedding operations
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("embedding provider is not configured: {0} is not set")]
    NotConfigured(String),

    #[error("embedding provider returned {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("malformed embedding response: {0}")]
    Malformed(String),

    #[error("embedding request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl EmbeddingError {
    /// Errors that will repeat for every call until the setup changes.
    pub fn is_configuration(&self) -> bool {
        matches!(self, EmbeddingError::NotConfigured(_))
    }
}

/// Turns a text into a fixed-length vector.
pub trait EmbeddingProvider: Send + Sync {
    fn generate_embedding(&self, text: &str) -> Result<Vec<f64>, EmbeddingError>;
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f64>,
}

/// OpenAI embeddings over blocking HTTP.
pub struct OpenAiEmbeddings {
    client: reqwest::blocking::Client,
    api_base: String,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
}

impl OpenAiEmbeddings {
    /// Build a client with an explicit per-request timeout.
    ///
    /// `api_key` may be absent: the adapter is still constructed so catalog
    /// browsing works, and each call reports [`EmbeddingError::NotConfigured`].
    pub fn new(
        api_base: &str,
        model: &str,
        api_key: Option<String>,
        api_key_env: &str,
        timeout: Duration,
    ) -> Result<Self, EmbeddingError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self::with_client(client, api_base, model, api_key, api_key_env))
    }

    pub fn with_client(
        client: reqwest::blocking::Client,
        api_base: &str,
        model: &str,
        api_key: Option<String>,
        api_key_env: &str,
    ) -> Self {
        Self {
            client,
            api_base: api_base.strip_suffix('/').unwrap_or(api_base).to_string(),
            model: model.to_string(),
            api_key: api_key.map(|key| key.trim().to_string()).filter(|key| !key.is_empty()),
            api_key_env: api_key_env.to_string(),
        }
    }

    /// Read the credential from the environment variable `api_key_env`.
    pub fn from_env(
        api_base: &str,
        model: &str,
        api_key_env: &str,
        timeout: Duration,
    ) -> Result<Self, EmbeddingError> {
        let api_key = std::env::var(api_key_env).ok();
        Self::new(api_base, model, api_key, api_key_env, timeout)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

impl EmbeddingProvider for OpenAiEmbeddings {
    fn generate_embedding(&self, text: &str) -> Result<Vec<f64>, EmbeddingError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| EmbeddingError::NotConfigured(self.api_key_env.clone()))?;

        log::debug!("requesting embedding from {} ({})", self.api_base, self.model);

        let response = self
            .client
            .post(format!("{}/embeddings", self.api_base))
            .bearer_auth(api_key)
            .json(&EmbeddingRequest {
                input: text,
                model: &self.model,
            })
            .send()?;

        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(EmbeddingError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        parse_response(&body)
    }
}

/// Extract the first embedding from an `/embeddings` response body.
fn parse_response(body: &str) -> Result<Vec<f64>, EmbeddingError> {
    let response: EmbeddingResponse = serde_json::from_str(body).map_err(|err| {
        log::error!("{err}. tried to parse: {body:?}");
        EmbeddingError::Malformed(err.to_string())
    })?;

    let embedding = response
        .data
        .into_iter()
        .next()
        .ok_or_else(|| EmbeddingError::Malformed("no embedding returned".to_string()))?
        .embedding;

    if embedding.is_empty() {
        return Err(EmbeddingError::Malformed("embedding is empty".to_string()));
    }

    Ok(embedding)
}
