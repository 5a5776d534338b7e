//! OpenAI-compatible embeddings client (`/v1/embeddings`).
//!
//! Works against OpenAI, Ollama (`all-minilm`, `nomic-embed-text`) and other
//! servers speaking the same protocol. Inputs are sent in batches.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingError;
use crate::llm::providers::openai_compatible::error_message;

/// Inputs per request.
const BATCH_SIZE: usize = 128;

#[derive(Debug, Clone)]
pub struct OpenAiCompatibleEmbedder {
    client: Client,
    api_base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiCompatibleEmbedder {
    pub fn new(
        api_base_url: String,
        model: String,
        timeout_seconds: u64,
        api_key: Option<String>,
    ) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| EmbeddingError::Request(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, api_base_url, model, api_key })
    }

    pub async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(BATCH_SIZE) {
            out.extend(self.embed_chunk(batch).await?);
        }
        Ok(out)
    }

    async fn embed_chunk(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let payload = EmbeddingRequest { model: &self.model, input: texts };
        debug!(model = %self.model, inputs = texts.len(), "sending embedding request");

        let mut req = self.client.post(&self.api_base_url).json(&payload);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await.map_err(|e| {
            error!(url = %self.api_base_url, error = %e, "embedding request failed (transport)");
            EmbeddingError::Request(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response).await;
            error!(%status, %message, "embedding request returned HTTP error");
            return Err(EmbeddingError::Request(message));
        }

        let parsed = response
            .json::<EmbeddingResponse>()
            .await
            .map_err(|e| EmbeddingError::Request(format!("failed to parse response body: {e}")))?;

        into_vectors(parsed, texts.len())
    }
}

/// Order vectors by the server-reported `index` and check the count.
fn into_vectors(
    mut parsed: EmbeddingResponse,
    expected: usize,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    if parsed.data.len() != expected {
        return Err(EmbeddingError::Mismatch { expected, got: parsed.data.len() });
    }
    parsed.data.sort_by_key(|d| d.index);
    Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}
