//! Blocking OpenAI-compatible embedding client.

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{Embedder, EmbeddingError};

/// Embedder backed by an OpenAI-compatible `/embeddings` endpoint.
///
/// Credentials and endpoint are passed in explicitly; the client never reads
/// the process environment. Transient failures (rate limits, 5xx, transport
/// errors) retry with capped exponential backoff.
#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    dimensions: usize,
    max_retries: usize,
}

impl OpenAiEmbedder {
    /// Builds a new embedding client.
    ///
    /// `dimensions` must match what the remote model emits; the store rejects
    /// vectors of any other size.
    pub fn new(
        api_key: String,
        base_url: String,
        model: String,
        dimensions: usize,
        timeout: Duration,
        max_retries: usize,
    ) -> Result<Self> {
        anyhow::ensure!(!api_key.trim().is_empty(), "missing API key");
        anyhow::ensure!(!model.trim().is_empty(), "missing embedding model name");
        anyhow::ensure!(dimensions > 0, "embedding dimension must be positive");

        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth).context("invalid API key")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("failed to build embedding HTTP client")?;

        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            model,
            dimensions,
            max_retries: max_retries.max(1),
        })
    }

    fn request_batch(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut attempt = 0usize;
        loop {
            match self.post_once(inputs) {
                Ok(embeddings) => return Ok(embeddings),
                Err(failure) if failure.retryable && attempt + 1 < self.max_retries => {
                    attempt += 1;
                    thread::sleep(retry_backoff(attempt));
                }
                Err(failure) => return Err(failure.error),
            }
        }
    }

    fn post_once(&self, inputs: &[&str]) -> std::result::Result<Vec<Vec<f32>>, RequestFailure> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: inputs,
        };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .map_err(|err| RequestFailure {
                retryable: err.is_timeout() || err.is_connect() || err.is_request(),
                error: err.into(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(RequestFailure {
                retryable: status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error(),
                error: anyhow::anyhow!("embeddings request failed ({status}): {body}"),
            });
        }

        let mut parsed: EmbeddingResponse = response
            .json()
            .context("failed to parse embedding response")
            .map_err(RequestFailure::fatal)?;
        parsed.data.sort_by_key(|entry| entry.index);
        Ok(parsed.data.into_iter().map(|entry| entry.embedding).collect())
    }
}

impl Embedder for OpenAiEmbedder {
    fn embed_batch(&self, texts: &[&str]) -> std::result::Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let embeddings = self.request_batch(texts).map_err(EmbeddingError::Backend)?;
        if embeddings.len() != texts.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: texts.len(),
                actual: embeddings.len(),
            });
        }
        if let Some(vector) = embeddings.iter().find(|v| v.len() != self.dimensions) {
            return Err(EmbeddingError::Backend(anyhow::anyhow!(
                "model {} returned {}-dimensional vectors, expected {}",
                self.model,
                vector.len(),
                self.dimensions
            )));
        }
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

struct RequestFailure {
    retryable: bool,
    error: anyhow::Error,
}

impl RequestFailure {
    fn fatal(error: anyhow::Error) -> Self {
        Self {
            retryable: false,
            error,
        }
    }
}

fn retry_backoff(attempt: usize) -> Duration {
    let capped = attempt.min(5) as u32;
    Duration::from_millis(500 * (1 << capped))
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}
