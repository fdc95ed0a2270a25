//! Remote embedding client.
//!
//! Converts text into fixed-dimension float vectors through an
//! embeddings API. Every failure mode — missing credentials, transport
//! errors, non-2xx status, malformed response body — degrades to an
//! empty vector, never an error: callers treat an empty vector as
//! "embedding unavailable" and keep going.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::config::EmbeddingConfig;

/// Seam for embedding generation. Implementations never fail; an empty
/// vector is the degraded result.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text. Whitespace-only input returns an empty
    /// vector without any network call.
    async fn embed(&self, text: &str) -> Vec<f32>;

    /// Vector dimension the backing model produces.
    fn dimensions(&self) -> usize;
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    task: &'a str,
    input: [&'a str; 1],
}

/// Embedding client over a Jina-style HTTP API.
///
/// One request per call; no retry, no cache. The `reqwest::Client` is
/// shared for connection pooling, but credentials attach per request.
pub struct HttpEmbeddingClient {
    client: reqwest::Client,
    config: EmbeddingConfig,
}

impl HttpEmbeddingClient {
    pub fn new(config: EmbeddingConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    /// Pull `data[0].embedding` out of the response body.
    fn extract_vector(body: &Value) -> Option<Vec<f32>> {
        let arr = body.get("data")?.get(0)?.get("embedding")?.as_array()?;
        let mut vector = Vec::with_capacity(arr.len());
        for v in arr {
            vector.push(v.as_f64()? as f32);
        }
        Some(vector)
    }

    async fn request_embedding(&self, text: &str, api_key: &str) -> Option<Vec<f32>> {
        let body = EmbeddingRequest {
            model: &self.config.model,
            task: &self.config.task,
            input: [text],
        };

        let response = match self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(err) => {
                log::warn!("embedding request failed: {err}");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            log::warn!("embedding service returned status {status}");
            return None;
        }

        let body: Value = match response.json().await {
            Ok(v) => v,
            Err(err) => {
                log::warn!("embedding response was not valid JSON: {err}");
                return None;
            }
        };

        let vector = Self::extract_vector(&body);
        if vector.is_none() {
            log::warn!("embedding response missing data[0].embedding");
        }
        vector
    }
}

#[async_trait]
impl Embedder for HttpEmbeddingClient {
    async fn embed(&self, text: &str) -> Vec<f32> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let api_key = match &self.config.api_key {
            Some(key) => key.clone(),
            None => {
                log::warn!("embedding api key missing; returning empty vector");
                return Vec::new();
            }
        };

        self.request_embedding(text, &api_key)
            .await
            .unwrap_or_default()
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_without_key() -> HttpEmbeddingClient {
        HttpEmbeddingClient::new(EmbeddingConfig {
            api_key: None,
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_blank_input_short_circuits() {
        let client = client_without_key();
        assert!(client.embed("").await.is_empty());
        assert!(client.embed("   \n\t").await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_key_degrades_to_empty() {
        let client = client_without_key();
        assert!(client.embed("some text").await.is_empty());
    }

    #[test]
    fn test_dimensions_come_from_config() {
        let client = client_without_key();
        assert_eq!(client.dimensions(), 1024);
    }

    #[test]
    fn test_extract_vector() {
        let body = serde_json::json!({
            "data": [ { "embedding": [0.1, -0.5, 2.0] } ]
        });
        let vector = HttpEmbeddingClient::extract_vector(&body).unwrap();
        assert_eq!(vector.len(), 3);
        assert!((vector[1] + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_extract_vector_missing_fields() {
        assert!(HttpEmbeddingClient::extract_vector(&serde_json::json!({})).is_none());
        assert!(HttpEmbeddingClient::extract_vector(&serde_json::json!({ "data": [] })).is_none());
        assert!(HttpEmbeddingClient::extract_vector(
            &serde_json::json!({ "data": [ { "embedding": "oops" } ] })
        )
        .is_none());
    }

    #[test]
    fn test_request_body_shape() {
        let body = EmbeddingRequest {
            model: "jina-embeddings-v3",
            task: "text-matching",
            input: ["hello"],
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], "jina-embeddings-v3");
        assert_eq!(value["task"], "text-matching");
        assert_eq!(value["input"][0], "hello");
    }
}
