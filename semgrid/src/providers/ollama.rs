//! Ollama embedding backend.
//!
//! Talks to a local (or remote) Ollama server's `/api/embed` endpoint.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::embedding::{Embedding, EmbeddingProvider, EmbeddingRequest, EmbeddingResponse};
use crate::error::{ProviderError, Result};

/// Configuration for the Ollama client.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Base URL for the Ollama API.
    pub base_url: String,
    /// Embedding model to use.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Controls how long the model stays loaded in memory (e.g., "5m", "0"
    /// to unload immediately).
    pub keep_alive: Option<String>,
}

impl OllamaConfig {
    /// Default Ollama API base URL.
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:11434";
    /// Default embedding model.
    pub const DEFAULT_MODEL: &'static str = "nomic-embed-text";

    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates configuration with a specific model.
    #[must_use]
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Creates configuration from environment variables.
    ///
    /// Reads from:
    /// - `OLLAMA_BASE_URL` - Optional base URL
    /// - `OLLAMA_EMBED_MODEL` - Optional embedding model
    /// - `OLLAMA_KEEP_ALIVE` - Optional keep alive duration
    #[must_use]
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("OLLAMA_BASE_URL").unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_owned());

        let model =
            std::env::var("OLLAMA_EMBED_MODEL").unwrap_or_else(|_| Self::DEFAULT_MODEL.to_owned());

        let keep_alive = std::env::var("OLLAMA_KEEP_ALIVE").ok();

        Self {
            base_url,
            model,
            timeout_secs: Some(300),
            keep_alive,
        }
    }

    /// Sets the base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the embedding model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Sets the keep alive duration.
    #[must_use]
    pub fn keep_alive(mut self, duration: impl Into<String>) -> Self {
        self.keep_alive = Some(duration.into());
        self
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
            model: Self::DEFAULT_MODEL.to_owned(),
            timeout_secs: Some(300),
            keep_alive: None,
        }
    }
}

/// Ollama embedding request body.
#[derive(Debug, Clone, Serialize)]
struct OllamaEmbeddingRequest {
    model: String,
    input: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    keep_alive: Option<String>,
}

/// Ollama embedding response body.
#[derive(Debug, Clone, Deserialize)]
struct OllamaEmbeddingResponse {
    embeddings: Vec<Vec<f32>>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
}

/// Ollama error response.
#[derive(Debug, Clone, Deserialize)]
struct OllamaErrorResponse {
    error: String,
}

/// Ollama API client.
#[derive(Debug, Clone)]
pub struct Ollama {
    config: Arc<OllamaConfig>,
    http_client: Client,
}

impl Ollama {
    /// Create a new Ollama client with the given configuration.
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        let http_client = builder
            .build()
            .map_err(|e| ProviderError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            config: Arc::new(config),
            http_client,
        })
    }

    /// Create a client with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(OllamaConfig::default())
    }

    /// Create a client from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(OllamaConfig::from_env())
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Get the configured embedding model.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Build the embeddings API URL.
    fn embeddings_url(&self) -> String {
        format!("{}/api/embed", self.config.base_url)
    }

    /// Parse an error response from Ollama.
    fn parse_error(status: u16, body: &str) -> ProviderError {
        if let Ok(error_response) = serde_json::from_str::<OllamaErrorResponse>(body) {
            return ProviderError::provider("ollama", error_response.error);
        }
        ProviderError::http_status(status, body.to_owned())
    }
}

#[async_trait]
impl EmbeddingProvider for Ollama {
    async fn embed(&self, request: &EmbeddingRequest) -> Result<EmbeddingResponse> {
        let url = self.embeddings_url();

        let model = if request.model.is_empty() {
            self.config.model.clone()
        } else {
            request.model.clone()
        };

        let body = OllamaEmbeddingRequest {
            model: model.clone(),
            input: request.input.clone(),
            keep_alive: self.config.keep_alive.clone(),
        };

        tracing::debug!(model = %model, inputs = request.input.len(), "Ollama embed request");
        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(ProviderError::from)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Self::parse_error(status.as_u16(), &error_text).into());
        }

        let response_text = response.text().await.map_err(ProviderError::from)?;
        let parsed: OllamaEmbeddingResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                ProviderError::response_format(
                    "valid Ollama embedding response",
                    format!("parse error: {e}, response: {response_text}"),
                )
            })?;

        let embeddings = parsed
            .embeddings
            .into_iter()
            .enumerate()
            .map(|(i, vector)| Embedding::new(vector, i))
            .collect();

        let mut out = EmbeddingResponse::new(embeddings).with_model(model);
        if let Some(tokens) = parsed.prompt_eval_count {
            out = out.with_usage(tokens, tokens);
        }
        Ok(out)
    }

    fn default_embedding_model(&self) -> &str {
        &self.config.model
    }

    fn embedding_dimension(&self) -> Option<usize> {
        // Dimension depends on the model; learned at pipeline load time.
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod config {
        use super::*;

        #[test]
        fn default_values() {
            let config = OllamaConfig::default();
            assert_eq!(config.base_url, OllamaConfig::DEFAULT_BASE_URL);
            assert_eq!(config.model, OllamaConfig::DEFAULT_MODEL);
            assert_eq!(config.timeout_secs, Some(300));
            assert!(config.keep_alive.is_none());
        }

        #[test]
        fn with_model_sets_model() {
            let config = OllamaConfig::with_model("mxbai-embed-large");
            assert_eq!(config.model, "mxbai-embed-large");
            assert_eq!(config.base_url, OllamaConfig::DEFAULT_BASE_URL);
        }

        #[test]
        fn builder_chain() {
            let config = OllamaConfig::new()
                .base_url("http://gpu-server:11434")
                .model("all-minilm")
                .timeout(60)
                .keep_alive("5m");

            assert_eq!(config.base_url, "http://gpu-server:11434");
            assert_eq!(config.model, "all-minilm");
            assert_eq!(config.timeout_secs, Some(60));
            assert_eq!(config.keep_alive.as_deref(), Some("5m"));
        }
    }

    mod client {
        use super::*;

        #[test]
        fn new_creates_client_with_config() {
            let client = Ollama::with_defaults().unwrap();
            assert_eq!(client.base_url(), OllamaConfig::DEFAULT_BASE_URL);
            assert_eq!(client.model(), OllamaConfig::DEFAULT_MODEL);
        }

        #[test]
        fn embeddings_url_format() {
            let client = Ollama::with_defaults().unwrap();
            assert_eq!(
                client.embeddings_url(),
                "http://localhost:11434/api/embed"
            );
        }

        #[test]
        fn urls_with_custom_base() {
            let config = OllamaConfig::new().base_url("http://gpu-server:11434");
            let client = Ollama::new(config).unwrap();
            assert_eq!(
                client.embeddings_url(),
                "http://gpu-server:11434/api/embed"
            );
        }

        #[test]
        fn default_embedding_model_reflects_config() {
            let client = Ollama::new(OllamaConfig::with_model("all-minilm")).unwrap();
            assert_eq!(client.default_embedding_model(), "all-minilm");
        }

        #[test]
        fn client_is_clone() {
            let client = Ollama::with_defaults().unwrap();
            let cloned = client.clone();
            assert_eq!(client.base_url(), cloned.base_url());
        }
    }

    mod error_parsing {
        use super::*;

        #[test]
        fn parses_ollama_error_response() {
            let body = r#"{"error":"model not found"}"#;
            let error = Ollama::parse_error(404, body);
            assert!(error.to_string().contains("model not found"));
        }

        #[test]
        fn handles_non_json_error_body() {
            let error = Ollama::parse_error(500, "Internal Server Error");
            let s = error.to_string();
            assert!(s.contains("500") || s.contains("Internal Server Error"));
        }

        #[test]
        fn handles_empty_error_body() {
            let error = Ollama::parse_error(502, "");
            assert!(error.to_string().contains("502"));
        }
    }

    mod serialization {
        use super::*;

        #[test]
        fn request_skips_absent_keep_alive() {
            let body = OllamaEmbeddingRequest {
                model: "nomic-embed-text".to_owned(),
                input: vec!["hello".to_owned()],
                keep_alive: None,
            };
            let json = serde_json::to_string(&body).unwrap();

            assert!(json.contains("\"model\":\"nomic-embed-text\""));
            assert!(json.contains("\"input\":[\"hello\"]"));
            assert!(!json.contains("keep_alive"));
        }

        #[test]
        fn request_includes_keep_alive_when_set() {
            let body = OllamaEmbeddingRequest {
                model: "nomic-embed-text".to_owned(),
                input: vec![],
                keep_alive: Some("5m".to_owned()),
            };
            let json = serde_json::to_string(&body).unwrap();
            assert!(json.contains("\"keep_alive\":\"5m\""));
        }

        #[test]
        fn response_deserializes() {
            let json = r#"{"embeddings":[[0.1,0.2],[0.3,0.4]],"prompt_eval_count":12}"#;
            let parsed: OllamaEmbeddingResponse = serde_json::from_str(json).unwrap();

            assert_eq!(parsed.embeddings.len(), 2);
            assert_eq!(parsed.prompt_eval_count, Some(12));
        }

        #[test]
        fn response_without_token_count() {
            let json = r#"{"embeddings":[[1.0]]}"#;
            let parsed: OllamaEmbeddingResponse = serde_json::from_str(json).unwrap();
            assert!(parsed.prompt_eval_count.is_none());
        }
    }
}
