//! OpenAI embedding backend.
//!
//! Talks to the OpenAI Embeddings API (or any compatible server via a custom
//! base URL).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::embedding::{Embedding, EmbeddingProvider, EmbeddingRequest, EmbeddingResponse};
use crate::error::{ProviderError, Result};

/// Configuration for the OpenAI client.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Base URL for the API (defaults to OpenAI's API).
    pub base_url: String,
    /// Embedding model to use.
    pub model: String,
    /// Optional organization ID.
    pub organization: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl OpenAIConfig {
    /// Default OpenAI API base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";
    /// Default embedding model.
    pub const DEFAULT_MODEL: &'static str = "text-embedding-3-small";

    /// Creates a new configuration with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
            model: Self::DEFAULT_MODEL.to_owned(),
            organization: None,
            timeout_secs: Some(120),
        }
    }

    /// Creates configuration from environment variables.
    ///
    /// Reads from:
    /// - `OPENAI_API_KEY` - Required API key
    /// - `OPENAI_BASE_URL` - Optional base URL
    /// - `OPENAI_EMBED_MODEL` - Optional embedding model
    /// - `OPENAI_ORGANIZATION` - Optional organization ID
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            ProviderError::auth("openai", "OPENAI_API_KEY environment variable not set")
        })?;

        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_owned());

        let model =
            std::env::var("OPENAI_EMBED_MODEL").unwrap_or_else(|_| Self::DEFAULT_MODEL.to_owned());

        let organization = std::env::var("OPENAI_ORGANIZATION").ok();

        Ok(Self {
            api_key,
            base_url,
            model,
            organization,
            timeout_secs: Some(120),
        })
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the embedding model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the organization ID.
    #[must_use]
    pub fn with_organization(mut self, org: impl Into<String>) -> Self {
        self.organization = Some(org.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

/// OpenAI embedding request body.
#[derive(Debug, Clone, Serialize)]
struct OpenAIEmbeddingRequest {
    model: String,
    input: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    encoding_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<u32>,
}

/// OpenAI embedding data.
#[derive(Debug, Clone, Deserialize)]
struct OpenAIEmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

/// OpenAI embedding response body.
#[derive(Debug, Clone, Deserialize)]
struct OpenAIEmbeddingResponse {
    data: Vec<OpenAIEmbeddingData>,
    model: String,
    usage: Option<OpenAIEmbeddingUsage>,
}

/// OpenAI embedding usage statistics.
#[derive(Debug, Clone, Deserialize)]
struct OpenAIEmbeddingUsage {
    prompt_tokens: u32,
    total_tokens: u32,
}

/// OpenAI error envelope.
#[derive(Debug, Clone, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAIErrorDetail {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

/// OpenAI API client.
#[derive(Debug, Clone)]
pub struct OpenAI {
    config: Arc<OpenAIConfig>,
    http_client: Client,
}

impl OpenAI {
    /// Create a new OpenAI client with the given configuration.
    pub fn new(config: OpenAIConfig) -> Result<Self> {
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

    /// Create a client from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(OpenAIConfig::from_env()?)
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
        format!("{}/embeddings", self.config.base_url)
    }

    /// Build an authenticated POST request.
    fn build_request(&self, url: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .http_client
            .post(url)
            .bearer_auth(&self.config.api_key);
        if let Some(org) = &self.config.organization {
            builder = builder.header("OpenAI-Organization", org);
        }
        builder
    }

    /// Parse an error response from OpenAI.
    fn parse_error(status: u16, body: &str) -> ProviderError {
        if let Ok(error_response) = serde_json::from_str::<OpenAIErrorResponse>(body) {
            let detail = error_response.error;
            return match detail.code {
                Some(code) => ProviderError::provider_code("openai", code, detail.message),
                None => ProviderError::provider("openai", detail.message),
            };
        }
        ProviderError::http_status(status, body.to_owned())
    }

    /// Known output dimensionality per model family.
    fn model_dimension(model: &str) -> Option<usize> {
        match model {
            "text-embedding-3-small" | "text-embedding-ada-002" => Some(1536),
            "text-embedding-3-large" => Some(3072),
            _ => None,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAI {
    async fn embed(&self, request: &EmbeddingRequest) -> Result<EmbeddingResponse> {
        let url = self.embeddings_url();

        let model = if request.model.is_empty() {
            self.config.model.clone()
        } else {
            request.model.clone()
        };

        let body = OpenAIEmbeddingRequest {
            model,
            input: request.input.clone(),
            encoding_format: request.encoding_format.map(|f| f.as_str().to_owned()),
            dimensions: request.dimensions,
        };

        tracing::debug!(model = %body.model, inputs = body.input.len(), "OpenAI embed request");
        let response = self
            .build_request(&url)
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
        let parsed: OpenAIEmbeddingResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                ProviderError::response_format(
                    "valid OpenAI embedding response",
                    format!("parse error: {e}, response: {response_text}"),
                )
            })?;

        let embeddings = parsed
            .data
            .into_iter()
            .map(|d| Embedding::new(d.embedding, d.index))
            .collect();

        let mut out = EmbeddingResponse::new(embeddings).with_model(parsed.model);
        if let Some(u) = parsed.usage {
            out = out.with_usage(u.prompt_tokens, u.total_tokens);
        }
        Ok(out)
    }

    fn default_embedding_model(&self) -> &str {
        &self.config.model
    }

    fn embedding_dimension(&self) -> Option<usize> {
        Self::model_dimension(&self.config.model)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_client() -> OpenAI {
        OpenAI::new(OpenAIConfig::new("sk-test")).unwrap()
    }

    mod config {
        use super::*;

        #[test]
        fn new_sets_defaults() {
            let config = OpenAIConfig::new("sk-test");
            assert_eq!(config.api_key, "sk-test");
            assert_eq!(config.base_url, OpenAIConfig::DEFAULT_BASE_URL);
            assert_eq!(config.model, OpenAIConfig::DEFAULT_MODEL);
            assert!(config.organization.is_none());
            assert_eq!(config.timeout_secs, Some(120));
        }

        #[test]
        fn builder_chain() {
            let config = OpenAIConfig::new("sk-test")
                .with_base_url("https://proxy.example.com/v1")
                .with_model("text-embedding-3-large")
                .with_organization("org-1")
                .with_timeout(30);

            assert_eq!(config.base_url, "https://proxy.example.com/v1");
            assert_eq!(config.model, "text-embedding-3-large");
            assert_eq!(config.organization.as_deref(), Some("org-1"));
            assert_eq!(config.timeout_secs, Some(30));
        }
    }

    mod client {
        use super::*;

        #[test]
        fn embeddings_url_format() {
            let client = test_client();
            assert_eq!(
                client.embeddings_url(),
                "https://api.openai.com/v1/embeddings"
            );
        }

        #[test]
        fn embeddings_url_with_custom_base() {
            let client =
                OpenAI::new(OpenAIConfig::new("sk-test").with_base_url("http://localhost:8000/v1"))
                    .unwrap();
            assert_eq!(client.embeddings_url(), "http://localhost:8000/v1/embeddings");
        }

        #[test]
        fn default_embedding_model_reflects_config() {
            let client =
                OpenAI::new(OpenAIConfig::new("sk-test").with_model("text-embedding-3-large"))
                    .unwrap();
            assert_eq!(client.default_embedding_model(), "text-embedding-3-large");
        }

        #[test]
        fn dimension_known_for_stock_models() {
            assert_eq!(OpenAI::model_dimension("text-embedding-3-small"), Some(1536));
            assert_eq!(OpenAI::model_dimension("text-embedding-3-large"), Some(3072));
            assert_eq!(OpenAI::model_dimension("text-embedding-ada-002"), Some(1536));
            assert!(OpenAI::model_dimension("custom-model").is_none());
        }

        #[test]
        fn dimension_exposed_through_trait() {
            let client = test_client();
            assert_eq!(client.embedding_dimension(), Some(1536));
        }
    }

    mod error_parsing {
        use super::*;

        #[test]
        fn parses_error_envelope() {
            let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error","code":"invalid_api_key"}}"#;
            let error = OpenAI::parse_error(401, body);

            let s = error.to_string();
            assert!(s.contains("Incorrect API key"));
            assert!(s.contains("invalid_api_key"));
        }

        #[test]
        fn parses_error_without_code() {
            let body = r#"{"error":{"message":"The model does not exist","type":"invalid_request_error"}}"#;
            let error = OpenAI::parse_error(404, body);
            assert!(error.to_string().contains("does not exist"));
        }

        #[test]
        fn falls_back_to_http_status() {
            let error = OpenAI::parse_error(502, "Bad Gateway");
            let s = error.to_string();
            assert!(s.contains("502"));
        }
    }

    mod serialization {
        use super::*;

        #[test]
        fn request_serializes_only_present_fields() {
            let body = OpenAIEmbeddingRequest {
                model: "text-embedding-3-small".to_owned(),
                input: vec!["hello".to_owned()],
                encoding_format: None,
                dimensions: None,
            };
            let json = serde_json::to_string(&body).unwrap();

            assert!(json.contains("\"model\""));
            assert!(!json.contains("encoding_format"));
            assert!(!json.contains("dimensions"));
        }

        #[test]
        fn request_includes_dimensions_when_set() {
            let body = OpenAIEmbeddingRequest {
                model: "text-embedding-3-small".to_owned(),
                input: vec![],
                encoding_format: Some("float".to_owned()),
                dimensions: Some(256),
            };
            let json = serde_json::to_string(&body).unwrap();

            assert!(json.contains("\"encoding_format\":\"float\""));
            assert!(json.contains("\"dimensions\":256"));
        }

        #[test]
        fn response_deserializes() {
            let json = r#"{
                "object": "list",
                "data": [
                    {"object": "embedding", "embedding": [0.1, 0.2], "index": 0},
                    {"object": "embedding", "embedding": [0.3, 0.4], "index": 1}
                ],
                "model": "text-embedding-3-small",
                "usage": {"prompt_tokens": 8, "total_tokens": 8}
            }"#;
            let parsed: OpenAIEmbeddingResponse = serde_json::from_str(json).unwrap();

            assert_eq!(parsed.data.len(), 2);
            assert_eq!(parsed.data[1].index, 1);
            assert_eq!(parsed.model, "text-embedding-3-small");
            assert_eq!(parsed.usage.unwrap().total_tokens, 8);
        }
    }
}
