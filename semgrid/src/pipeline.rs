//! Late-bound embedding pipeline with explicit load states.
//!
//! The embedding model behind a provider is not resident until first use:
//! Ollama pulls the model into memory on the first request, remote APIs may
//! reject a misconfigured key only once called. [`Pipeline`] makes that
//! lifecycle explicit: it stays `Unloaded` until [`Pipeline::load`] drives it
//! through `Loading` into `Ready` (or `Failed`), and refuses embedding work
//! in any state but `Ready`.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::embedding::{Embedding, EmbeddingProvider, EmbeddingRequest, EmbeddingResponse};
use crate::error::{Error, Result};

/// Text embedded once during load to force the model resident and learn its
/// output dimensionality.
const PROBE_TEXT: &str = "ping";

/// Lifecycle state of an embedding pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    /// No load has been attempted.
    #[default]
    Unloaded,
    /// A load is in flight.
    Loading,
    /// The model answered the warm-up probe; embedding requests are accepted.
    Ready,
    /// The last load attempt failed; see [`Pipeline::last_error`].
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unloaded => "unloaded",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// An injected embedding provider plus the model's load lifecycle.
#[derive(Clone)]
pub struct Pipeline {
    provider: Arc<dyn EmbeddingProvider>,
    model: String,
    state: PipelineState,
    dimension: Option<usize>,
    last_error: Option<String>,
}

impl Pipeline {
    /// Create an unloaded pipeline over the given provider, using the
    /// provider's default embedding model.
    #[must_use]
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        let model = provider.default_embedding_model().to_owned();
        Self {
            provider,
            model,
            state: PipelineState::Unloaded,
            dimension: None,
            last_error: None,
        }
    }

    /// Override the model name.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// The model this pipeline embeds with.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> PipelineState {
        self.state
    }

    /// Whether embedding requests are currently accepted.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self.state, PipelineState::Ready)
    }

    /// Vector dimensionality observed at load time.
    #[must_use]
    pub const fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Message from the last failed load attempt.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Load the model by issuing a warm-up embedding probe.
    ///
    /// Idempotent once `Ready`; a `Failed` pipeline may be retried. On
    /// failure the error message is retained and the error propagated.
    pub async fn load(&mut self) -> Result<()> {
        if self.is_ready() {
            return Ok(());
        }

        self.state = PipelineState::Loading;
        self.last_error = None;
        debug!(model = %self.model, "loading embedding pipeline");

        match self.provider.embed_single(&self.model, PROBE_TEXT).await {
            Ok(embedding) => {
                self.dimension = Some(embedding.dimension());
                self.state = PipelineState::Ready;
                info!(
                    model = %self.model,
                    dimension = embedding.dimension(),
                    "embedding pipeline ready"
                );
                Ok(())
            }
            Err(e) => {
                self.state = PipelineState::Failed;
                self.last_error = Some(e.to_string());
                warn!(model = %self.model, error = %e, "embedding pipeline load failed");
                Err(e)
            }
        }
    }

    /// Embed a single text. Requires a `Ready` pipeline.
    pub async fn embed_text(&self, text: &str) -> Result<Embedding> {
        self.ensure_ready()?;
        self.provider.embed_single(&self.model, text).await
    }

    /// Embed several texts in one provider request. Requires a `Ready`
    /// pipeline.
    pub async fn embed_texts(&self, texts: Vec<String>) -> Result<EmbeddingResponse> {
        self.ensure_ready()?;
        let request = EmbeddingRequest::new(self.model.clone(), texts);
        self.provider.embed(&request).await
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(Error::pipeline(format!(
                "pipeline is not ready (state: {})",
                self.state
            )))
        }
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("model", &self.model)
            .field("state", &self.state)
            .field("dimension", &self.dimension)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}
