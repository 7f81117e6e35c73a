//! Prelude module for convenient imports.
//!
//! This module re-exports commonly used types and traits for easy access.
//!
//! # Usage
//!
//! ```rust,ignore
//! use semgrid::prelude::*;
//! ```

#[cfg(feature = "ollama")]
pub use crate::providers::{Ollama, OllamaConfig};
#[cfg(feature = "openai")]
pub use crate::providers::{OpenAI, OpenAIConfig};

pub use crate::embedding::{
    Embedding, EmbeddingProvider, EmbeddingRequest, EmbeddingResponse, EmbeddingUsage,
    EncodingFormat,
};
pub use crate::error::{Error, MatrixError, ProviderError, ProviderErrorKind, Result};
pub use crate::pipeline::{Pipeline, PipelineState};
pub use crate::render::{Highlight, HighlightPolicy, entry_label, header_labels};
pub use crate::similarity::{SimilarityMatrix, cosine_similarity};
pub use crate::workbench::{Entry, EntryState, Workbench};
