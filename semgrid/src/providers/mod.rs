//! Embedding backend implementations.
//!
//! Each backend implements [`crate::embedding::EmbeddingProvider`] and is
//! organized into its own submodule.
//!
//! # Available Backends
//!
//! - [`ollama`] - Ollama local embedding server
//! - [`openai`] - OpenAI Embeddings API

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "ollama")]
pub use ollama::{Ollama, OllamaConfig};

#[cfg(feature = "openai")]
pub use openai::{OpenAI, OpenAIConfig};
