//! Semgrid - a text-embedding similarity workbench
//!
//! This crate embeds a collection of sentences through a pluggable provider
//! and computes their pairwise cosine-similarity matrix, with presentation
//! helpers for threshold-based highlighting.

pub mod embedding;
pub mod error;
pub mod pipeline;
pub mod prelude;
pub mod providers;
pub mod render;
pub mod similarity;
pub mod workbench;

pub use error::{Error, MatrixError, ProviderError, Result};
