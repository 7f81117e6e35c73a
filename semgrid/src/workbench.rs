//! Entry collection and similarity workflow.
//!
//! A [`Workbench`] owns an ordered list of text entries, the embedding
//! [`Pipeline`], and at most one computed [`SimilarityMatrix`]. Entries are
//! identified by position. Any mutation of the collection (adding, editing,
//! removing, re-embedding) invalidates a previously computed matrix; results
//! are recomputed from scratch, never patched.

use tracing::debug;

use crate::embedding::Embedding;
use crate::error::{Error, ProviderError, Result};
use crate::pipeline::Pipeline;
use crate::similarity::SimilarityMatrix;

/// Embedding lifecycle of a single entry.
#[derive(Debug, Clone, Default)]
pub enum EntryState {
    /// No embedding computed yet.
    #[default]
    Empty,
    /// An embedding request is in flight.
    Pending,
    /// The embedding is available.
    Embedded(Embedding),
}

/// One text entry and its embedding state.
#[derive(Debug, Clone, Default)]
pub struct Entry {
    text: String,
    state: EntryState,
}

impl Entry {
    /// The entry's text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The entry's embedding state.
    #[must_use]
    pub const fn state(&self) -> &EntryState {
        &self.state
    }

    /// The computed embedding, if available.
    #[must_use]
    pub const fn embedding(&self) -> Option<&Embedding> {
        match &self.state {
            EntryState::Embedded(embedding) => Some(embedding),
            EntryState::Empty | EntryState::Pending => None,
        }
    }

    /// Whether an embedding is available.
    #[must_use]
    pub const fn is_embedded(&self) -> bool {
        matches!(self.state, EntryState::Embedded(_))
    }

    /// Whether an embedding request is in flight.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.state, EntryState::Pending)
    }
}

/// Ordered entries, the embedding pipeline, and the current matrix.
#[derive(Debug)]
pub struct Workbench {
    pipeline: Pipeline,
    entries: Vec<Entry>,
    matrix: Option<SimilarityMatrix>,
}

impl Workbench {
    /// Create an empty workbench over the given pipeline.
    #[must_use]
    pub const fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            entries: Vec::new(),
            matrix: None,
        }
    }

    /// The underlying pipeline.
    #[must_use]
    pub const fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Load the embedding pipeline (see [`Pipeline::load`]).
    pub async fn load(&mut self) -> Result<()> {
        self.pipeline.load().await
    }

    /// All entries, in display order.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// The entry at `index`, if any.
    #[must_use]
    pub fn entry(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the workbench has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a new entry with the given text. Returns its index.
    pub fn add_entry(&mut self, text: impl Into<String>) -> usize {
        self.matrix = None;
        self.entries.push(Entry {
            text: text.into(),
            state: EntryState::Empty,
        });
        self.entries.len() - 1
    }

    /// Replace the text of the entry at `index`, dropping any embedding it
    /// had.
    pub fn set_text(&mut self, index: usize, text: impl Into<String>) -> Result<()> {
        let entry = self
            .entries
            .get_mut(index)
            .ok_or_else(|| Error::workbench(format!("no entry at index {index}")))?;
        entry.text = text.into();
        entry.state = EntryState::Empty;
        self.matrix = None;
        Ok(())
    }

    /// Remove the entry at `index`. Later entries shift down.
    pub fn remove_entry(&mut self, index: usize) -> Result<()> {
        if index >= self.entries.len() {
            return Err(Error::workbench(format!("no entry at index {index}")));
        }
        self.entries.remove(index);
        self.reindex();
        self.matrix = None;
        Ok(())
    }

    /// Whether any embedding request is in flight.
    #[must_use]
    pub fn generating(&self) -> bool {
        self.entries.iter().any(Entry::is_pending)
    }

    /// Whether the matrix can be computed: at least two entries, every entry
    /// embedded, no generation in flight.
    #[must_use]
    pub fn can_compute(&self) -> bool {
        self.entries.len() >= 2
            && !self.generating()
            && self.entries.iter().all(Entry::is_embedded)
    }

    /// Embed the entry at `index` through the pipeline.
    ///
    /// The entry must exist and have non-blank text, and the pipeline must be
    /// ready. The entry is `Pending` for the duration of the request and
    /// reverts to `Empty` if the request fails.
    pub async fn embed_entry(&mut self, index: usize) -> Result<()> {
        let text = {
            let entry = self
                .entries
                .get(index)
                .ok_or_else(|| Error::workbench(format!("no entry at index {index}")))?;
            if entry.text.trim().is_empty() {
                return Err(Error::workbench(format!(
                    "entry at index {index} has no text to embed"
                )));
            }
            entry.text.clone()
        };

        self.entries[index].state = EntryState::Pending;
        self.matrix = None;

        match self.pipeline.embed_text(&text).await {
            Ok(mut embedding) => {
                embedding.index = index;
                debug!(index, dimension = embedding.dimension(), "entry embedded");
                self.entries[index].state = EntryState::Embedded(embedding);
                Ok(())
            }
            Err(e) => {
                self.entries[index].state = EntryState::Empty;
                Err(e)
            }
        }
    }

    /// Embed every entry that does not yet have an embedding, in a single
    /// batched provider request.
    pub async fn embed_all(&mut self) -> Result<()> {
        let missing: Vec<(usize, String)> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.is_embedded())
            .map(|(i, e)| (i, e.text.clone()))
            .collect();

        if missing.is_empty() {
            return Ok(());
        }
        if let Some((index, _)) = missing.iter().find(|(_, text)| text.trim().is_empty()) {
            return Err(Error::workbench(format!(
                "entry at index {index} has no text to embed"
            )));
        }

        for (index, _) in &missing {
            self.entries[*index].state = EntryState::Pending;
        }
        self.matrix = None;

        let texts: Vec<String> = missing.iter().map(|(_, t)| t.clone()).collect();
        let count = texts.len();
        match self.pipeline.embed_texts(texts).await {
            Ok(response) if response.embeddings.len() == count => {
                for ((index, _), mut embedding) in missing.into_iter().zip(response.embeddings) {
                    embedding.index = index;
                    self.entries[index].state = EntryState::Embedded(embedding);
                }
                debug!(count, "batch embedding complete");
                Ok(())
            }
            Ok(response) => {
                for (index, _) in &missing {
                    self.entries[*index].state = EntryState::Empty;
                }
                Err(ProviderError::response_format(
                    format!("{count} embeddings"),
                    response.embeddings.len().to_string(),
                )
                .into())
            }
            Err(e) => {
                for (index, _) in &missing {
                    self.entries[*index].state = EntryState::Empty;
                }
                Err(e)
            }
        }
    }

    /// Compute the similarity matrix over all entries.
    ///
    /// Discards any previous matrix first; a failed computation leaves no
    /// stale result behind. Fails if any entry lacks an embedding.
    pub fn compute(&mut self) -> Result<&SimilarityMatrix> {
        self.matrix = None;

        let slots: Vec<Option<&[f32]>> = self
            .entries
            .iter()
            .map(|e| e.embedding().map(|emb| emb.vector.as_slice()))
            .collect();
        let matrix = SimilarityMatrix::compute(&slots)?;
        debug!(entries = self.entries.len(), "similarity matrix computed");

        Ok(self.matrix.insert(matrix))
    }

    /// The last computed matrix, if still valid.
    #[must_use]
    pub const fn matrix(&self) -> Option<&SimilarityMatrix> {
        self.matrix.as_ref()
    }

    /// Restore `Embedding::index` agreement after removals.
    fn reindex(&mut self) {
        for (i, entry) in self.entries.iter_mut().enumerate() {
            if let EntryState::Embedded(embedding) = &mut entry.state {
                embedding.index = i;
            }
        }
    }
}
