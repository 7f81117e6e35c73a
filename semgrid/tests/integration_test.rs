//! Integration tests for the semgrid workbench.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use semgrid::prelude::*;

/// An in-process embedding backend with a fixed vocabulary of directions.
///
/// Texts about the same topic get the same direction, so similarity scores
/// are exact and the full workflow can be asserted end to end.
struct TopicProvider {
    requests: AtomicUsize,
}

impl TopicProvider {
    fn new() -> Self {
        Self {
            requests: AtomicUsize::new(0),
        }
    }

    fn vector_for(text: &str) -> Vec<f32> {
        if text.contains("cat") || text.contains("feline") {
            vec![1.0, 0.0, 0.0]
        } else if text.contains("market") {
            vec![0.0, 1.0, 0.0]
        } else {
            vec![0.0, 0.0, 1.0]
        }
    }
}

#[async_trait]
impl EmbeddingProvider for TopicProvider {
    async fn embed(&self, request: &EmbeddingRequest) -> Result<EmbeddingResponse> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let embeddings = request
            .input
            .iter()
            .enumerate()
            .map(|(i, text)| Embedding::new(Self::vector_for(text), i))
            .collect();
        Ok(EmbeddingResponse::new(embeddings).with_model(request.model.clone()))
    }

    fn default_embedding_model(&self) -> &str {
        "topic-embed"
    }
}

/// A backend that always fails, for load-failure paths.
struct DownProvider;

#[async_trait]
impl EmbeddingProvider for DownProvider {
    async fn embed(&self, _request: &EmbeddingRequest) -> Result<EmbeddingResponse> {
        Err(ProviderError::network("connection refused").into())
    }

    fn default_embedding_model(&self) -> &str {
        "down-embed"
    }
}

#[tokio::test]
async fn full_workflow_load_embed_compute_classify() {
    let provider = Arc::new(TopicProvider::new());
    let provider_dyn: Arc<dyn EmbeddingProvider> = provider.clone();
    let mut workbench = Workbench::new(Pipeline::new(provider_dyn));

    // Load: Unloaded -> Ready, dimension observed from the probe.
    assert_eq!(workbench.pipeline().state(), PipelineState::Unloaded);
    workbench.load().await.unwrap();
    assert!(workbench.pipeline().is_ready());
    assert_eq!(workbench.pipeline().dimension(), Some(3));

    workbench.add_entry("The cat sat on the mat.");
    workbench.add_entry("A feline rested on the rug.");
    workbench.add_entry("The stock market crashed today.");
    assert!(!workbench.can_compute());

    workbench.embed_all().await.unwrap();
    assert!(workbench.can_compute());

    let matrix = workbench.compute().unwrap().clone();
    assert_eq!(matrix.size(), 3);

    // cat/feline identical direction, both orthogonal to the market entry.
    assert!((matrix.get(0, 1).unwrap() - 1.0).abs() < 1e-6);
    assert!(matrix.get(0, 2).unwrap().abs() < 1e-6);
    assert!(matrix.get(1, 2).unwrap().abs() < 1e-6);
    for i in 0..3 {
        assert!((matrix.get(i, i).unwrap() - 1.0).abs() < 1e-6);
    }

    // Highlighting: the identical pair gets emphasis, orthogonal pairs none.
    let policy = HighlightPolicy::default();
    assert_eq!(policy.classify(matrix.get(0, 1).unwrap()), Highlight::Emphasis);
    assert_eq!(policy.classify(matrix.get(0, 2).unwrap()), Highlight::None);

    // Labels are a presentation concern layered on top.
    assert_eq!(header_labels(matrix.size()), vec!["#1", "#2", "#3"]);
}

#[tokio::test]
async fn batch_embedding_uses_one_request() {
    let provider = Arc::new(TopicProvider::new());
    let provider_dyn: Arc<dyn EmbeddingProvider> = provider.clone();
    let mut workbench = Workbench::new(Pipeline::new(provider_dyn));
    workbench.load().await.unwrap();
    let after_load = provider.requests.load(Ordering::SeqCst);

    workbench.add_entry("cat one");
    workbench.add_entry("cat two");
    workbench.add_entry("market");
    workbench.embed_all().await.unwrap();

    assert_eq!(provider.requests.load(Ordering::SeqCst), after_load + 1);
}

#[tokio::test]
async fn failed_load_reports_and_blocks_embedding() {
    let mut workbench = Workbench::new(Pipeline::new(Arc::new(DownProvider)));

    let err = workbench.load().await.unwrap_err();
    assert!(matches!(err, Error::Provider(_)));
    assert_eq!(workbench.pipeline().state(), PipelineState::Failed);
    assert!(
        workbench
            .pipeline()
            .last_error()
            .unwrap()
            .contains("connection refused")
    );

    workbench.add_entry("anything");
    let err = workbench.embed_entry(0).await.unwrap_err();
    assert!(matches!(err, Error::Pipeline(_)));
}

#[tokio::test]
async fn removal_invalidates_matrix_until_recompute() {
    let provider = Arc::new(TopicProvider::new());
    let mut workbench = Workbench::new(Pipeline::new(provider));
    workbench.load().await.unwrap();

    workbench.add_entry("cat");
    workbench.add_entry("feline");
    workbench.add_entry("market");
    workbench.embed_all().await.unwrap();
    workbench.compute().unwrap();
    assert!(workbench.matrix().is_some());

    workbench.remove_entry(2).unwrap();
    assert!(workbench.matrix().is_none());

    let matrix = workbench.compute().unwrap();
    assert_eq!(matrix.size(), 2);
    assert!((matrix.get(0, 1).unwrap() - 1.0).abs() < 1e-6);
}

#[tokio::test]
async fn compute_refuses_partial_collections() {
    let provider = Arc::new(TopicProvider::new());
    let mut workbench = Workbench::new(Pipeline::new(provider));
    workbench.load().await.unwrap();

    workbench.add_entry("cat");
    workbench.add_entry("market");
    workbench.embed_entry(0).await.unwrap();

    match workbench.compute() {
        Err(Error::Matrix(MatrixError::MissingVector { index })) => assert_eq!(index, 1),
        other => panic!("expected MissingVector, got {other:?}"),
    }
    assert!(workbench.matrix().is_none());
}

#[test]
fn matrix_core_is_usable_without_a_provider() {
    let a = vec![1.0_f32, 0.0];
    let b = vec![1.0_f32, 0.0];
    let c = vec![0.0_f32, 1.0];
    let slots: Vec<Option<&[f32]>> = vec![
        Some(a.as_slice()),
        Some(b.as_slice()),
        Some(c.as_slice()),
    ];

    let matrix = SimilarityMatrix::compute(&slots).unwrap();
    let expected = [[1.0, 1.0, 0.0], [1.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
    for (i, row) in expected.iter().enumerate() {
        for (j, want) in row.iter().enumerate() {
            assert!((matrix.get(i, j).unwrap() - want).abs() < 1e-6);
        }
    }
}
