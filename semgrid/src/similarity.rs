//! Pairwise cosine-similarity matrix computation.
//!
//! The numeric core of the workbench: given the embedding vectors of an
//! ordered entry collection, [`SimilarityMatrix::compute`] produces the full
//! square table of pairwise cosine similarities, self-similarity included.
//!
//! Zero-magnitude vectors yield `NaN` cells rather than errors, matching
//! IEEE-754 division semantics; downstream rendering treats `NaN` as "no
//! signal". Mismatched dimensionalities abort the whole computation, so a
//! failed call never yields a partial matrix.

/// Errors from similarity computations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum MatrixError {
    /// An entry without a computed embedding was passed in. Callers must
    /// filter (or embed) first; absent vectors are never silently skipped.
    #[error("entry at index {index} has no embedding vector")]
    MissingVector {
        /// Zero-based position of the offending entry.
        index: usize,
    },

    /// Two vectors in the input differ in dimensionality.
    #[error("dimension mismatch: expected {expected} components, found {found}")]
    DimensionMismatch {
        /// Dimensionality established by the first vector.
        expected: usize,
        /// Dimensionality of the offending vector.
        found: usize,
    },
}

/// Cosine similarity between two vectors: `dot(a, b) / (‖a‖ · ‖b‖)`.
///
/// Returns `NaN` when either vector has zero magnitude. Fails with
/// [`MatrixError::DimensionMismatch`] when the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, MatrixError> {
    if a.len() != b.len() {
        return Err(MatrixError::DimensionMismatch {
            expected: a.len(),
            found: b.len(),
        });
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    // A zero norm makes this 0/0 = NaN, which is the contract.
    Ok(dot / (norm_a * norm_b))
}

/// A square table of pairwise cosine similarities, indexed by entry position
/// on both axes.
///
/// Invariants: the matrix is symmetric, and diagonal cells are 1.0 for every
/// non-zero vector (`NaN` where a zero vector participates).
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    scores: Vec<Vec<f32>>,
}

impl SimilarityMatrix {
    /// Compute the n×n similarity matrix over an ordered vector collection.
    ///
    /// Every slot must hold a vector: an absent slot fails with
    /// [`MatrixError::MissingVector`]. All vectors must share one
    /// dimensionality, validated up front so no partial matrix is produced.
    pub fn compute(vectors: &[Option<&[f32]>]) -> Result<Self, MatrixError> {
        let mut present = Vec::with_capacity(vectors.len());
        for (index, slot) in vectors.iter().enumerate() {
            match slot {
                Some(v) => present.push(*v),
                None => return Err(MatrixError::MissingVector { index }),
            }
        }

        if let Some(first) = present.first() {
            for v in &present {
                if v.len() != first.len() {
                    return Err(MatrixError::DimensionMismatch {
                        expected: first.len(),
                        found: v.len(),
                    });
                }
            }
        }

        let n = present.len();
        let mut scores = vec![vec![0.0_f32; n]; n];
        for i in 0..n {
            for j in i..n {
                // Dimensions were validated above; mirroring the upper
                // triangle keeps the symmetry invariant bit-exact.
                let score = cosine_similarity(present[i], present[j])?;
                scores[i][j] = score;
                scores[j][i] = score;
            }
        }

        Ok(Self { scores })
    }

    /// Number of entries on each axis.
    #[must_use]
    pub fn size(&self) -> usize {
        self.scores.len()
    }

    /// Whether the matrix covers no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Similarity between entries `i` and `j`, if both are in range.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        self.scores.get(i).and_then(|row| row.get(j)).copied()
    }

    /// The score rows, outer index = entry position.
    #[must_use]
    pub fn rows(&self) -> &[Vec<f32>] {
        &self.scores
    }
}
