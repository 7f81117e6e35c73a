//! Presentation helpers for similarity matrices.
//!
//! Label generation and the two-threshold highlight classification are
//! rendering policy, kept apart from the numeric core. The actual styling
//! (ANSI colors, table layout) belongs to the frontend.

use serde::{Deserialize, Serialize};

/// 1-based display label for an entry position: `"#1"`, `"#2"`, …
#[must_use]
pub fn entry_label(index: usize) -> String {
    format!("#{}", index + 1)
}

/// Display labels for the header row/column of an n-entry matrix.
#[must_use]
pub fn header_labels(n: usize) -> Vec<String> {
    (0..n).map(entry_label).collect()
}

/// Visual classification of a similarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Highlight {
    /// No highlighting. Also the classification of `NaN` scores ("no signal").
    #[default]
    None,
    /// Score above the accent threshold.
    Accent,
    /// Score above the emphasis threshold.
    Emphasis,
}

/// Two-threshold highlight policy for rendered cells.
///
/// Scores strictly above `accent` get accent styling, scores strictly above
/// `emphasis` get emphasis styling. `NaN` never crosses either threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighlightPolicy {
    /// Lower threshold (accent styling above this).
    pub accent: f32,
    /// Upper threshold (emphasis styling above this).
    pub emphasis: f32,
}

impl HighlightPolicy {
    /// Default accent threshold.
    pub const DEFAULT_ACCENT: f32 = 0.5;
    /// Default emphasis threshold.
    pub const DEFAULT_EMPHASIS: f32 = 0.8;

    /// Create a policy with the given thresholds.
    #[must_use]
    pub const fn new(accent: f32, emphasis: f32) -> Self {
        Self { accent, emphasis }
    }

    /// Classify a similarity score.
    #[must_use]
    pub fn classify(&self, score: f32) -> Highlight {
        // NaN comparisons are false, so NaN lands on Highlight::None.
        if score > self.emphasis {
            Highlight::Emphasis
        } else if score > self.accent {
            Highlight::Accent
        } else {
            Highlight::None
        }
    }
}

impl Default for HighlightPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ACCENT, Self::DEFAULT_EMPHASIS)
    }
}
