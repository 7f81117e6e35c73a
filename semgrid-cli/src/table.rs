//! Text-table rendering of similarity matrices.
//!
//! Cells are padded first and styled after, so ANSI escapes never disturb
//! the column layout. Accent scores render red, emphasis scores additionally
//! get a background, and `NaN` is dimmed ("no signal").

use colored::Colorize;

use semgrid::render::{Highlight, HighlightPolicy, header_labels};
use semgrid::similarity::SimilarityMatrix;

/// Render a similarity matrix as an aligned text table with a header
/// row/column of `#N` labels.
#[must_use]
pub fn render_matrix(
    matrix: &SimilarityMatrix,
    policy: &HighlightPolicy,
    precision: usize,
) -> String {
    let labels = header_labels(matrix.size());
    let label_width = labels.last().map_or(2, |label| label.len());
    // Sign, leading digit, decimal point, fraction; "nan" always fits.
    let cell_width = (precision + 3).max(3);

    let mut out = String::new();

    out.push_str(&" ".repeat(label_width));
    for label in &labels {
        out.push(' ');
        out.push_str(&format!("{label:>cell_width$}"));
    }
    out.push('\n');

    for (i, row) in matrix.rows().iter().enumerate() {
        out.push_str(&format!("{:>label_width$}", labels[i]));
        for score in row {
            out.push(' ');
            out.push_str(&style_cell(*score, policy, cell_width, precision));
        }
        out.push('\n');
    }

    out
}

fn style_cell(score: f32, policy: &HighlightPolicy, width: usize, precision: usize) -> String {
    let text = if score.is_nan() {
        format!("{:>width$}", "nan")
    } else {
        format!("{score:>width$.precision$}")
    };

    match policy.classify(score) {
        Highlight::Emphasis => text.red().on_bright_magenta().to_string(),
        Highlight::Accent => text.red().to_string(),
        Highlight::None if score.is_nan() => text.dimmed().to_string(),
        Highlight::None => text,
    }
}
