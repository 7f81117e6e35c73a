//! The similarity core on its own, no embedding server required.
//!
//! ```bash
//! cargo run --example matrix_offline
//! ```

#![allow(clippy::print_stdout)]

use semgrid::prelude::*;

fn main() -> Result<()> {
    let east = vec![1.0_f32, 0.0];
    let also_east = vec![2.0_f32, 0.0];
    let north = vec![0.0_f32, 1.0];

    let slots: Vec<Option<&[f32]>> = vec![
        Some(east.as_slice()),
        Some(also_east.as_slice()),
        Some(north.as_slice()),
    ];
    let matrix = SimilarityMatrix::compute(&slots)?;

    for (i, label) in header_labels(matrix.size()).into_iter().enumerate() {
        let row: Vec<String> = matrix.rows()[i]
            .iter()
            .map(|score| format!("{score:.4}"))
            .collect();
        println!("{label}: [{}]", row.join(", "));
    }

    // Pairwise, straight from the vectors.
    println!(
        "east vs north: {:.4}",
        cosine_similarity(&east, &north)?
    );

    Ok(())
}
