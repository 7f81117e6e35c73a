//! Sentence comparison using a local Ollama server.
//!
//! ```bash
//! ollama pull nomic-embed-text
//! cargo run --example compare_ollama
//! ```

#![allow(clippy::print_stdout)]

use std::sync::Arc;

use semgrid::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let client = Ollama::from_env()?;
    let mut workbench = Workbench::new(Pipeline::new(Arc::new(client)));

    println!("Loading embedding model...");
    workbench.load().await?;
    println!(
        "Ready: {} ({} dimensions)\n",
        workbench.pipeline().model(),
        workbench.pipeline().dimension().unwrap_or(0)
    );

    workbench.add_entry("The cat sat on the mat.");
    workbench.add_entry("A feline rested on the rug.");
    workbench.add_entry("The stock market crashed today.");
    workbench.embed_all().await?;

    let matrix = workbench.compute()?;
    let labels = header_labels(matrix.size());
    let policy = HighlightPolicy::default();

    print!("      ");
    for label in &labels {
        print!("{label:>8}");
    }
    println!();

    for (i, row) in matrix.rows().iter().enumerate() {
        print!("{:>6}", labels[i]);
        for score in row {
            let marker = match policy.classify(*score) {
                Highlight::Emphasis => "*",
                Highlight::Accent => "+",
                Highlight::None => " ",
            };
            print!(" {score:6.4}{marker}");
        }
        println!();
    }

    Ok(())
}
