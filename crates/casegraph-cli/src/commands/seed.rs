//! Seed command implementation.

use crate::error::Result;
use crate::output::Formatter;
use casegraph_store::sample::load_sample_data;
use casegraph_store::SqliteStore;

/// Execute the seed command.
pub fn execute_seed(store: &mut SqliteStore, formatter: &Formatter) -> Result<()> {
    let summary = load_sample_data(store)?;

    println!(
        "{}",
        formatter.success(&format!(
            "Loaded {} persons, {} relationships, {} cases, {} involvements and {} timeline entries",
            summary.persons,
            summary.relationships,
            summary.cases,
            summary.involvements,
            summary.timeline_entries
        ))
    );
    Ok(())
}
