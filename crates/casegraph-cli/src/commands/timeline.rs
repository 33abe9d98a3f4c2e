//! Timeline commands: gaps, person timeline and temporal patterns.

use crate::cli::{CaseTypeArgs, GapsArgs, PersonArgs};
use crate::error::Result;
use crate::output::Formatter;
use casegraph_analytics::Analyzer;
use casegraph_domain::{CaseId, PersonId};
use casegraph_store::SqliteStore;

/// Execute the gaps command.
pub fn execute_gaps(
    args: GapsArgs,
    store: &SqliteStore,
    analyzer: &Analyzer,
    formatter: &Formatter,
) -> Result<()> {
    let gaps = analyzer.timeline_gaps(store, CaseId(args.case), args.hours)?;
    println!("{}", formatter.format_gaps(&gaps)?);
    Ok(())
}

/// Execute the timeline command.
pub fn execute_timeline(
    args: PersonArgs,
    store: &SqliteStore,
    analyzer: &Analyzer,
    formatter: &Formatter,
) -> Result<()> {
    let entries = analyzer.person_timeline(store, PersonId(args.person))?;
    println!("{}", formatter.format_timeline(&entries)?);
    Ok(())
}

/// Execute the temporal command.
pub fn execute_temporal(
    args: CaseTypeArgs,
    store: &SqliteStore,
    analyzer: &Analyzer,
    formatter: &Formatter,
) -> Result<()> {
    let patterns = analyzer.temporal_patterns(store, args.case_type)?;
    println!("{}", formatter.format_temporal(&patterns)?);
    Ok(())
}
