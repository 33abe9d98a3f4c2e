//! Case commands: clusters, patterns, related cases, statistics and the dashboard.

use crate::cli::{CaseTypeArgs, ClustersArgs, RelatedArgs, StatsArgs};
use crate::error::Result;
use crate::output::Formatter;
use casegraph_analytics::Analyzer;
use casegraph_domain::CaseId;
use casegraph_store::SqliteStore;
use chrono::Utc;

/// Execute the clusters command.
pub fn execute_clusters(
    args: ClustersArgs,
    store: &SqliteStore,
    analyzer: &Analyzer,
    formatter: &Formatter,
) -> Result<()> {
    let clusters = match args.strategy {
        Some(strategy) => {
            let config = analyzer.config().clone().with_cluster_strategy(strategy.into());
            Analyzer::new(config).find_case_clusters(store)?
        }
        None => analyzer.find_case_clusters(store)?,
    };
    println!("{}", formatter.format_clusters(&clusters)?);
    Ok(())
}

/// Execute the patterns command.
pub fn execute_patterns(
    args: CaseTypeArgs,
    store: &SqliteStore,
    analyzer: &Analyzer,
    formatter: &Formatter,
) -> Result<()> {
    let patterns = analyzer.analyze_patterns(store, args.case_type)?;
    println!("{}", formatter.format_patterns(&patterns)?);
    Ok(())
}

/// Execute the related command.
pub fn execute_related(
    args: RelatedArgs,
    store: &SqliteStore,
    analyzer: &Analyzer,
    formatter: &Formatter,
) -> Result<()> {
    let related = analyzer.related_cases(store, CaseId(args.case), args.limit)?;
    println!("{}", formatter.format_related(&related)?);
    Ok(())
}

/// Execute the stats command.
pub fn execute_stats(
    args: StatsArgs,
    store: &SqliteStore,
    analyzer: &Analyzer,
    formatter: &Formatter,
) -> Result<()> {
    let now = args.as_of.unwrap_or_else(Utc::now);
    let stats = analyzer.case_statistics(store, now)?;
    println!("{}", formatter.format_stats(&stats)?);
    Ok(())
}

/// Execute the dashboard command.
pub fn execute_dashboard(
    args: StatsArgs,
    store: &SqliteStore,
    analyzer: &Analyzer,
    formatter: &Formatter,
) -> Result<()> {
    let now = args.as_of.unwrap_or_else(Utc::now);
    let dashboard = analyzer.dashboard(store, now)?;
    println!("{}", formatter.format_dashboard(&dashboard)?);
    Ok(())
}
