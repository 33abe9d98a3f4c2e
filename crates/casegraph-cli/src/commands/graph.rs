//! Graph command implementation.

use crate::cli::GraphArgs;
use crate::error::Result;
use crate::output::Formatter;
use casegraph_analytics::{Analyzer, GraphFilter};
use casegraph_store::SqliteStore;

/// Execute the graph command.
pub fn execute_graph(
    args: GraphArgs,
    store: &SqliteStore,
    analyzer: &Analyzer,
    formatter: &Formatter,
) -> Result<()> {
    let filter = filter_from_args(&args)?;
    let graph = analyzer.build_network_graph(store, &filter)?;
    println!("{}", formatter.format_graph(&graph)?);
    Ok(())
}

fn filter_from_args(args: &GraphArgs) -> Result<GraphFilter> {
    let params = [
        ("case", args.case.as_deref()),
        ("case_type", args.case_type.as_deref()),
        ("risk_level", args.min_risk.as_deref()),
        ("mode", args.mode.as_deref()),
    ];
    let filter = GraphFilter::from_params(
        params
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v))),
    )?;
    tracing::debug!(?filter, "graph filter");
    Ok(filter)
}
