//! Person network commands: degree, risk, hubs and multi-case persons.

use crate::cli::{HubsArgs, PersonArgs};
use crate::error::Result;
use crate::output::Formatter;
use casegraph_analytics::Analyzer;
use casegraph_domain::PersonId;
use casegraph_store::SqliteStore;

/// Execute the degree command.
pub fn execute_degree(
    args: PersonArgs,
    store: &SqliteStore,
    analyzer: &Analyzer,
    formatter: &Formatter,
) -> Result<()> {
    let person = PersonId(args.person);
    let degree = analyzer.network_degree(store, person)?;
    println!("{}", formatter.format_degree(person, &degree)?);
    Ok(())
}

/// Execute the risk command.
pub fn execute_risk(
    args: PersonArgs,
    store: &SqliteStore,
    analyzer: &Analyzer,
    formatter: &Formatter,
) -> Result<()> {
    let person = PersonId(args.person);
    let score = analyzer.risk_score(store, person)?;
    println!("{}", formatter.format_risk(person, &score)?);
    Ok(())
}

/// Execute the hubs command.
pub fn execute_hubs(
    args: HubsArgs,
    store: &SqliteStore,
    analyzer: &Analyzer,
    formatter: &Formatter,
) -> Result<()> {
    let min = args.min.unwrap_or(analyzer.config().hub_threshold);
    let hubs = analyzer.find_hubs(store, min)?;
    println!("{}", formatter.format_hubs(&hubs)?);
    Ok(())
}

/// Execute the multi-case command.
pub fn execute_multi_case(store: &SqliteStore, analyzer: &Analyzer, formatter: &Formatter) -> Result<()> {
    let profiles = analyzer.find_multi_case_persons(store)?;
    println!("{}", formatter.format_multi_case(&profiles)?);
    Ok(())
}
