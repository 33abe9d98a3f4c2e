//! CLI command definitions and argument parsing.

use casegraph_analytics::ClusterStrategy;
use casegraph_domain::CaseType;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Casegraph CLI - relationship and cross-case analytics for investigations.
#[derive(Debug, Parser)]
#[command(name = "casegraph")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database path (overrides the configuration)
    #[arg(short, long, global = true, env = "CASEGRAPH_DB")]
    pub database: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load the demo dataset into an empty database
    Seed,

    /// Network degree of a person
    Degree(PersonArgs),

    /// Risk score of a person
    Risk(PersonArgs),

    /// Persons with many relationships
    Hubs(HubsArgs),

    /// Persons involved in more than one case
    MultiCase,

    /// Filtered relationship graph
    Graph(GraphArgs),

    /// Cases grouped by shared participants
    Clusters(ClustersArgs),

    /// Monthly trend, type distribution and repeat suspects
    Patterns(CaseTypeArgs),

    /// Cases sharing participants with a case
    Related(RelatedArgs),

    /// Case counts by status, priority and type
    Stats(StatsArgs),

    /// Case counts, newest cases, high-risk persons and urgent alerts
    Dashboard(StatsArgs),

    /// Quiet periods on a case timeline
    Gaps(GapsArgs),

    /// Timeline of a person across all cases
    Timeline(PersonArgs),

    /// Timeline events by hour and weekday
    Temporal(CaseTypeArgs),
}

/// A single person id.
#[derive(Debug, Parser)]
pub struct PersonArgs {
    /// Person ID
    pub person: i64,
}

/// Arguments for the hubs command.
#[derive(Debug, Parser)]
pub struct HubsArgs {
    /// Minimum number of relationships (defaults to the configured hub threshold)
    #[arg(short, long)]
    pub min: Option<usize>,
}

/// Arguments for the graph command.
///
/// Values are passed through as raw strings and validated by the graph filter.
#[derive(Debug, Parser)]
pub struct GraphArgs {
    /// Only persons involved in this case
    #[arg(long)]
    pub case: Option<String>,

    /// Only persons involved in cases of this type
    #[arg(long)]
    pub case_type: Option<String>,

    /// Minimum risk level (0-4)
    #[arg(long)]
    pub min_risk: Option<String>,

    /// Analysis mode: all, case or cross_case
    #[arg(long)]
    pub mode: Option<String>,
}

/// Arguments for the clusters command.
#[derive(Debug, Parser)]
pub struct ClustersArgs {
    /// Clustering strategy (defaults to the configured one)
    #[arg(short, long, value_enum)]
    pub strategy: Option<StrategyArg>,
}

/// An optional case type filter.
#[derive(Debug, Parser)]
pub struct CaseTypeArgs {
    /// Only cases of this type
    #[arg(short = 't', long)]
    pub case_type: Option<CaseType>,
}

/// Arguments for the related command.
#[derive(Debug, Parser)]
pub struct RelatedArgs {
    /// Case ID
    pub case: i64,

    /// Maximum number of results (defaults to the configured limit)
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments for the stats and dashboard commands.
#[derive(Debug, Parser)]
pub struct StatsArgs {
    /// Reference time for the recent window (RFC 3339, defaults to now)
    #[arg(long)]
    pub as_of: Option<DateTime<Utc>>,
}

/// Arguments for the gaps command.
#[derive(Debug, Parser)]
pub struct GapsArgs {
    /// Case ID
    pub case: i64,

    /// Minimum gap in hours (defaults to the configured threshold)
    #[arg(long)]
    pub hours: Option<u32>,
}

/// Clustering strategy argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum StrategyArg {
    /// Order-dependent single pass
    Greedy,
    /// Transitive groups
    ConnectedComponents,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}

impl From<StrategyArg> for ClusterStrategy {
    fn from(strategy: StrategyArg) -> Self {
        match strategy {
            StrategyArg::Greedy => ClusterStrategy::Greedy,
            StrategyArg::ConnectedComponents => ClusterStrategy::ConnectedComponents,
        }
    }
}
