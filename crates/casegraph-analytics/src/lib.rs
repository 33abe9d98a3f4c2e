//! Casegraph Analytics
//!
//! Relationship-graph and cross-case analytics over any [`CaseStore`].
//!
//! # Overview
//!
//! The [`Analyzer`] answers investigative questions about persons and cases:
//! - **Network metrics**: degree, hub detection and a 0-100 risk score per person
//! - **Graph views**: filtered node/edge sets with shared-case annotations
//! - **Clustering**: cases grouped by shared participants, plus monthly and type patterns
//! - **Case analytics**: related cases, case statistics and a dashboard summary
//! - **Timelines**: gaps between events, per-person history, hour and weekday patterns
//!
//! Every operation is read-only and issues a small, fixed number of store
//! queries regardless of how many persons or cases are involved.
//!
//! ## Risk score
//!
//! | Component | Rule | Cap |
//! |-----------|------|-----|
//! | base | risk level × 20 | 80 |
//! | case | involvements × 5 | 30 |
//! | role | suspect involvements × 10 | none |
//! | network | degree × 3 | 20 |
//!
//! The total is clamped to 100 and mapped to a [`RiskCategory`] at 80/60/40/20.
//!
//! # Usage
//!
//! ```no_run
//! use casegraph_analytics::{Analyzer, GraphFilter};
//! use casegraph_store::SqliteStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::new("casegraph.db")?;
//! let analyzer = Analyzer::default_config();
//!
//! let graph = analyzer.build_network_graph(&store, &GraphFilter::default())?;
//! println!("{} persons, {} relationships", graph.stats.total_persons, graph.stats.total_relationships);
//!
//! for hub in analyzer.find_hubs(&store, 3)? {
//!     println!("{}: degree {}", hub.person.full_name(), hub.metrics.degree);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! [analytics]
//! hub_threshold = 3
//! related_cases_limit = 5
//! timeline_gap_hours = 24
//! recent_case_days = 30
//! cluster_strategy = "greedy"
//! ```
//!
//! [`CaseStore`]: casegraph_domain::traits::CaseStore

#![warn(missing_docs)]

pub mod cases;
pub mod clustering;
pub mod config;
mod engine;
mod error;
pub mod graph;
pub mod metrics;
pub mod timeline;

#[cfg(test)]
mod mock;

pub use cases::{CaseStatistics, CaseSummary, Dashboard, RelatedCase, WatchedPerson};
pub use clustering::{CaseCluster, MonthlyCount, PatternAnalysis, TypeCount};
pub use config::{AnalyticsConfig, ClusterStrategy};
pub use engine::Analyzer;
pub use error::AnalyticsError;
pub use graph::{AnalysisMode, GraphEdge, GraphFilter, GraphNode, GraphStats, NetworkGraph};
pub use metrics::{
    compute_risk_score, MultiCaseProfile, NetworkDegree, PersonMetrics, RiskBreakdown,
    RiskCategory, RiskInputs, RiskScore,
};
pub use timeline::{TemporalPatterns, TimelineGap};
