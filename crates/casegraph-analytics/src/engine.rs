//! The analytics engine

use crate::AnalyticsConfig;

/// Read-only analytics over a [`CaseStore`](casegraph_domain::traits::CaseStore)
///
/// The engine holds configuration only. Every operation takes the store by
/// shared reference, fetches what it needs in a fixed number of batch queries
/// and derives its result in memory, so one analyzer can serve any number of
/// callers.
///
/// The operations are spread over the modules that own their result types:
///
/// - network metrics, risk and hubs: [`crate::metrics`]
/// - graph views: [`crate::graph`]
/// - case clustering and patterns: [`crate::clustering`]
/// - related cases and case statistics: [`crate::cases`]
/// - timeline analysis: [`crate::timeline`]
///
/// # Examples
///
/// ```no_run
/// use casegraph_analytics::Analyzer;
/// use casegraph_domain::PersonId;
/// use casegraph_store::SqliteStore;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = SqliteStore::new("casegraph.db")?;
/// let analyzer = Analyzer::default_config();
///
/// let score = analyzer.risk_score(&store, PersonId(1))?;
/// println!("{} ({})", score.total_score, score.risk_category);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    pub(crate) config: AnalyticsConfig,
}

impl Analyzer {
    /// Create an analyzer with the given configuration
    pub fn new(config: AnalyticsConfig) -> Self {
        Self { config }
    }

    /// Create an analyzer with default configuration
    pub fn default_config() -> Self {
        Self::new(AnalyticsConfig::default())
    }

    /// The active configuration
    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }
}
