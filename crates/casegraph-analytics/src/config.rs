//! Configuration and scoring constants
//!
//! The constants fix the scoring model and node sizing. [`AnalyticsConfig`]
//! holds the knobs a deployment may want to turn.

use serde::{Deserialize, Serialize};

/// Degree at which a person counts as a hub
pub const HUB_DEGREE_THRESHOLD: usize = 3;

/// Points per risk level step (level 4 gives 80)
pub const BASE_RISK_WEIGHT: u32 = 20;

/// Points per involvement
pub const CASE_SCORE_PER_INVOLVEMENT: u32 = 5;

/// Cap on the involvement component
pub const CASE_SCORE_CAP: u32 = 30;

/// Points per suspect involvement (uncapped)
pub const SUSPECT_WEIGHT: u32 = 10;

/// Points per relationship
pub const NETWORK_SCORE_PER_DEGREE: u32 = 3;

/// Cap on the network component
pub const NETWORK_SCORE_CAP: u32 = 20;

/// Cap on the total score
pub const TOTAL_SCORE_CAP: u32 = 100;

/// Lowest total scored as critical
pub const CRITICAL_FLOOR: u32 = 80;

/// Lowest total scored as high
pub const HIGH_FLOOR: u32 = 60;

/// Lowest total scored as medium
pub const MEDIUM_FLOOR: u32 = 40;

/// Lowest total scored as low
pub const LOW_FLOOR: u32 = 20;

/// Graph node size with no cases
pub const NODE_BASE_SIZE: u32 = 10;

/// Node size added per case
pub const NODE_SIZE_PER_CASE: u32 = 2;

/// Largest node size
pub const NODE_SIZE_CAP: u32 = 30;

/// Risk level value counted as high risk in graph stats and on the dashboard
pub const HIGH_RISK_LEVEL: u8 = 3;

/// Length of each dashboard list
pub const DASHBOARD_LIST_LEN: usize = 5;

/// How cases sharing participants are grouped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterStrategy {
    /// Single pass in creation order; a case joins the first cluster that reaches it
    #[default]
    Greedy,

    /// Transitive closure over shared participants
    ConnectedComponents,
}

impl ClusterStrategy {
    /// Storage/config key
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterStrategy::Greedy => "greedy",
            ClusterStrategy::ConnectedComponents => "connected_components",
        }
    }
}

/// Configuration for the analytics engine
///
/// # Examples
///
/// ```
/// use casegraph_analytics::{AnalyticsConfig, ClusterStrategy};
///
/// let config = AnalyticsConfig::default();
/// assert_eq!(config.hub_threshold, 3);
/// assert_eq!(config.cluster_strategy, ClusterStrategy::Greedy);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Minimum degree used by hub discovery when the caller gives none
    /// Default: 3
    pub hub_threshold: usize,

    /// Maximum number of related cases returned
    /// Default: 5
    pub related_cases_limit: usize,

    /// Minimum silence between timeline entries reported as a gap (hours)
    /// Default: 24
    pub timeline_gap_hours: u32,

    /// Window for the "recent cases" statistic (days)
    /// Default: 30
    pub recent_case_days: u32,

    /// Case clustering strategy
    /// Default: greedy
    pub cluster_strategy: ClusterStrategy,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            hub_threshold: HUB_DEGREE_THRESHOLD,
            related_cases_limit: 5,
            timeline_gap_hours: 24,
            recent_case_days: 30,
            cluster_strategy: ClusterStrategy::Greedy,
        }
    }
}

impl AnalyticsConfig {
    /// Same configuration with a different clustering strategy
    pub fn with_cluster_strategy(mut self, strategy: ClusterStrategy) -> Self {
        self.cluster_strategy = strategy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.hub_threshold, 3);
        assert_eq!(config.related_cases_limit, 5);
        assert_eq!(config.timeline_gap_hours, 24);
        assert_eq!(config.recent_case_days, 30);
        assert_eq!(config.cluster_strategy, ClusterStrategy::Greedy);
    }

    #[test]
    fn test_category_floors_descend() {
        assert!(CRITICAL_FLOOR > HIGH_FLOOR);
        assert!(HIGH_FLOOR > MEDIUM_FLOOR);
        assert!(MEDIUM_FLOOR > LOW_FLOOR);
        assert!(TOTAL_SCORE_CAP >= CRITICAL_FLOOR);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AnalyticsConfig = toml::from_str(
            r#"
            cluster_strategy = "connected_components"
            timeline_gap_hours = 12
            "#,
        )
        .unwrap();

        assert_eq!(config.cluster_strategy, ClusterStrategy::ConnectedComponents);
        assert_eq!(config.timeline_gap_hours, 12);
        assert_eq!(config.related_cases_limit, 5);
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = AnalyticsConfig::default().with_cluster_strategy(ClusterStrategy::ConnectedComponents);
        let serialized = serde_json::to_string(&config).unwrap();
        assert!(serialized.contains("\"connected_components\""));
        let deserialized: AnalyticsConfig = serde_json::from_str(&serialized).unwrap();
        assert_eq!(config, deserialized);
    }
}
