//! Command implementations.

pub mod cases;
pub mod graph;
pub mod network;
pub mod seed;
pub mod timeline;

pub use self::cases::{
    execute_clusters, execute_dashboard, execute_patterns, execute_related, execute_stats,
};
pub use self::graph::execute_graph;
pub use self::network::{execute_degree, execute_hubs, execute_multi_case, execute_risk};
pub use self::seed::execute_seed;
pub use self::timeline::{execute_gaps, execute_temporal, execute_timeline};
