//! Network graph builder
//!
//! Produces the node/edge/stat view used for visualisation. A filter narrows
//! the person set in this order: case, case type, cross-case mode, and then
//! the minimum risk level. Relationships survive only when both endpoints do.
//!
//! A build costs at most five store round trips whatever the graph size:
//! case lookup, candidate involvements, persons, relationships and the
//! involvements of the surviving persons.

use crate::config::{HIGH_RISK_LEVEL, NODE_BASE_SIZE, NODE_SIZE_CAP, NODE_SIZE_PER_CASE};
use crate::error::data_access;
use crate::metrics::participation;
use crate::{AnalyticsError, Analyzer};
use casegraph_domain::traits::{CaseStore, InvolvementQuery, RelationshipQuery};
use casegraph_domain::{CaseId, CaseType, InvolvementType, PersonId, RelationshipType, RiskLevel};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt::Display;

/// Which persons a graph covers when no case or case type is given
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// Every person
    #[default]
    All,
    /// Persons of the selected case (same as `All` without a case id)
    Case,
    /// Persons involved in more than one case
    CrossCase,
}

impl AnalysisMode {
    /// Parameter key
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::All => "all",
            AnalysisMode::Case => "case",
            AnalysisMode::CrossCase => "cross_case",
        }
    }

    /// Parse a parameter key
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" => Some(AnalysisMode::All),
            "case" => Some(AnalysisMode::Case),
            "cross_case" => Some(AnalysisMode::CrossCase),
            _ => None,
        }
    }
}

/// Graph filter criteria
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphFilter {
    /// Only persons involved in this case
    pub case_id: Option<CaseId>,
    /// Only persons involved in a case of this type
    pub case_type: Option<CaseType>,
    /// Only persons at or above this risk level
    pub min_risk_level: Option<RiskLevel>,
    /// Person-set mode when neither case nor case type is set
    pub mode: AnalysisMode,
}

impl GraphFilter {
    /// Build a filter from string parameters
    ///
    /// Recognised keys are `case`, `case_type`, `risk_level` and `mode`;
    /// others are ignored. Empty values count as unset.
    ///
    /// # Examples
    ///
    /// ```
    /// use casegraph_analytics::graph::{AnalysisMode, GraphFilter};
    /// use casegraph_domain::CaseType;
    ///
    /// let filter = GraphFilter::from_params([("case_type", "fraud"), ("mode", "cross_case")]).unwrap();
    /// assert_eq!(filter.case_type, Some(CaseType::Fraud));
    /// assert_eq!(filter.mode, AnalysisMode::CrossCase);
    ///
    /// assert!(GraphFilter::from_params([("risk_level", "9")]).is_err());
    /// ```
    pub fn from_params<'a, I>(params: I) -> Result<Self, AnalyticsError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut filter = GraphFilter::default();

        for (key, value) in params {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key {
                "case" => {
                    let id: i64 = value.parse().map_err(|_| {
                        AnalyticsError::InvalidArgument(format!("case must be an integer id, got '{}'", value))
                    })?;
                    filter.case_id = Some(CaseId(id));
                }
                "case_type" => {
                    let case_type = value
                        .parse::<CaseType>()
                        .map_err(|e| AnalyticsError::InvalidArgument(e.to_string()))?;
                    filter.case_type = Some(case_type);
                }
                "risk_level" => {
                    let level = value
                        .parse::<RiskLevel>()
                        .map_err(|e| AnalyticsError::InvalidArgument(e.to_string()))?;
                    filter.min_risk_level = Some(level);
                }
                "mode" => {
                    filter.mode = AnalysisMode::parse(value).ok_or_else(|| {
                        AnalyticsError::InvalidArgument(format!("unknown analysis mode '{}'", value))
                    })?;
                }
                _ => {}
            }
        }

        Ok(filter)
    }

    fn restricts_persons(&self) -> bool {
        self.case_id.is_some()
            || self.case_type.is_some()
            || self.mode == AnalysisMode::CrossCase
            || self.min_risk_level.is_some()
    }
}

/// A person in the graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    /// Person id
    pub id: PersonId,
    /// Full name
    pub label: String,
    /// Base risk level
    pub risk_level: RiskLevel,
    /// Distinct cases across all of the person's involvements
    pub case_count: usize,
    /// Distinct roles
    pub roles: Vec<InvolvementType>,
    /// Distinct case types
    pub case_types: Vec<CaseType>,
    /// Display size
    pub size: u32,
}

/// A relationship in the graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphEdge {
    /// Source person
    pub from: PersonId,
    /// Target person
    pub to: PersonId,
    /// Display label of the relationship type
    pub label: String,
    /// Strength 1-5
    pub strength: u8,
    /// Relationship type key
    #[serde(rename = "type")]
    pub relationship_type: RelationshipType,
    /// Cases both endpoints are involved in
    pub common_cases: usize,
    /// Display width
    pub width: u8,
}

/// Counts over the filtered graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    /// Nodes
    pub total_persons: usize,
    /// Edges
    pub total_relationships: usize,
    /// Nodes with more than one case
    pub multi_case_persons: usize,
    /// Nodes at or above the high risk level
    pub high_risk_persons: usize,
}

/// Graph view ready for serialisation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetworkGraph {
    /// Persons
    pub nodes: Vec<GraphNode>,
    /// Relationships
    pub edges: Vec<GraphEdge>,
    /// Summary counts
    pub stats: GraphStats,
}

fn node_size(case_count: usize) -> u32 {
    let cases = u32::try_from(case_count).unwrap_or(u32::MAX);
    NODE_BASE_SIZE
        .saturating_add(cases.saturating_mul(NODE_SIZE_PER_CASE))
        .min(NODE_SIZE_CAP)
}

impl Analyzer {
    /// Build the filtered person graph
    ///
    /// Fails with `NotFound` for an unknown case id. An empty person set is
    /// not an error and yields an empty graph with zero stats.
    pub fn build_network_graph<S>(&self, store: &S, filter: &GraphFilter) -> Result<NetworkGraph, AnalyticsError>
    where
        S: CaseStore,
        S::Error: Display,
    {
        let candidates = self.candidate_persons(store, filter)?;

        let mut persons = store
            .persons(candidates.as_deref())
            .map_err(data_access)?;
        if let Some(min) = filter.min_risk_level {
            persons.retain(|p| p.risk_level >= min);
        }

        if persons.is_empty() {
            tracing::debug!(?filter, "graph filter matched no persons");
            return Ok(NetworkGraph::default());
        }

        let ids: Vec<PersonId> = persons.iter().map(|p| p.id).collect();
        let (relationship_query, involvement_query) = if filter.restricts_persons() {
            (
                RelationshipQuery::within(ids.clone()),
                InvolvementQuery::for_persons(ids.clone()),
            )
        } else {
            (RelationshipQuery::default(), InvolvementQuery::default())
        };

        let relationships = store.relationships(&relationship_query).map_err(data_access)?;
        let involvements = store.involvements(&involvement_query).map_err(data_access)?;
        let participation = participation(&involvements);
        let included: HashSet<PersonId> = ids.into_iter().collect();

        let nodes: Vec<GraphNode> = persons
            .into_iter()
            .map(|person| {
                let p = participation.get(&person.id);
                let case_count = p.map_or(0, |p| p.cases.len());
                GraphNode {
                    id: person.id,
                    label: person.full_name(),
                    risk_level: person.risk_level,
                    case_count,
                    roles: p.map(|p| p.roles.iter().copied().collect()).unwrap_or_default(),
                    case_types: p.map(|p| p.case_types.iter().copied().collect()).unwrap_or_default(),
                    size: node_size(case_count),
                }
            })
            .collect();

        let empty = BTreeSet::new();
        let case_set = |id: PersonId| participation.get(&id).map_or(&empty, |p| &p.cases);

        let edges: Vec<GraphEdge> = relationships
            .into_iter()
            .filter(|r| included.contains(&r.person1) && included.contains(&r.person2))
            .map(|r| GraphEdge {
                from: r.person1,
                to: r.person2,
                label: r.relationship_type.label().to_string(),
                strength: r.strength,
                relationship_type: r.relationship_type,
                common_cases: case_set(r.person1).intersection(case_set(r.person2)).count(),
                width: r.strength.max(1),
            })
            .collect();

        let stats = GraphStats {
            total_persons: nodes.len(),
            total_relationships: edges.len(),
            multi_case_persons: nodes.iter().filter(|n| n.case_count > 1).count(),
            high_risk_persons: nodes
                .iter()
                .filter(|n| n.risk_level.value() >= HIGH_RISK_LEVEL)
                .count(),
        };

        tracing::info!(
            persons = stats.total_persons,
            relationships = stats.total_relationships,
            "built network graph"
        );
        Ok(NetworkGraph { nodes, edges, stats })
    }

    /// Person ids selected by case, case type or mode; `None` means everyone
    fn candidate_persons<S>(&self, store: &S, filter: &GraphFilter) -> Result<Option<Vec<PersonId>>, AnalyticsError>
    where
        S: CaseStore,
        S::Error: Display,
    {
        if let Some(case_id) = filter.case_id {
            if store.get_case(case_id).map_err(data_access)?.is_none() {
                return Err(AnalyticsError::NotFound(format!("case {}", case_id)));
            }
            let involvements = store
                .involvements(&InvolvementQuery::for_cases(vec![case_id]))
                .map_err(data_access)?;
            return Ok(Some(distinct_persons(involvements.iter().map(|i| i.person()))));
        }

        if let Some(case_type) = filter.case_type {
            let involvements = store
                .involvements(&InvolvementQuery {
                    case_type: Some(case_type),
                    ..Default::default()
                })
                .map_err(data_access)?;
            return Ok(Some(distinct_persons(involvements.iter().map(|i| i.person()))));
        }

        if filter.mode == AnalysisMode::CrossCase {
            let involvements = store
                .involvements(&InvolvementQuery::default())
                .map_err(data_access)?;
            let mut cases: HashMap<PersonId, BTreeSet<CaseId>> = HashMap::new();
            for inv in &involvements {
                cases.entry(inv.person()).or_default().insert(inv.case());
            }
            let multi = cases
                .into_iter()
                .filter(|(_, c)| c.len() > 1)
                .map(|(p, _)| p);
            return Ok(Some(distinct_persons(multi)));
        }

        Ok(None)
    }
}

fn distinct_persons(ids: impl Iterator<Item = PersonId>) -> Vec<PersonId> {
    ids.collect::<BTreeSet<_>>().into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockStore;

    /// Four persons: 1 (risk 4), 2 (risk 3), 3 (risk 1), 4 (risk 0)
    /// Cases: 1 theft {1, 2, 3}, 2 fraud {1, 2}, 3 theft {4}
    /// Edges: 1->2 (5), 2->3 (2), 3->4 (1), 4->1 (3)
    fn fixture() -> MockStore {
        let mut store = MockStore::new();
        let p1 = store.add_person(1, RiskLevel::VeryHigh);
        let p2 = store.add_person(2, RiskLevel::High);
        let p3 = store.add_person(3, RiskLevel::Low);
        let p4 = store.add_person(4, RiskLevel::None);
        let c1 = store.add_case(1, CaseType::Theft);
        let c2 = store.add_case(2, CaseType::Fraud);
        let c3 = store.add_case(3, CaseType::Theft);

        store.involve(p1, c1, InvolvementType::Suspect);
        store.involve(p2, c1, InvolvementType::Witness);
        store.involve(p3, c1, InvolvementType::Victim);
        store.involve(p1, c2, InvolvementType::Suspect);
        store.involve(p2, c2, InvolvementType::Suspect);
        store.involve(p4, c3, InvolvementType::Victim);

        store.relate(p1, p2, 5);
        store.relate(p2, p3, 2);
        store.relate(p3, p4, 1);
        store.relate(p4, p1, 3);
        store
    }

    #[test]
    fn test_unfiltered_graph_has_everything() {
        let store = fixture();
        let graph = Analyzer::default_config()
            .build_network_graph(&store, &GraphFilter::default())
            .unwrap();

        assert_eq!(graph.nodes.len(), 4);
        assert_eq!(graph.edges.len(), 4);
        assert_eq!(
            graph.stats,
            GraphStats {
                total_persons: 4,
                total_relationships: 4,
                multi_case_persons: 2,
                high_risk_persons: 2,
            }
        );

        let first = &graph.nodes[0];
        assert_eq!(first.id, PersonId(1));
        assert_eq!(first.case_count, 2);
        assert_eq!(first.size, 14);
        assert_eq!(first.roles, vec![InvolvementType::Suspect]);
        assert_eq!(first.case_types, vec![CaseType::Theft, CaseType::Fraud]);

        let strongest = &graph.edges[0];
        assert_eq!((strongest.from, strongest.to), (PersonId(1), PersonId(2)));
        assert_eq!(strongest.common_cases, 2);
        assert_eq!(strongest.width, 5);
        assert_eq!(strongest.label, RelationshipType::Associate.label());
    }

    #[test]
    fn test_case_filter() {
        let store = fixture();
        let filter = GraphFilter {
            case_id: Some(CaseId(1)),
            ..Default::default()
        };
        let graph = Analyzer::default_config().build_network_graph(&store, &filter).unwrap();

        let ids: Vec<i64> = graph.nodes.iter().map(|n| n.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(graph.edges.len(), 2, "edges to person 4 are dropped");
        // case counts still use every involvement of the person
        assert_eq!(graph.nodes[0].case_count, 2);
    }

    #[test]
    fn test_case_filter_beats_case_type() {
        let store = fixture();
        let filter = GraphFilter {
            case_id: Some(CaseId(3)),
            case_type: Some(CaseType::Fraud),
            ..Default::default()
        };
        let graph = Analyzer::default_config().build_network_graph(&store, &filter).unwrap();
        let ids: Vec<i64> = graph.nodes.iter().map(|n| n.id.0).collect();
        assert_eq!(ids, vec![4]);
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn test_unknown_case_is_not_found() {
        let store = fixture();
        let filter = GraphFilter {
            case_id: Some(CaseId(99)),
            ..Default::default()
        };
        let result = Analyzer::default_config().build_network_graph(&store, &filter);
        assert!(matches!(result, Err(AnalyticsError::NotFound(_))));
    }

    #[test]
    fn test_case_type_filter() {
        let store = fixture();
        let filter = GraphFilter {
            case_type: Some(CaseType::Theft),
            ..Default::default()
        };
        let graph = Analyzer::default_config().build_network_graph(&store, &filter).unwrap();
        assert_eq!(graph.nodes.len(), 4);
        assert_eq!(graph.edges.len(), 4);
    }

    #[test]
    fn test_cross_case_mode() {
        let store = fixture();
        let filter = GraphFilter {
            mode: AnalysisMode::CrossCase,
            ..Default::default()
        };
        let graph = Analyzer::default_config().build_network_graph(&store, &filter).unwrap();
        let ids: Vec<i64> = graph.nodes.iter().map(|n| n.id.0).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(graph.stats.total_relationships, 1);
        assert_eq!(graph.stats.multi_case_persons, 2);
    }

    #[test]
    fn test_min_risk_drops_low_endpoints() {
        let store = fixture();
        let filter = GraphFilter {
            min_risk_level: Some(RiskLevel::High),
            ..Default::default()
        };
        let graph = Analyzer::default_config().build_network_graph(&store, &filter).unwrap();

        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges.len(), 1);
        for edge in &graph.edges {
            for end in [edge.from, edge.to] {
                let node = graph.nodes.iter().find(|n| n.id == end).unwrap();
                assert!(node.risk_level >= RiskLevel::High);
            }
        }
    }

    #[test]
    fn test_empty_result_is_not_an_error() {
        let store = MockStore::new();
        let graph = Analyzer::default_config()
            .build_network_graph(&store, &GraphFilter::default())
            .unwrap();
        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
        assert_eq!(graph.stats, GraphStats::default());
    }

    #[test]
    fn test_json_shape() {
        let store = fixture();
        let graph = Analyzer::default_config()
            .build_network_graph(&store, &GraphFilter::default())
            .unwrap();
        let json = serde_json::to_value(&graph).unwrap();

        let edge = &json["edges"][0];
        assert_eq!(edge["from"], 1);
        assert_eq!(edge["to"], 2);
        assert_eq!(edge["type"], "associate");
        assert_eq!(json["nodes"][0]["risk_level"], 4);
        assert_eq!(json["stats"]["total_persons"], 4);
    }

    #[test]
    fn test_node_size_caps() {
        assert_eq!(node_size(0), 10);
        assert_eq!(node_size(5), 20);
        assert_eq!(node_size(10), 30);
        assert_eq!(node_size(1000), 30);
    }

    #[test]
    fn test_from_params() {
        let filter = GraphFilter::from_params([
            ("case", "12"),
            ("risk_level", "3"),
            ("mode", ""),
            ("page", "2"),
        ])
        .unwrap();
        assert_eq!(filter.case_id, Some(CaseId(12)));
        assert_eq!(filter.min_risk_level, Some(RiskLevel::High));
        assert_eq!(filter.mode, AnalysisMode::All);

        for bad in [("case", "twelve"), ("case_type", "arson"), ("risk_level", "7"), ("mode", "everything")] {
            assert!(matches!(
                GraphFilter::from_params([bad]),
                Err(AnalyticsError::InvalidArgument(_))
            ));
        }
    }
}
