//! Cross-case clustering and pattern analysis
//!
//! Two clustering strategies are available (see [`ClusterStrategy`]):
//!
//! - **Greedy** walks cases in creation order. A case that has not been
//!   claimed yet collects every other unclaimed case it shares a participant
//!   with, and all of them are then claimed. The result depends on order:
//!   with A∩B = {x}, B∩C = {y} and A∩C = ∅, A's cluster holds only B and C
//!   ends up in no cluster at all.
//! - **Connected components** joins cases transitively through shared
//!   participants, so the same data yields a single cluster A, B, C.

use crate::cases::{CaseSummary, RelatedCase};
use crate::config::ClusterStrategy;
use crate::error::data_access;
use crate::{AnalyticsError, Analyzer};
use casegraph_domain::traits::{CaseQuery, CaseStore, InvolvementQuery};
use casegraph_domain::{Case, CaseId, CaseType, InvolvementType, PersonId};
use petgraph::unionfind::UnionFind;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Display;

/// Cases grouped around a main case
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseCluster {
    /// The case the cluster was started from
    pub main_case: CaseSummary,
    /// Cases sharing participants, in creation order
    pub related_cases: Vec<RelatedCase>,
    /// Participants of the main case
    pub total_persons: usize,
}

/// Cases per incident month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    /// `YYYY-MM`
    pub month: String,
    /// Cases with an incident in that month
    pub count: usize,
}

/// Cases per type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeCount {
    /// Case type
    pub case_type: CaseType,
    /// Number of cases
    pub count: usize,
}

/// Aggregate patterns over cases
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternAnalysis {
    /// Ascending by month; cases without an incident date are left out
    pub monthly_trend: Vec<MonthlyCount>,
    /// Descending by count, ties in type order; types without cases are left out
    pub case_type_distribution: Vec<TypeCount>,
    /// Persons who are a suspect in more than one case
    pub repeat_suspect_count: usize,
}

fn related(case: &Case, shared: BTreeSet<PersonId>) -> RelatedCase {
    RelatedCase {
        case: CaseSummary::from(case),
        shared_persons: shared.len(),
        shared_person_ids: shared.into_iter().collect(),
    }
}

fn greedy_clusters(cases: &[Case], participants: &[BTreeSet<PersonId>]) -> Vec<CaseCluster> {
    let mut processed = vec![false; cases.len()];
    let mut clusters = Vec::new();

    for i in 0..cases.len() {
        if processed[i] {
            continue;
        }

        let mut members = Vec::new();
        for j in 0..cases.len() {
            if j == i || processed[j] {
                continue;
            }
            let common: BTreeSet<PersonId> = participants[i]
                .intersection(&participants[j])
                .copied()
                .collect();
            if !common.is_empty() {
                members.push((j, common));
            }
        }

        if members.is_empty() {
            continue;
        }

        processed[i] = true;
        for (j, _) in &members {
            processed[*j] = true;
        }
        clusters.push(CaseCluster {
            main_case: CaseSummary::from(&cases[i]),
            related_cases: members
                .into_iter()
                .map(|(j, common)| related(&cases[j], common))
                .collect(),
            total_persons: participants[i].len(),
        });
    }

    clusters
}

fn component_clusters(cases: &[Case], participants: &[BTreeSet<PersonId>]) -> Vec<CaseCluster> {
    let mut sets = UnionFind::<usize>::new(cases.len());
    let mut first_seen: HashMap<PersonId, usize> = HashMap::new();
    for (i, persons) in participants.iter().enumerate() {
        for person in persons {
            match first_seen.get(person) {
                Some(&j) => {
                    sets.union(i, j);
                }
                None => {
                    first_seen.insert(*person, i);
                }
            }
        }
    }

    // Components in order of their earliest case, members ascending
    let mut slots: HashMap<usize, usize> = HashMap::new();
    let mut components: Vec<Vec<usize>> = Vec::new();
    for (i, label) in sets.into_labeling().into_iter().enumerate() {
        let slot = *slots.entry(label).or_insert_with(|| {
            components.push(Vec::new());
            components.len() - 1
        });
        components[slot].push(i);
    }

    components
        .into_iter()
        .filter(|members| members.len() > 1)
        .filter_map(|members| {
            let (&main, rest) = members.split_first()?;
            let related_cases = rest
                .iter()
                .map(|&j| {
                    let others: BTreeSet<PersonId> = members
                        .iter()
                        .filter(|&&k| k != j)
                        .flat_map(|&k| participants[k].iter().copied())
                        .collect();
                    let shared = participants[j].intersection(&others).copied().collect();
                    related(&cases[j], shared)
                })
                .collect();
            Some(CaseCluster {
                main_case: CaseSummary::from(&cases[main]),
                related_cases,
                total_persons: participants[main].len(),
            })
        })
        .collect()
}

impl Analyzer {
    /// Group cases that share participants, using the configured strategy
    ///
    /// Two store round trips: all cases, then all involvements.
    pub fn find_case_clusters<S>(&self, store: &S) -> Result<Vec<CaseCluster>, AnalyticsError>
    where
        S: CaseStore,
        S::Error: Display,
    {
        let cases = store.cases(&CaseQuery::default()).map_err(data_access)?;
        let involvements = store
            .involvements(&InvolvementQuery::default())
            .map_err(data_access)?;

        let position: HashMap<CaseId, usize> = cases.iter().enumerate().map(|(i, c)| (c.id, i)).collect();
        let mut participants = vec![BTreeSet::new(); cases.len()];
        for inv in &involvements {
            if let Some(&i) = position.get(&inv.case()) {
                participants[i].insert(inv.person());
            }
        }

        let clusters = match self.config.cluster_strategy {
            ClusterStrategy::Greedy => greedy_clusters(&cases, &participants),
            ClusterStrategy::ConnectedComponents => component_clusters(&cases, &participants),
        };

        tracing::info!(
            strategy = self.config.cluster_strategy.as_str(),
            cases = cases.len(),
            clusters = clusters.len(),
            "case clustering finished"
        );
        Ok(clusters)
    }

    /// Monthly trend, type distribution and repeat suspects
    ///
    /// `case_type` narrows all three figures.
    pub fn analyze_patterns<S>(&self, store: &S, case_type: Option<CaseType>) -> Result<PatternAnalysis, AnalyticsError>
    where
        S: CaseStore,
        S::Error: Display,
    {
        let cases = store
            .cases(&CaseQuery {
                case_type,
                ..Default::default()
            })
            .map_err(data_access)?;

        let mut monthly: BTreeMap<String, usize> = BTreeMap::new();
        let mut by_type: BTreeMap<CaseType, usize> = BTreeMap::new();
        for case in &cases {
            if let Some(at) = case.incident_date {
                *monthly.entry(at.format("%Y-%m").to_string()).or_default() += 1;
            }
            *by_type.entry(case.case_type).or_default() += 1;
        }

        let mut case_type_distribution: Vec<TypeCount> = by_type
            .into_iter()
            .map(|(case_type, count)| TypeCount { case_type, count })
            .collect();
        // stable sort keeps type order among equal counts
        case_type_distribution.sort_by(|a, b| b.count.cmp(&a.count));

        let suspects = store
            .involvements(&InvolvementQuery {
                case_type,
                involvement_type: Some(InvolvementType::Suspect),
                ..Default::default()
            })
            .map_err(data_access)?;
        let mut suspect_cases: HashMap<PersonId, BTreeSet<CaseId>> = HashMap::new();
        for inv in &suspects {
            suspect_cases.entry(inv.person()).or_default().insert(inv.case());
        }

        Ok(PatternAnalysis {
            monthly_trend: monthly
                .into_iter()
                .map(|(month, count)| MonthlyCount { month, count })
                .collect(),
            case_type_distribution,
            repeat_suspect_count: suspect_cases.values().filter(|c| c.len() > 1).count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockStore;
    use crate::AnalyticsConfig;
    use casegraph_domain::RiskLevel;

    /// A∩B = {x}, B∩C = {y}, A∩C = ∅, D alone
    fn chain() -> (MockStore, [CaseId; 4], [PersonId; 2]) {
        let mut store = MockStore::new();
        let x = store.add_person(1, RiskLevel::None);
        let y = store.add_person(2, RiskLevel::None);
        let z = store.add_person(3, RiskLevel::None);
        let a = store.add_case(1, CaseType::Theft);
        let b = store.add_case(2, CaseType::Theft);
        let c = store.add_case(3, CaseType::Fraud);
        let d = store.add_case(4, CaseType::Fraud);

        store.involve(x, a, InvolvementType::Suspect);
        store.involve(x, b, InvolvementType::Suspect);
        store.involve(y, b, InvolvementType::Witness);
        store.involve(y, c, InvolvementType::Victim);
        store.involve(z, d, InvolvementType::Victim);
        (store, [a, b, c, d], [x, y])
    }

    #[test]
    fn test_greedy_is_order_dependent() {
        let (store, [a, b, _, _], [x, _]) = chain();
        let clusters = Analyzer::default_config().find_case_clusters(&store).unwrap();

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].main_case.id, a);
        assert_eq!(clusters[0].total_persons, 1);
        assert_eq!(clusters[0].related_cases.len(), 1);
        assert_eq!(clusters[0].related_cases[0].case.id, b);
        assert_eq!(clusters[0].related_cases[0].shared_person_ids, vec![x]);
    }

    #[test]
    fn test_connected_components_are_transitive() {
        let (store, [a, b, c, _], [x, y]) = chain();
        let config = AnalyticsConfig::default().with_cluster_strategy(ClusterStrategy::ConnectedComponents);
        let clusters = Analyzer::new(config).find_case_clusters(&store).unwrap();

        assert_eq!(clusters.len(), 1);
        let cluster = &clusters[0];
        assert_eq!(cluster.main_case.id, a);
        assert_eq!(cluster.total_persons, 1);

        let related: Vec<(CaseId, Vec<PersonId>)> = cluster
            .related_cases
            .iter()
            .map(|r| (r.case.id, r.shared_person_ids.clone()))
            .collect();
        assert_eq!(related, vec![(b, vec![x, y]), (c, vec![y])]);
    }

    #[test]
    fn test_claimed_case_blocks_later_cluster() {
        // A and B share nobody, C shares with both: A claims C first
        let mut store = MockStore::new();
        let p = store.add_person(1, RiskLevel::None);
        let q = store.add_person(2, RiskLevel::None);
        let a = store.add_case(1, CaseType::Drug);
        let b = store.add_case(2, CaseType::Drug);
        let c = store.add_case(3, CaseType::Drug);
        store.involve(p, a, InvolvementType::Suspect);
        store.involve(q, b, InvolvementType::Suspect);
        // B only ever shared with the already claimed C
        store.involve(p, c, InvolvementType::Suspect);
        store.involve(q, c, InvolvementType::Suspect);

        let clusters = Analyzer::default_config().find_case_clusters(&store).unwrap();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].main_case.id, a);
        let ids: Vec<CaseId> = clusters[0].related_cases.iter().map(|r| r.case.id).collect();
        assert_eq!(ids, vec![c]);
        assert!(clusters.iter().all(|cl| cl.main_case.id != b));
    }

    #[test]
    fn test_no_shared_participants_no_clusters() {
        let mut store = MockStore::new();
        let p = store.add_person(1, RiskLevel::None);
        let q = store.add_person(2, RiskLevel::None);
        let a = store.add_case(1, CaseType::Other);
        let b = store.add_case(2, CaseType::Other);
        store.involve(p, a, InvolvementType::Victim);
        store.involve(q, b, InvolvementType::Victim);

        for strategy in [ClusterStrategy::Greedy, ClusterStrategy::ConnectedComponents] {
            let analyzer = Analyzer::new(AnalyticsConfig::default().with_cluster_strategy(strategy));
            assert!(analyzer.find_case_clusters(&store).unwrap().is_empty());
        }
    }

    #[test]
    fn test_pattern_analysis() {
        let (mut store, _, _) = chain();
        // undated cases still count towards the distribution
        store.cases[3].incident_date = None;

        let patterns = Analyzer::default_config().analyze_patterns(&store, None).unwrap();

        assert_eq!(
            patterns.monthly_trend,
            vec![MonthlyCount {
                month: "2024-01".to_string(),
                count: 3
            }]
        );
        assert_eq!(
            patterns.case_type_distribution,
            vec![
                TypeCount { case_type: CaseType::Theft, count: 2 },
                TypeCount { case_type: CaseType::Fraud, count: 2 },
            ]
        );
        assert_eq!(patterns.repeat_suspect_count, 1);

        let frauds = Analyzer::default_config()
            .analyze_patterns(&store, Some(CaseType::Fraud))
            .unwrap();
        assert_eq!(frauds.case_type_distribution.len(), 1);
        assert_eq!(frauds.repeat_suspect_count, 0);
        assert_eq!(frauds.monthly_trend[0].count, 1);
    }

    #[test]
    fn test_components_rooted_at_earliest_case() {
        // Unions arrive latest-first: {B, D, E} is only joined to B through D
        let mut store = MockStore::new();
        let p = store.add_person(1, RiskLevel::None);
        let q = store.add_person(2, RiskLevel::None);
        let r = store.add_person(3, RiskLevel::None);
        let a = store.add_case(1, CaseType::Theft);
        let b = store.add_case(2, CaseType::Theft);
        let c = store.add_case(3, CaseType::Theft);
        let d = store.add_case(4, CaseType::Theft);
        let e = store.add_case(5, CaseType::Theft);
        store.involve(p, d, InvolvementType::Suspect);
        store.involve(p, e, InvolvementType::Suspect);
        store.involve(q, b, InvolvementType::Witness);
        store.involve(q, d, InvolvementType::Witness);
        store.involve(r, a, InvolvementType::Victim);
        store.involve(r, c, InvolvementType::Victim);

        let config = AnalyticsConfig::default().with_cluster_strategy(ClusterStrategy::ConnectedComponents);
        let clusters = Analyzer::new(config).find_case_clusters(&store).unwrap();

        let mains: Vec<CaseId> = clusters.iter().map(|cl| cl.main_case.id).collect();
        assert_eq!(mains, vec![a, b]);

        let first: Vec<(CaseId, Vec<PersonId>)> = clusters[0]
            .related_cases
            .iter()
            .map(|rc| (rc.case.id, rc.shared_person_ids.clone()))
            .collect();
        assert_eq!(first, vec![(c, vec![r])]);

        let second: Vec<(CaseId, Vec<PersonId>)> = clusters[1]
            .related_cases
            .iter()
            .map(|rc| (rc.case.id, rc.shared_person_ids.clone()))
            .collect();
        assert_eq!(second, vec![(d, vec![p, q]), (e, vec![p])]);
        assert_eq!(clusters[1].total_persons, 1);
    }
}
