//! Network metrics engine
//!
//! Degree counts over the directed relationship graph, the additive risk
//! score, hub discovery and multi-case discovery.
//!
//! # Risk score
//!
//! | Component | Formula | Range |
//! |-----------|---------|-------|
//! | base | risk_level × 20 | 0-80 |
//! | case | involvements × 5, capped | 0-30 |
//! | role | suspect involvements × 10 | unbounded |
//! | network | degree × 3, capped | 0-20 |
//!
//! The total is capped at 100 and mapped to a [`RiskCategory`].

use crate::config::{
    BASE_RISK_WEIGHT, CASE_SCORE_CAP, CASE_SCORE_PER_INVOLVEMENT, CRITICAL_FLOOR, HIGH_FLOOR,
    HUB_DEGREE_THRESHOLD, LOW_FLOOR, MEDIUM_FLOOR, NETWORK_SCORE_CAP, NETWORK_SCORE_PER_DEGREE,
    SUSPECT_WEIGHT, TOTAL_SCORE_CAP,
};
use crate::error::data_access;
use crate::{AnalyticsError, Analyzer};
use casegraph_domain::traits::{CaseStore, InvolvementQuery, RelationshipQuery};
use casegraph_domain::{
    CaseId, CaseInvolvement, CaseType, InvolvementType, Person, PersonId, Relationship, RiskLevel,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt::{self, Display};

/// Connectivity of one person
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NetworkDegree {
    /// in_degree + out_degree
    pub degree: usize,
    /// Relationships pointing at the person
    pub in_degree: usize,
    /// Relationships starting at the person
    pub out_degree: usize,
    /// Distinct cases the person is involved in
    pub case_count: usize,
    /// degree >= [`HUB_DEGREE_THRESHOLD`]
    pub is_hub: bool,
}

impl NetworkDegree {
    pub(crate) fn new(out_degree: usize, in_degree: usize, case_count: usize) -> Self {
        let degree = out_degree + in_degree;
        Self {
            degree,
            in_degree,
            out_degree,
            case_count,
            is_hub: degree >= HUB_DEGREE_THRESHOLD,
        }
    }
}

/// Banded risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskCategory {
    /// Below 20
    Minimal,
    /// 20-39
    Low,
    /// 40-59
    Medium,
    /// 60-79
    High,
    /// 80 and above
    Critical,
}

impl RiskCategory {
    /// Band a total score
    pub fn from_score(score: u32) -> Self {
        if score >= CRITICAL_FLOOR {
            RiskCategory::Critical
        } else if score >= HIGH_FLOOR {
            RiskCategory::High
        } else if score >= MEDIUM_FLOOR {
            RiskCategory::Medium
        } else if score >= LOW_FLOOR {
            RiskCategory::Low
        } else {
            RiskCategory::Minimal
        }
    }

    /// Lowercase key
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Minimal => "minimal",
            RiskCategory::Low => "low",
            RiskCategory::Medium => "medium",
            RiskCategory::High => "high",
            RiskCategory::Critical => "critical",
        }
    }
}

impl Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Components of a risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskBreakdown {
    /// From the person's own risk level
    pub base_score: u32,
    /// From the number of involvements
    pub case_score: u32,
    /// From suspect involvements
    pub role_score: u32,
    /// From relationship degree
    pub network_score: u32,
}

/// Result of scoring one person
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskScore {
    /// Sum of the components, capped at 100
    pub total_score: u32,
    /// Uncapped components
    pub breakdown: RiskBreakdown,
    /// Band of `total_score`
    pub risk_category: RiskCategory,
}

/// Everything the risk score depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RiskInputs {
    /// Person's base risk level
    pub risk_level: RiskLevel,
    /// Involvement rows (not distinct cases)
    pub involvement_count: usize,
    /// Involvement rows with the suspect role
    pub suspect_count: usize,
    /// Relationship degree
    pub degree: usize,
}

fn points(count: usize, per: u32) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX).saturating_mul(per)
}

/// Score a person from their inputs
///
/// # Examples
///
/// ```
/// use casegraph_analytics::metrics::{compute_risk_score, RiskCategory, RiskInputs};
/// use casegraph_domain::RiskLevel;
///
/// let score = compute_risk_score(&RiskInputs {
///     risk_level: RiskLevel::High,
///     involvement_count: 4,
///     suspect_count: 1,
///     degree: 2,
/// });
/// assert_eq!(score.total_score, 96);
/// assert_eq!(score.risk_category, RiskCategory::Critical);
/// ```
pub fn compute_risk_score(inputs: &RiskInputs) -> RiskScore {
    let breakdown = RiskBreakdown {
        base_score: u32::from(inputs.risk_level.value()) * BASE_RISK_WEIGHT,
        case_score: points(inputs.involvement_count, CASE_SCORE_PER_INVOLVEMENT).min(CASE_SCORE_CAP),
        role_score: points(inputs.suspect_count, SUSPECT_WEIGHT),
        network_score: points(inputs.degree, NETWORK_SCORE_PER_DEGREE).min(NETWORK_SCORE_CAP),
    };

    let total_score = breakdown
        .base_score
        .saturating_add(breakdown.case_score)
        .saturating_add(breakdown.role_score)
        .saturating_add(breakdown.network_score)
        .min(TOTAL_SCORE_CAP);

    RiskScore {
        total_score,
        breakdown,
        risk_category: RiskCategory::from_score(total_score),
    }
}

/// A person with their network metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonMetrics {
    /// The person
    pub person: Person,
    /// Their metrics
    pub metrics: NetworkDegree,
}

/// A person involved in more than one case
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiCaseProfile {
    /// The person
    pub person: Person,
    /// Distinct cases
    pub case_count: usize,
    /// Distinct roles across those cases
    pub roles: Vec<InvolvementType>,
    /// Distinct case types
    pub case_types: Vec<CaseType>,
    /// Earliest known incident among the cases
    pub first_incident: Option<DateTime<Utc>>,
    /// Latest known incident among the cases
    pub last_incident: Option<DateTime<Utc>>,
}

/// Per-person rollup of involvement rows
#[derive(Debug, Clone, Default)]
pub(crate) struct Participation {
    pub cases: BTreeSet<CaseId>,
    pub roles: BTreeSet<InvolvementType>,
    pub case_types: BTreeSet<CaseType>,
    pub first_incident: Option<DateTime<Utc>>,
    pub last_incident: Option<DateTime<Utc>>,
}

impl Participation {
    fn record(&mut self, inv: &CaseInvolvement) {
        self.cases.insert(inv.case());
        self.roles.insert(inv.role());
        self.case_types.insert(inv.case_type);
        if let Some(at) = inv.incident_date {
            self.first_incident = Some(self.first_incident.map_or(at, |t| t.min(at)));
            self.last_incident = Some(self.last_incident.map_or(at, |t| t.max(at)));
        }
    }
}

pub(crate) fn participation(involvements: &[CaseInvolvement]) -> HashMap<PersonId, Participation> {
    let mut table: HashMap<PersonId, Participation> = HashMap::new();
    for inv in involvements {
        table.entry(inv.person()).or_default().record(inv);
    }
    table
}

/// (out_degree, in_degree) per person
pub(crate) fn degree_table(relationships: &[Relationship]) -> HashMap<PersonId, (usize, usize)> {
    let mut table: HashMap<PersonId, (usize, usize)> = HashMap::new();
    for rel in relationships {
        table.entry(rel.person1).or_default().0 += 1;
        table.entry(rel.person2).or_default().1 += 1;
    }
    table
}

impl Analyzer {
    pub(crate) fn require_person<S>(&self, store: &S, id: PersonId) -> Result<Person, AnalyticsError>
    where
        S: CaseStore,
        S::Error: Display,
    {
        store
            .get_person(id)
            .map_err(data_access)?
            .ok_or_else(|| AnalyticsError::NotFound(format!("person {}", id)))
    }

    /// Degree, case count and hub flag for one person
    pub fn network_degree<S>(&self, store: &S, id: PersonId) -> Result<NetworkDegree, AnalyticsError>
    where
        S: CaseStore,
        S::Error: Display,
    {
        self.require_person(store, id)?;
        let (degree, involvements) = self.person_edges(store, id)?;
        let case_count = involvements.iter().map(|i| i.case()).collect::<BTreeSet<_>>().len();
        Ok(NetworkDegree::new(degree.0, degree.1, case_count))
    }

    /// Risk score for one person
    pub fn risk_score<S>(&self, store: &S, id: PersonId) -> Result<RiskScore, AnalyticsError>
    where
        S: CaseStore,
        S::Error: Display,
    {
        let person = self.require_person(store, id)?;
        let ((out_degree, in_degree), involvements) = self.person_edges(store, id)?;

        let inputs = RiskInputs {
            risk_level: person.risk_level,
            involvement_count: involvements.len(),
            suspect_count: involvements.iter().filter(|i| i.involvement.is_suspect()).count(),
            degree: out_degree + in_degree,
        };
        let score = compute_risk_score(&inputs);
        tracing::debug!(person = %id, total = score.total_score, "scored person");
        Ok(score)
    }

    fn person_edges<S>(
        &self,
        store: &S,
        id: PersonId,
    ) -> Result<((usize, usize), Vec<CaseInvolvement>), AnalyticsError>
    where
        S: CaseStore,
        S::Error: Display,
    {
        let relationships = store
            .relationships(&RelationshipQuery::touching(id))
            .map_err(data_access)?;
        let out_degree = relationships.iter().filter(|r| r.person1 == id).count();
        let in_degree = relationships.iter().filter(|r| r.person2 == id).count();

        let involvements = store
            .involvements(&InvolvementQuery::for_persons(vec![id]))
            .map_err(data_access)?;

        Ok(((out_degree, in_degree), involvements))
    }

    /// Persons with at least `min_connections` relationships
    ///
    /// Ordered by degree descending, then person id.
    pub fn find_hubs<S>(&self, store: &S, min_connections: usize) -> Result<Vec<PersonMetrics>, AnalyticsError>
    where
        S: CaseStore,
        S::Error: Display,
    {
        let persons = store.persons(None).map_err(data_access)?;
        let relationships = store
            .relationships(&RelationshipQuery::default())
            .map_err(data_access)?;
        let involvements = store
            .involvements(&InvolvementQuery::default())
            .map_err(data_access)?;

        let degrees = degree_table(&relationships);
        let participation = participation(&involvements);

        let mut hubs: Vec<PersonMetrics> = persons
            .into_iter()
            .filter_map(|person| {
                let (out_degree, in_degree) = degrees.get(&person.id).copied().unwrap_or_default();
                let case_count = participation.get(&person.id).map_or(0, |p| p.cases.len());
                let metrics = NetworkDegree::new(out_degree, in_degree, case_count);
                (metrics.degree >= min_connections).then_some(PersonMetrics { person, metrics })
            })
            .collect();

        hubs.sort_by(|a, b| {
            b.metrics
                .degree
                .cmp(&a.metrics.degree)
                .then(a.person.id.cmp(&b.person.id))
        });

        tracing::info!(min_connections, hubs = hubs.len(), "hub discovery finished");
        Ok(hubs)
    }

    /// Persons involved in more than one distinct case
    ///
    /// Ordered by case count descending, then person id.
    pub fn find_multi_case_persons<S>(&self, store: &S) -> Result<Vec<MultiCaseProfile>, AnalyticsError>
    where
        S: CaseStore,
        S::Error: Display,
    {
        let persons = store.persons(None).map_err(data_access)?;
        let involvements = store
            .involvements(&InvolvementQuery::default())
            .map_err(data_access)?;
        let mut participation = participation(&involvements);

        let mut profiles: Vec<MultiCaseProfile> = persons
            .into_iter()
            .filter_map(|person| {
                let p = participation.remove(&person.id)?;
                (p.cases.len() > 1).then(|| MultiCaseProfile {
                    person,
                    case_count: p.cases.len(),
                    roles: p.roles.into_iter().collect(),
                    case_types: p.case_types.into_iter().collect(),
                    first_incident: p.first_incident,
                    last_incident: p.last_incident,
                })
            })
            .collect();

        profiles.sort_by(|a, b| {
            b.case_count
                .cmp(&a.case_count)
                .then(a.person.id.cmp(&b.person.id))
        });
        Ok(profiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{day, MockStore};

    fn inputs(level: RiskLevel, involvements: usize, suspects: usize, degree: usize) -> RiskInputs {
        RiskInputs {
            risk_level: level,
            involvement_count: involvements,
            suspect_count: suspects,
            degree,
        }
    }

    #[test]
    fn test_isolated_person_is_not_a_hub() {
        let mut store = MockStore::new();
        let p = store.add_person(1, RiskLevel::None);

        let degree = Analyzer::default_config().network_degree(&store, p).unwrap();
        assert_eq!(degree.degree, 0);
        assert_eq!(degree.case_count, 0);
        assert!(!degree.is_hub);
    }

    #[test]
    fn test_hub_threshold() {
        let mut store = MockStore::new();
        let a = store.add_person(1, RiskLevel::None);
        let b = store.add_person(2, RiskLevel::None);
        let c = store.add_person(3, RiskLevel::None);
        let d = store.add_person(4, RiskLevel::None);
        store.relate(a, b, 2);
        store.relate(c, a, 2);

        let analyzer = Analyzer::default_config();
        let two = analyzer.network_degree(&store, a).unwrap();
        assert_eq!((two.out_degree, two.in_degree, two.degree), (1, 1, 2));
        assert!(!two.is_hub);

        store.relate(a, d, 1);
        let three = analyzer.network_degree(&store, a).unwrap();
        assert_eq!(three.degree, 3);
        assert!(three.is_hub);
    }

    #[test]
    fn test_case_count_is_distinct() {
        let mut store = MockStore::new();
        let p = store.add_person(1, RiskLevel::None);
        let c1 = store.add_case(1, CaseType::Theft);
        let c2 = store.add_case(2, CaseType::Fraud);
        store.involve(p, c1, InvolvementType::Suspect);
        store.involve(p, c1, InvolvementType::Witness);
        store.involve(p, c2, InvolvementType::Victim);

        let degree = Analyzer::default_config().network_degree(&store, p).unwrap();
        assert_eq!(degree.case_count, 2);
    }

    #[test]
    fn test_unknown_person_is_not_found() {
        let store = MockStore::new();
        let analyzer = Analyzer::default_config();
        assert!(matches!(
            analyzer.network_degree(&store, PersonId(7)),
            Err(AnalyticsError::NotFound(_))
        ));
        assert!(matches!(
            analyzer.risk_score(&store, PersonId(7)),
            Err(AnalyticsError::NotFound(_))
        ));
    }

    #[test]
    fn test_store_failure_is_data_access() {
        let mut store = MockStore::new();
        store.fail = true;
        let result = Analyzer::default_config().find_hubs(&store, 3);
        match result {
            Err(AnalyticsError::DataAccess(msg)) => assert_eq!(msg, "connection lost"),
            other => panic!("expected DataAccess, got {:?}", other),
        }
    }

    #[test]
    fn test_worked_example_is_critical() {
        let score = compute_risk_score(&inputs(RiskLevel::High, 4, 1, 2));
        assert_eq!(score.breakdown.base_score, 60);
        assert_eq!(score.breakdown.case_score, 20);
        assert_eq!(score.breakdown.role_score, 10);
        assert_eq!(score.breakdown.network_score, 6);
        assert_eq!(score.total_score, 96);
        assert_eq!(score.risk_category, RiskCategory::Critical);
    }

    #[test]
    fn test_components_are_capped() {
        let score = compute_risk_score(&inputs(RiskLevel::VeryHigh, 50, 5, 40));
        assert_eq!(score.breakdown.case_score, 30);
        assert_eq!(score.breakdown.role_score, 50);
        assert_eq!(score.breakdown.network_score, 20);
        assert_eq!(score.total_score, 100);
    }

    #[test]
    fn test_category_boundaries() {
        assert_eq!(RiskCategory::from_score(80), RiskCategory::Critical);
        assert_eq!(RiskCategory::from_score(79), RiskCategory::High);
        assert_eq!(RiskCategory::from_score(60), RiskCategory::High);
        assert_eq!(RiskCategory::from_score(59), RiskCategory::Medium);
        assert_eq!(RiskCategory::from_score(40), RiskCategory::Medium);
        assert_eq!(RiskCategory::from_score(20), RiskCategory::Low);
        assert_eq!(RiskCategory::from_score(19), RiskCategory::Minimal);
        assert_eq!(RiskCategory::from_score(0), RiskCategory::Minimal);
    }

    #[test]
    fn test_risk_score_from_store() {
        let mut store = MockStore::new();
        let p = store.add_person(1, RiskLevel::Medium);
        let q = store.add_person(2, RiskLevel::None);
        let c1 = store.add_case(1, CaseType::Drug);
        let c2 = store.add_case(2, CaseType::Drug);
        store.involve(p, c1, InvolvementType::Suspect);
        store.involve(p, c2, InvolvementType::Suspect);
        store.relate(p, q, 3);

        let score = Analyzer::default_config().risk_score(&store, p).unwrap();
        // 40 base + 10 cases + 20 suspect + 3 network
        assert_eq!(score.total_score, 73);
        assert_eq!(score.risk_category, RiskCategory::High);
    }

    #[test]
    fn test_find_hubs_ordering() {
        let mut store = MockStore::new();
        let ids: Vec<PersonId> = (1..=5).map(|i| store.add_person(i, RiskLevel::None)).collect();
        // person 2 and 3 both reach degree 3, person 1 reaches 4
        store.relate(ids[0], ids[1], 1);
        store.relate(ids[0], ids[2], 1);
        store.relate(ids[0], ids[3], 1);
        store.relate(ids[4], ids[0], 1);
        store.relate(ids[1], ids[2], 1);
        store.relate(ids[2], ids[1], 1);

        let hubs = Analyzer::default_config().find_hubs(&store, 3).unwrap();
        let order: Vec<(i64, usize)> = hubs.iter().map(|h| (h.person.id.0, h.metrics.degree)).collect();
        assert_eq!(order, vec![(1, 4), (2, 3), (3, 3)]);
        assert!(hubs.iter().all(|h| h.metrics.is_hub));
    }

    #[test]
    fn test_multi_case_profiles() {
        let mut store = MockStore::new();
        let a = store.add_person(1, RiskLevel::None);
        let b = store.add_person(2, RiskLevel::None);
        let c = store.add_person(3, RiskLevel::None);
        let c1 = store.add_case(1, CaseType::Theft);
        let c2 = store.add_case(5, CaseType::Fraud);
        let c3 = store.add_case(9, CaseType::Theft);

        store.involve(a, c1, InvolvementType::Suspect);
        store.involve(a, c2, InvolvementType::Witness);
        store.involve(b, c1, InvolvementType::Victim);
        store.involve(b, c2, InvolvementType::Victim);
        store.involve(b, c3, InvolvementType::Suspect);
        store.involve(c, c3, InvolvementType::Witness);

        let profiles = Analyzer::default_config().find_multi_case_persons(&store).unwrap();
        assert_eq!(profiles.len(), 2);

        assert_eq!(profiles[0].person.id, b);
        assert_eq!(profiles[0].case_count, 3);
        assert_eq!(profiles[0].roles, vec![InvolvementType::Suspect, InvolvementType::Victim]);
        assert_eq!(profiles[0].case_types, vec![CaseType::Theft, CaseType::Fraud]);
        assert_eq!(profiles[0].first_incident, Some(day(1)));
        assert_eq!(profiles[0].last_incident, Some(day(9)));

        assert_eq!(profiles[1].person.id, a);
        assert_eq!(profiles[1].case_count, 2);
    }

    #[test]
    fn test_risk_category_serializes_lowercase() {
        let json = serde_json::to_string(&RiskCategory::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
    }
}
