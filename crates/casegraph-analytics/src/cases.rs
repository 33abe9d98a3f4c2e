//! Case-level analytics: related cases, statistics and the dashboard

use crate::config::{DASHBOARD_LIST_LEN, HIGH_RISK_LEVEL};
use crate::error::data_access;
use crate::{AnalyticsError, Analyzer};
use casegraph_domain::traits::{CaseQuery, CaseStore, InvolvementQuery};
use casegraph_domain::{Case, CaseId, CasePriority, CaseStatus, CaseType, Person, PersonId, RiskLevel};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Display;

/// The parts of a case shown in analytic results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseSummary {
    /// Case id
    pub id: CaseId,
    /// Human-readable case number
    pub case_number: String,
    /// Title
    pub title: String,
    /// Type
    pub case_type: CaseType,
    /// Workflow status
    pub status: CaseStatus,
    /// Priority
    pub priority: CasePriority,
    /// When the incident happened, if known
    pub incident_date: Option<DateTime<Utc>>,
}

impl From<&Case> for CaseSummary {
    fn from(case: &Case) -> Self {
        Self {
            id: case.id,
            case_number: case.case_number.clone(),
            title: case.title.clone(),
            case_type: case.case_type,
            status: case.status,
            priority: case.priority,
            incident_date: case.incident_date,
        }
    }
}

/// A case sharing participants with another
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelatedCase {
    /// The related case
    pub case: CaseSummary,
    /// Number of shared participants
    pub shared_persons: usize,
    /// The shared participants, ascending
    pub shared_person_ids: Vec<PersonId>,
}

/// Dashboard counts over all cases
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseStatistics {
    /// Number of cases
    pub total: usize,
    /// Count per status, every status present
    pub by_status: BTreeMap<CaseStatus, usize>,
    /// Count per priority, every priority present
    pub by_priority: BTreeMap<CasePriority, usize>,
    /// Count per type, every type present
    pub by_type: BTreeMap<CaseType, usize>,
    /// Cases created within the recent window
    pub recent: usize,
    /// Length of the recent window in days
    pub recent_days: u32,
    /// Open cases
    pub open_count: usize,
    /// Cases in progress
    pub in_progress_count: usize,
    /// Urgent cases
    pub urgent_count: usize,
}

/// A person on the dashboard watch list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WatchedPerson {
    /// Person id
    pub id: PersonId,
    /// Full name
    pub name: String,
    /// Assessed risk level
    pub risk_level: RiskLevel,
    /// Age on the dashboard date, if the birth date is known
    pub age: Option<u32>,
}

/// Case statistics plus the short lists shown beside them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    /// Counts over all cases
    pub statistics: CaseStatistics,
    /// Newest cases first
    pub recent_cases: Vec<CaseSummary>,
    /// Persons at high risk or above, riskiest first
    pub high_risk_persons: Vec<WatchedPerson>,
    /// Urgent cases that are still open
    pub urgent_open_cases: usize,
}

fn zeroed<K: Ord + Copy>(keys: &[K]) -> BTreeMap<K, usize> {
    keys.iter().map(|k| (*k, 0)).collect()
}

impl Analyzer {
    /// Other cases sharing at least one participant with `case_id`
    ///
    /// Ordered by shared participant count descending, then case creation
    /// order; at most `limit` results (the configured default when `None`).
    pub fn related_cases<S>(
        &self,
        store: &S,
        case_id: CaseId,
        limit: Option<usize>,
    ) -> Result<Vec<RelatedCase>, AnalyticsError>
    where
        S: CaseStore,
        S::Error: Display,
    {
        if store.get_case(case_id).map_err(data_access)?.is_none() {
            return Err(AnalyticsError::NotFound(format!("case {}", case_id)));
        }
        let limit = limit.unwrap_or(self.config.related_cases_limit);

        let participants: BTreeSet<PersonId> = store
            .involvements(&InvolvementQuery::for_cases(vec![case_id]))
            .map_err(data_access)?
            .iter()
            .map(|i| i.person())
            .collect();
        if participants.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let mut shared: HashMap<CaseId, BTreeSet<PersonId>> = HashMap::new();
        let involvements = store
            .involvements(&InvolvementQuery::for_persons(participants.into_iter().collect()))
            .map_err(data_access)?;
        for inv in involvements.iter().filter(|i| i.case() != case_id) {
            shared.entry(inv.case()).or_default().insert(inv.person());
        }

        let cases = store.cases(&CaseQuery::default()).map_err(data_access)?;
        let mut related: Vec<(usize, RelatedCase)> = cases
            .iter()
            .enumerate()
            .filter_map(|(position, case)| {
                let persons = shared.remove(&case.id)?;
                Some((
                    position,
                    RelatedCase {
                        case: CaseSummary::from(case),
                        shared_persons: persons.len(),
                        shared_person_ids: persons.into_iter().collect(),
                    },
                ))
            })
            .collect();

        related.sort_by(|(pa, a), (pb, b)| b.shared_persons.cmp(&a.shared_persons).then(pa.cmp(pb)));
        related.truncate(limit);

        tracing::debug!(case = %case_id, related = related.len(), "related cases");
        Ok(related.into_iter().map(|(_, r)| r).collect())
    }

    /// Counts by status, priority and type, plus cases created recently
    ///
    /// `now` anchors the recent window of `recent_case_days`.
    pub fn case_statistics<S>(&self, store: &S, now: DateTime<Utc>) -> Result<CaseStatistics, AnalyticsError>
    where
        S: CaseStore,
        S::Error: Display,
    {
        let cases = store.cases(&CaseQuery::default()).map_err(data_access)?;
        Ok(self.tally(&cases, now))
    }

    /// Statistics, newest cases, high-risk persons and the urgent-open count
    ///
    /// Two store round trips: all cases, then all persons.
    pub fn dashboard<S>(&self, store: &S, now: DateTime<Utc>) -> Result<Dashboard, AnalyticsError>
    where
        S: CaseStore,
        S::Error: Display,
    {
        let cases = store.cases(&CaseQuery::default()).map_err(data_access)?;
        let statistics = self.tally(&cases, now);

        let urgent_open_cases = cases
            .iter()
            .filter(|c| c.priority == CasePriority::Urgent && c.status == CaseStatus::Open)
            .count();

        let mut newest: Vec<&Case> = cases.iter().collect();
        newest.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let recent_cases = newest
            .into_iter()
            .take(DASHBOARD_LIST_LEN)
            .map(CaseSummary::from)
            .collect();

        let mut risky: Vec<Person> = store
            .persons(None)
            .map_err(data_access)?
            .into_iter()
            .filter(|p| p.risk_level.value() >= HIGH_RISK_LEVEL)
            .collect();
        // stable sort keeps the store's name order within a level
        risky.sort_by(|a, b| b.risk_level.cmp(&a.risk_level));
        let today = now.date_naive();
        let high_risk_persons = risky
            .into_iter()
            .take(DASHBOARD_LIST_LEN)
            .map(|p| WatchedPerson {
                id: p.id,
                name: p.full_name(),
                risk_level: p.risk_level,
                age: p.age_on(today),
            })
            .collect();

        tracing::debug!(cases = statistics.total, urgent_open = urgent_open_cases, "dashboard");
        Ok(Dashboard {
            statistics,
            recent_cases,
            high_risk_persons,
            urgent_open_cases,
        })
    }

    fn tally(&self, cases: &[Case], now: DateTime<Utc>) -> CaseStatistics {
        let since = now - Duration::days(i64::from(self.config.recent_case_days));

        let mut by_status = zeroed(&CaseStatus::ALL);
        let mut by_priority = zeroed(&CasePriority::ALL);
        let mut by_type = zeroed(&CaseType::ALL);
        let mut recent = 0;

        for case in cases {
            *by_status.entry(case.status).or_default() += 1;
            *by_priority.entry(case.priority).or_default() += 1;
            *by_type.entry(case.case_type).or_default() += 1;
            if case.created_at >= since {
                recent += 1;
            }
        }

        CaseStatistics {
            total: cases.len(),
            open_count: by_status[&CaseStatus::Open],
            in_progress_count: by_status[&CaseStatus::InProgress],
            urgent_count: by_priority[&CasePriority::Urgent],
            by_status,
            by_priority,
            by_type,
            recent,
            recent_days: self.config.recent_case_days,
        }
    }
}
