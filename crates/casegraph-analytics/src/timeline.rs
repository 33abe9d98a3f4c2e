//! Timeline analysis: gaps, per-person history and time-of-day patterns
//!
//! All times are UTC. Weekdays are numbered ISO style, 1 = Monday to
//! 7 = Sunday.

use crate::error::data_access;
use crate::{AnalyticsError, Analyzer};
use casegraph_domain::traits::{CaseStore, TimelineQuery};
use casegraph_domain::{CaseId, CaseType, PersonId, TimelineEntry};
use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;

/// A quiet period between two consecutive events of a case
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineGap {
    /// Time of the earlier event
    pub start: DateTime<Utc>,
    /// Time of the later event
    pub end: DateTime<Utc>,
    /// Length of the gap in hours
    pub duration_hours: f64,
    /// The earlier event
    pub before_event: TimelineEntry,
    /// The later event
    pub after_event: TimelineEntry,
}

/// Event counts by hour of day and weekday
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemporalPatterns {
    /// Hour (0-23) to count; hours without events are absent
    pub by_hour: BTreeMap<u32, usize>,
    /// ISO weekday (1-7) to count; days without events are absent
    pub by_weekday: BTreeMap<u32, usize>,
    /// Busiest hour, the earliest one on ties
    pub peak_hour: Option<u32>,
    /// Busiest weekday, the earliest one on ties
    pub peak_weekday: Option<u32>,
}

fn peak(counts: &BTreeMap<u32, usize>) -> Option<u32> {
    let mut best: Option<(u32, usize)> = None;
    for (&key, &count) in counts {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((key, count));
        }
    }
    best.map(|(key, _)| key)
}

impl Analyzer {
    /// Gaps longer than `threshold_hours` between consecutive events of a case
    ///
    /// `None` uses the configured `timeline_gap_hours`. A gap of exactly the
    /// threshold is not reported.
    pub fn timeline_gaps<S>(
        &self,
        store: &S,
        case_id: CaseId,
        threshold_hours: Option<u32>,
    ) -> Result<Vec<TimelineGap>, AnalyticsError>
    where
        S: CaseStore,
        S::Error: Display,
    {
        if store.get_case(case_id).map_err(data_access)?.is_none() {
            return Err(AnalyticsError::NotFound(format!("case {}", case_id)));
        }
        let threshold_hours = threshold_hours.unwrap_or(self.config.timeline_gap_hours);
        let threshold = Duration::hours(i64::from(threshold_hours));

        let entries = store
            .timeline(&TimelineQuery {
                case_id: Some(case_id),
                ..Default::default()
            })
            .map_err(data_access)?;

        let gaps: Vec<TimelineGap> = entries
            .windows(2)
            .filter_map(|pair| {
                let (before, after) = (&pair[0], &pair[1]);
                let elapsed = after.datetime - before.datetime;
                if elapsed <= threshold {
                    return None;
                }
                Some(TimelineGap {
                    start: before.datetime,
                    end: after.datetime,
                    duration_hours: elapsed.num_milliseconds() as f64 / 3_600_000.0,
                    before_event: before.clone(),
                    after_event: after.clone(),
                })
            })
            .collect();

        tracing::debug!(case = %case_id, threshold_hours, events = entries.len(), gaps = gaps.len(), "timeline gaps");
        Ok(gaps)
    }

    /// Every timeline entry that concerns `person_id`, across all cases, oldest first
    pub fn person_timeline<S>(&self, store: &S, person_id: PersonId) -> Result<Vec<TimelineEntry>, AnalyticsError>
    where
        S: CaseStore,
        S::Error: Display,
    {
        self.require_person(store, person_id)?;
        store
            .timeline(&TimelineQuery {
                person_id: Some(person_id),
                ..Default::default()
            })
            .map_err(data_access)
    }

    /// Count events by hour of day and weekday, optionally for one case type
    pub fn temporal_patterns<S>(&self, store: &S, case_type: Option<CaseType>) -> Result<TemporalPatterns, AnalyticsError>
    where
        S: CaseStore,
        S::Error: Display,
    {
        let entries = store
            .timeline(&TimelineQuery {
                case_type,
                ..Default::default()
            })
            .map_err(data_access)?;

        let mut patterns = TemporalPatterns::default();
        for entry in &entries {
            *patterns.by_hour.entry(entry.datetime.hour()).or_default() += 1;
            *patterns
                .by_weekday
                .entry(entry.datetime.weekday().number_from_monday())
                .or_default() += 1;
        }
        patterns.peak_hour = peak(&patterns.by_hour);
        patterns.peak_weekday = peak(&patterns.by_weekday);
        Ok(patterns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{day, MockStore};
    use crate::AnalyticsConfig;
    use casegraph_domain::RiskLevel;

    fn hours(n: i64) -> DateTime<Utc> {
        day(0) + Duration::hours(n)
    }

    #[test]
    fn test_gaps_strictly_above_threshold() {
        let mut store = MockStore::new();
        let case = store.add_case(1, CaseType::Theft);
        store.event(case, hours(0), "reported", None);
        store.event(case, hours(24), "scene visited", None);
        store.event(case, hours(54), "suspect questioned", None);
        store.event(case, hours(55), "statement signed", None);

        let gaps = Analyzer::default_config().timeline_gaps(&store, case, None).unwrap();

        // exactly 24h apart is not a gap
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].start, hours(24));
        assert_eq!(gaps[0].end, hours(54));
        assert!((gaps[0].duration_hours - 30.0).abs() < f64::EPSILON);
        assert_eq!(gaps[0].before_event.title, "scene visited");
        assert_eq!(gaps[0].after_event.title, "suspect questioned");
    }

    #[test]
    fn test_gap_keeps_sub_second_excess() {
        let mut store = MockStore::new();
        let case = store.add_case(1, CaseType::Theft);
        store.event(case, hours(0), "reported", None);
        store.event(case, hours(24) + Duration::milliseconds(500), "scene visited", None);
        store.event(case, hours(30), "suspect questioned", None);
        store.event(case, hours(30) + Duration::milliseconds(900), "statement signed", None);

        let gaps = Analyzer::default_config().timeline_gaps(&store, case, None).unwrap();
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].after_event.title, "scene visited");
        let expected = 24.0 + 0.5 / 3600.0;
        assert!((gaps[0].duration_hours - expected).abs() < 1e-9);

        // a zero threshold reports every positive interval
        let gaps = Analyzer::default_config().timeline_gaps(&store, case, Some(0)).unwrap();
        assert_eq!(gaps.len(), 3);
        assert!((gaps[2].duration_hours - 0.25 / 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_gap_threshold_override() {
        let mut store = MockStore::new();
        let case = store.add_case(1, CaseType::Theft);
        let other = store.add_case(2, CaseType::Theft);
        store.event(case, hours(0), "a", None);
        store.event(case, hours(3), "b", None);
        store.event(other, hours(1), "elsewhere", None);

        let analyzer = Analyzer::default_config();
        assert!(analyzer.timeline_gaps(&store, case, None).unwrap().is_empty());

        let gaps = analyzer.timeline_gaps(&store, case, Some(2)).unwrap();
        assert_eq!(gaps.len(), 1);
        assert!((gaps[0].duration_hours - 3.0).abs() < f64::EPSILON);

        let config = AnalyticsConfig {
            timeline_gap_hours: 1,
            ..Default::default()
        };
        assert_eq!(Analyzer::new(config).timeline_gaps(&store, case, None).unwrap().len(), 1);
    }

    #[test]
    fn test_gaps_unknown_case() {
        let store = MockStore::new();
        let result = Analyzer::default_config().timeline_gaps(&store, CaseId(1), None);
        assert!(matches!(result, Err(AnalyticsError::NotFound(_))));
    }

    #[test]
    fn test_person_timeline_across_cases() {
        let mut store = MockStore::new();
        let p = store.add_person(1, RiskLevel::Low);
        let a = store.add_case(1, CaseType::Theft);
        let b = store.add_case(2, CaseType::Fraud);
        store.event(b, hours(10), "arrested", Some(p));
        store.event(a, hours(2), "seen", Some(p));
        store.event(a, hours(5), "unrelated", None);

        let entries = Analyzer::default_config().person_timeline(&store, p).unwrap();
        let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["seen", "arrested"]);

        let missing = Analyzer::default_config().person_timeline(&store, PersonId(9));
        assert!(matches!(missing, Err(AnalyticsError::NotFound(_))));
    }

    #[test]
    fn test_temporal_patterns_peaks() {
        let mut store = MockStore::new();
        let theft = store.add_case(1, CaseType::Theft);
        let fraud = store.add_case(2, CaseType::Fraud);
        // 2024-01-01 is a Monday
        store.event(theft, hours(9), "a", None);
        store.event(theft, hours(14), "b", None);
        store.event(theft, hours(24 + 9), "c", None);
        store.event(fraud, hours(24 + 14), "d", None);

        let analyzer = Analyzer::default_config();
        let all = analyzer.temporal_patterns(&store, None).unwrap();
        assert_eq!(all.by_hour.get(&9), Some(&2));
        assert_eq!(all.by_hour.get(&14), Some(&2));
        assert_eq!(all.peak_hour, Some(9));
        assert_eq!(all.by_weekday.get(&1), Some(&2));
        assert_eq!(all.by_weekday.get(&2), Some(&2));
        assert_eq!(all.peak_weekday, Some(1));

        let thefts = analyzer.temporal_patterns(&store, Some(CaseType::Theft)).unwrap();
        assert_eq!(thefts.by_hour.get(&14), Some(&1));
        assert_eq!(thefts.peak_hour, Some(9));
    }

    #[test]
    fn test_temporal_patterns_empty() {
        let store = MockStore::new();
        let patterns = Analyzer::default_config().temporal_patterns(&store, None).unwrap();
        assert_eq!(patterns, TemporalPatterns::default());
        assert_eq!(patterns.peak_hour, None);
    }
}
