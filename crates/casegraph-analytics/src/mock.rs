//! In-memory CaseStore for unit tests

use casegraph_domain::traits::{
    CaseQuery, CaseStore, InvolvementQuery, RelationshipQuery, TimelineQuery,
};
use casegraph_domain::{
    Case, CaseId, CaseInvolvement, CaseType, Involvement, InvolvementId, InvolvementType, Person,
    PersonId, Relationship, RelationshipId, RelationshipType, RiskLevel, TimelineEntry,
    TimelineEntryId,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::cell::Cell;

pub(crate) fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
}

#[derive(Default)]
pub(crate) struct MockStore {
    pub persons: Vec<Person>,
    pub cases: Vec<Case>,
    pub relationships: Vec<Relationship>,
    pub involvements: Vec<Involvement>,
    pub timeline: Vec<TimelineEntry>,
    pub fail: bool,
    pub calls: Cell<usize>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_person(&mut self, id: i64, risk: RiskLevel) -> PersonId {
        let person = Person::new(PersonId(id), "P", format!("{:03}", id)).with_risk_level(risk);
        self.persons.push(person);
        PersonId(id)
    }

    /// Case created on day `id`
    pub fn add_case(&mut self, id: i64, case_type: CaseType) -> CaseId {
        let case = Case::new(CaseId(id), format!("C-{}", id), format!("Case {}", id), case_type)
            .with_created_at(day(id))
            .with_incident_date(day(id));
        self.cases.push(case);
        CaseId(id)
    }

    pub fn relate(&mut self, from: PersonId, to: PersonId, strength: u8) {
        let id = RelationshipId(self.relationships.len() as i64 + 1);
        let rel = Relationship::new(id, from, to, RelationshipType::Associate, strength).unwrap();
        self.relationships.push(rel);
    }

    pub fn involve(&mut self, person: PersonId, case: CaseId, role: InvolvementType) {
        let id = InvolvementId(self.involvements.len() as i64 + 1);
        self.involvements.push(Involvement::new(id, person, case, role));
    }

    pub fn event(&mut self, case: CaseId, at: DateTime<Utc>, title: &str, person: Option<PersonId>) {
        let id = TimelineEntryId(self.timeline.len() as i64 + 1);
        let mut entry = TimelineEntry::new(id, case, at, title);
        entry.related_person = person;
        self.timeline.push(entry);
    }

    fn enter(&self) -> Result<(), String> {
        self.calls.set(self.calls.get() + 1);
        if self.fail {
            return Err("connection lost".to_string());
        }
        Ok(())
    }

    fn case_type_of(&self, id: CaseId) -> Option<CaseType> {
        self.cases.iter().find(|c| c.id == id).map(|c| c.case_type)
    }
}

impl CaseStore for MockStore {
    type Error = String;

    fn get_person(&self, id: PersonId) -> Result<Option<Person>, Self::Error> {
        self.enter()?;
        Ok(self.persons.iter().find(|p| p.id == id).cloned())
    }

    fn persons(&self, ids: Option<&[PersonId]>) -> Result<Vec<Person>, Self::Error> {
        self.enter()?;
        let mut results: Vec<Person> = self
            .persons
            .iter()
            .filter(|p| ids.map_or(true, |ids| ids.contains(&p.id)))
            .cloned()
            .collect();
        results.sort_by(|a, b| {
            (&a.last_name, &a.first_name, a.id).cmp(&(&b.last_name, &b.first_name, b.id))
        });
        Ok(results)
    }

    fn get_case(&self, id: CaseId) -> Result<Option<Case>, Self::Error> {
        self.enter()?;
        Ok(self.cases.iter().find(|c| c.id == id).cloned())
    }

    fn cases(&self, query: &CaseQuery) -> Result<Vec<Case>, Self::Error> {
        self.enter()?;
        let mut results: Vec<Case> = self
            .cases
            .iter()
            .filter(|c| query.case_type.map_or(true, |t| c.case_type == t))
            .cloned()
            .collect();
        results.sort_by_key(|c| (c.created_at, c.id));
        Ok(results)
    }

    fn relationships(&self, query: &RelationshipQuery) -> Result<Vec<Relationship>, Self::Error> {
        self.enter()?;
        Ok(self
            .relationships
            .iter()
            .filter(|r| {
                query
                    .within
                    .as_ref()
                    .map_or(true, |ids| ids.contains(&r.person1) && ids.contains(&r.person2))
            })
            .filter(|r| query.touching.map_or(true, |p| r.touches(p)))
            .cloned()
            .collect())
    }

    fn involvements(&self, query: &InvolvementQuery) -> Result<Vec<CaseInvolvement>, Self::Error> {
        self.enter()?;
        let mut results = Vec::new();
        for inv in &self.involvements {
            if let Some(ids) = &query.person_ids {
                if !ids.contains(&inv.person) {
                    continue;
                }
            }
            if let Some(ids) = &query.case_ids {
                if !ids.contains(&inv.case) {
                    continue;
                }
            }
            if let Some(role) = query.involvement_type {
                if inv.involvement_type != role {
                    continue;
                }
            }
            let Some(case) = self.cases.iter().find(|c| c.id == inv.case) else {
                continue;
            };
            if let Some(case_type) = query.case_type {
                if case.case_type != case_type {
                    continue;
                }
            }
            results.push(CaseInvolvement {
                involvement: inv.clone(),
                case_type: case.case_type,
                incident_date: case.incident_date,
            });
        }
        Ok(results)
    }

    fn timeline(&self, query: &TimelineQuery) -> Result<Vec<TimelineEntry>, Self::Error> {
        self.enter()?;
        let mut results: Vec<TimelineEntry> = self
            .timeline
            .iter()
            .filter(|e| query.case_id.map_or(true, |c| e.case == c))
            .filter(|e| query.person_id.map_or(true, |p| e.related_person == Some(p)))
            .filter(|e| {
                query
                    .case_type
                    .map_or(true, |t| self.case_type_of(e.case) == Some(t))
            })
            .cloned()
            .collect();
        results.sort_by_key(|e| (e.datetime, e.id));
        Ok(results)
    }
}
