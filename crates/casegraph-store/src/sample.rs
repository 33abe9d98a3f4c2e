//! Demo dataset
//!
//! A small investigative dataset: eight persons, a chain of relationships,
//! nineteen cases across every case type, involvements that link most persons
//! to several cases, and timelines for a burglary, a fraud and an assault.
//! Every value is fixed so repeated loads produce the same database.

use crate::{SqliteStore, StoreError};
use casegraph_domain::{
    Case, CaseId, CasePriority, CaseStatus, CaseType, Involvement, InvolvementId, InvolvementType,
    Person, PersonId, Relationship, RelationshipId, RelationshipType, RiskLevel, TimelineEntry,
    TimelineEntryId,
};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

/// Counts of the records written by [`load_sample_data`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleSummary {
    /// Persons inserted
    pub persons: usize,
    /// Relationships inserted
    pub relationships: usize,
    /// Cases inserted
    pub cases: usize,
    /// Involvements inserted
    pub involvements: usize,
    /// Timeline entries inserted
    pub timeline_entries: usize,
}

const PERSONS: [(&str, &str, (i32, u32, u32), RiskLevel); 8] = [
    ("Max", "Mustermann", (1985, 3, 15), RiskLevel::Medium),
    ("Anna", "Schmidt", (1992, 7, 22), RiskLevel::Low),
    ("Peter", "Müller", (1978, 11, 30), RiskLevel::High),
    ("Lisa", "Weber", (1990, 5, 10), RiskLevel::None),
    ("Michael", "Fischer", (1982, 9, 8), RiskLevel::VeryHigh),
    ("Sarah", "Wagner", (1995, 12, 1), RiskLevel::Medium),
    ("Thomas", "Bauer", (1975, 4, 18), RiskLevel::Low),
    ("Julia", "Richter", (1988, 8, 25), RiskLevel::None),
];

const RELATIONSHIPS: [(usize, usize, RelationshipType, u8, &str); 6] = [
    (0, 1, RelationshipType::Friend, 3, "Know each other from school"),
    (1, 2, RelationshipType::Colleague, 4, "Work at the same company"),
    (2, 3, RelationshipType::Family, 5, "Siblings"),
    (3, 4, RelationshipType::Neighbor, 2, "Live next door"),
    (4, 5, RelationshipType::Associate, 4, "Business partners"),
    (0, 2, RelationshipType::Suspect, 3, "Suspicious connection"),
];

const CASES: [(&str, &str, CaseType, CaseStatus, CasePriority, &str); 19] = [
    ("2024-001", "Burglary Hauptstraße", CaseType::Theft, CaseStatus::Open, CasePriority::High, "Berlin"),
    ("2024-005", "Shoplifting department store", CaseType::Theft, CaseStatus::Closed, CasePriority::Low, "Hamburg"),
    ("2024-012", "Bicycle theft at the station", CaseType::Theft, CaseStatus::InProgress, CasePriority::Medium, "München"),
    ("2024-018", "Jeweller break-in", CaseType::Theft, CaseStatus::Open, CasePriority::Urgent, "Köln"),
    ("2024-023", "Car theft from parking garage", CaseType::Theft, CaseStatus::InProgress, CasePriority::High, "Frankfurt"),
    ("2024-029", "Pickpocketing at the market", CaseType::Theft, CaseStatus::Closed, CasePriority::Low, "Berlin"),
    ("2024-034", "Cellar break-ins", CaseType::Theft, CaseStatus::Open, CasePriority::Medium, "Hamburg"),
    ("2024-041", "Construction site theft", CaseType::Theft, CaseStatus::InProgress, CasePriority::High, "München"),
    ("2024-002", "Classified ads fraud", CaseType::Fraud, CaseStatus::InProgress, CasePriority::Medium, "Hamburg"),
    ("2024-008", "Credit card fraud", CaseType::Fraud, CaseStatus::Open, CasePriority::High, "München"),
    ("2024-015", "Grandparent scam", CaseType::Fraud, CaseStatus::Closed, CasePriority::Medium, "Köln"),
    ("2024-021", "Online payment fraud", CaseType::Fraud, CaseStatus::InProgress, CasePriority::Low, "Frankfurt"),
    ("2024-027", "Insurance fraud", CaseType::Fraud, CaseStatus::Open, CasePriority::High, "Berlin"),
    ("2024-032", "Investment fraud", CaseType::Fraud, CaseStatus::InProgress, CasePriority::Urgent, "Hamburg"),
    ("2024-003", "Assault at the station", CaseType::Assault, CaseStatus::Closed, CasePriority::High, "München"),
    ("2024-004", "Drug dealing Musterweg", CaseType::Drug, CaseStatus::Open, CasePriority::High, "Köln"),
    ("2024-006", "Motorway hit and run", CaseType::Traffic, CaseStatus::Open, CasePriority::High, "Berlin"),
    ("2024-007", "Domestic violence", CaseType::Domestic, CaseStatus::InProgress, CasePriority::Urgent, "München"),
    ("2024-011", "Vandalism in the park", CaseType::Other, CaseStatus::Suspended, CasePriority::Low, "Köln"),
];

const INVOLVEMENTS: [(usize, usize, InvolvementType, u8); 24] = [
    (0, 0, InvolvementType::Suspect, 4),
    (1, 0, InvolvementType::Witness, 5),
    (2, 1, InvolvementType::Victim, 3),
    (3, 1, InvolvementType::Suspect, 2),
    (4, 2, InvolvementType::Suspect, 4),
    (5, 3, InvolvementType::Informant, 3),
    (6, 4, InvolvementType::Witness, 4),
    (7, 5, InvolvementType::Victim, 5),
    (0, 6, InvolvementType::Suspect, 3),
    (1, 7, InvolvementType::Witness, 2),
    (2, 8, InvolvementType::Victim, 4),
    (3, 9, InvolvementType::Suspect, 3),
    (4, 10, InvolvementType::Informant, 2),
    (5, 11, InvolvementType::Witness, 3),
    (6, 12, InvolvementType::Victim, 5),
    (7, 13, InvolvementType::Suspect, 4),
    (4, 14, InvolvementType::Suspect, 4),
    (2, 14, InvolvementType::Victim, 3),
    (4, 15, InvolvementType::Suspect, 3),
    (0, 15, InvolvementType::Witness, 2),
    (6, 16, InvolvementType::Suspect, 4),
    (2, 17, InvolvementType::Suspect, 3),
    (3, 17, InvolvementType::Victim, 5),
    (5, 18, InvolvementType::Suspect, 2),
];

/// (case index, days before anchor, hours before that, title, description, person index)
const TIMELINE: [(usize, i64, i64, &str, &str, Option<usize>); 12] = [
    (0, 5, 2, "Burglary reported", "Call to the police at 14:30", Some(1)),
    (0, 4, 10, "Scene inspected", "Forensics collected traces on site", None),
    (0, 3, 16, "Witness questioned", "Detailed interview with the neighbour", Some(1)),
    (0, 2, 8, "Suspect identified", "Fingerprints lead to a suspect", Some(0)),
    (8, 7, 12, "Fraud complaint received", "Online fraud reported by e-mail", Some(2)),
    (8, 6, 9, "E-mail traffic analysed", "Digital traces examined", None),
    (8, 5, 15, "Suspect traced", "IP address traced back", Some(3)),
    (8, 4, 11, "House searched", "Computer and documents seized", None),
    (14, 3, 22, "Fight reported", "Emergency call from passers-by", None),
    (14, 3, 21, "Police on scene", "First aid and arrest", Some(4)),
    (14, 2, 14, "Interrogation", "Offender and victim questioned", Some(4)),
    (14, 1, 10, "Case closed", "Charges filed", None),
];

/// Fixed "now" the dataset is laid out around
pub fn sample_anchor() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Populate an empty store with the demo dataset
///
/// Fails with [`StoreError::Duplicate`] when the store already holds persons
/// or cases. Everything is written in one transaction.
pub fn load_sample_data(store: &mut SqliteStore) -> Result<SampleSummary, StoreError> {
    if !store.is_empty()? {
        return Err(StoreError::Duplicate(
            "store already contains data".to_string(),
        ));
    }

    store.in_transaction(|store| {
        let anchor = sample_anchor();
        let mut summary = SampleSummary::default();

        let mut persons = Vec::with_capacity(PERSONS.len());
        for (first, last, (y, m, d), risk) in PERSONS {
            let mut person = Person::new(PersonId(0), first, last).with_risk_level(risk);
            if let Some(birth) = NaiveDate::from_ymd_opt(y, m, d) {
                person = person.with_birth_date(birth);
            }
            person.created_at = anchor - Duration::days(120);
            person.updated_at = person.created_at;
            persons.push(store.insert_person(&person)?);
            summary.persons += 1;
        }

        for (from, to, rel_type, strength, description) in RELATIONSHIPS {
            let rel = Relationship::new(
                RelationshipId(0),
                persons[from],
                persons[to],
                rel_type,
                strength,
            )?
            .with_description(description);
            store.add_relationship(&rel)?;
            summary.relationships += 1;
        }

        let mut cases = Vec::with_capacity(CASES.len());
        for (i, (number, title, case_type, status, priority, city)) in CASES.into_iter().enumerate() {
            let offset = i as i64;
            let mut case = Case::new(CaseId(0), number, title, case_type)
                .with_status(status)
                .with_priority(priority)
                .with_incident_date(anchor - Duration::days((offset * 37) % 90 + 1))
                .with_created_at(anchor - Duration::days(60) + Duration::days(offset * 3));
            case.location = Some(city.to_string());
            cases.push(store.insert_case(&case)?);
            summary.cases += 1;
        }

        for (person, case, role, credibility) in INVOLVEMENTS {
            let mut inv = Involvement::new(InvolvementId(0), persons[person], cases[case], role)
                .with_credibility(credibility)?;
            inv.description = format!("{} in case {}", role.label(), CASES[case].0);
            store.add_involvement(&inv)?;
            summary.involvements += 1;
        }

        for (case, days, hours, title, description, person) in TIMELINE {
            let at = anchor - Duration::days(days) - Duration::hours(hours);
            let mut entry = TimelineEntry::new(TimelineEntryId(0), cases[case], at, title);
            entry.description = description.to_string();
            if let Some(p) = person {
                entry = entry.with_person(persons[p]);
            }
            store.add_timeline_entry(&entry)?;
            summary.timeline_entries += 1;
        }

        tracing::info!(
            persons = summary.persons,
            cases = summary.cases,
            involvements = summary.involvements,
            "loaded sample data"
        );
        Ok(summary)
    })
}
