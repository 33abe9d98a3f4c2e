//! Trait definitions for external interactions
//!
//! These traits define the boundary between the analytics core and whatever
//! holds the case data. Implementations live in other crates.

use crate::{
    Case, CaseId, CaseInvolvement, CaseType, InvolvementType, Person, PersonId, Relationship,
    TimelineEntry,
};
use chrono::{DateTime, Utc};

/// Read-only access to case data
///
/// Implemented by the infrastructure layer (casegraph-store).
///
/// Every method is expected to cost one round trip to the backing store,
/// whatever the size of the id sets passed in. Callers batch their lookups
/// through the `Option<Vec<_>>` filters rather than looping over single ids.
pub trait CaseStore {
    /// Error type for store operations
    type Error;

    /// Get a person by ID
    fn get_person(&self, id: PersonId) -> Result<Option<Person>, Self::Error>;

    /// Get persons by ID set, or every person when `ids` is `None`
    ///
    /// Ordered by last name, first name, then id. Unknown ids are skipped.
    fn persons(&self, ids: Option<&[PersonId]>) -> Result<Vec<Person>, Self::Error>;

    /// Get a case by ID
    fn get_case(&self, id: CaseId) -> Result<Option<Case>, Self::Error>;

    /// Query cases, ordered by creation time then id
    fn cases(&self, query: &CaseQuery) -> Result<Vec<Case>, Self::Error>;

    /// Query relationships, ordered by id
    fn relationships(&self, query: &RelationshipQuery) -> Result<Vec<Relationship>, Self::Error>;

    /// Query involvements joined with case metadata, ordered by id
    fn involvements(&self, query: &InvolvementQuery) -> Result<Vec<CaseInvolvement>, Self::Error>;

    /// Query timeline entries, ordered by datetime then id
    fn timeline(&self, query: &TimelineQuery) -> Result<Vec<TimelineEntry>, Self::Error>;
}

/// Query criteria for retrieving cases
#[derive(Debug, Clone, Default)]
pub struct CaseQuery {
    /// Filter by case type
    pub case_type: Option<CaseType>,

    /// Incident on or after this instant
    pub incident_from: Option<DateTime<Utc>>,

    /// Incident strictly before this instant
    pub incident_to: Option<DateTime<Utc>>,
}

/// Query criteria for retrieving relationships
///
/// Both filters may be combined; an empty query returns every relationship.
#[derive(Debug, Clone, Default)]
pub struct RelationshipQuery {
    /// Keep relationships whose both endpoints are in this set
    pub within: Option<Vec<PersonId>>,

    /// Keep relationships with this person at either end
    pub touching: Option<PersonId>,
}

impl RelationshipQuery {
    /// Relationships among the given persons
    pub fn within(ids: Vec<PersonId>) -> Self {
        Self {
            within: Some(ids),
            ..Default::default()
        }
    }

    /// Relationships of one person
    pub fn touching(id: PersonId) -> Self {
        Self {
            touching: Some(id),
            ..Default::default()
        }
    }
}

/// Query criteria for retrieving involvements
#[derive(Debug, Clone, Default)]
pub struct InvolvementQuery {
    /// Filter by person set
    pub person_ids: Option<Vec<PersonId>>,

    /// Filter by case set
    pub case_ids: Option<Vec<CaseId>>,

    /// Filter by type of the referenced case
    pub case_type: Option<CaseType>,

    /// Filter by role
    pub involvement_type: Option<InvolvementType>,
}

impl InvolvementQuery {
    /// Involvements of the given persons
    pub fn for_persons(ids: Vec<PersonId>) -> Self {
        Self {
            person_ids: Some(ids),
            ..Default::default()
        }
    }

    /// Involvements in the given cases
    pub fn for_cases(ids: Vec<CaseId>) -> Self {
        Self {
            case_ids: Some(ids),
            ..Default::default()
        }
    }
}

/// Query criteria for retrieving timeline entries
#[derive(Debug, Clone, Default)]
pub struct TimelineQuery {
    /// Filter by case
    pub case_id: Option<CaseId>,

    /// Filter by related person
    pub person_id: Option<PersonId>,

    /// Filter by type of the owning case
    pub case_type: Option<CaseType>,
}
