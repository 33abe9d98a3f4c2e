//! Timeline module - dated events recorded against a case

use crate::{CaseId, PersonId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a timeline entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimelineEntryId(pub i64);

/// A single event on a case timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Unique identifier
    pub id: TimelineEntryId,

    /// Case the event belongs to
    pub case: CaseId,

    /// When the event happened
    pub datetime: DateTime<Utc>,

    /// Short title
    pub title: String,

    /// Free-text description
    pub description: String,

    /// Person the event concerns, if any
    pub related_person: Option<PersonId>,
}

impl TimelineEntry {
    /// Create an entry without a related person
    pub fn new(
        id: TimelineEntryId,
        case: CaseId,
        datetime: DateTime<Utc>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id,
            case,
            datetime,
            title: title.into(),
            description: String::new(),
            related_person: None,
        }
    }

    /// Attach the person the event concerns
    pub fn with_person(mut self, person: PersonId) -> Self {
        self.related_person = Some(person);
        self
    }
}
