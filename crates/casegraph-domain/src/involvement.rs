//! Involvement module - the role a person plays in a case

use crate::{CaseId, CaseType, DomainError, PersonId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default credibility assigned to a new involvement
pub const DEFAULT_CREDIBILITY: u8 = 3;

/// Identifier of an involvement record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvolvementId(pub i64);

/// Role of a person within a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvolvementType {
    /// Suspected offender
    Suspect,
    /// Victim
    Victim,
    /// Witness
    Witness,
    /// Informant
    Informant,
    /// Anything else
    Other,
}

impl InvolvementType {
    /// All roles in declaration order
    pub const ALL: [InvolvementType; 5] = [
        InvolvementType::Suspect,
        InvolvementType::Victim,
        InvolvementType::Witness,
        InvolvementType::Informant,
        InvolvementType::Other,
    ];

    /// Storage key
    pub fn as_str(&self) -> &'static str {
        match self {
            InvolvementType::Suspect => "suspect",
            InvolvementType::Victim => "victim",
            InvolvementType::Witness => "witness",
            InvolvementType::Informant => "informant",
            InvolvementType::Other => "other",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            InvolvementType::Suspect => "Suspect",
            InvolvementType::Victim => "Victim",
            InvolvementType::Witness => "Witness",
            InvolvementType::Informant => "Informant",
            InvolvementType::Other => "Other",
        }
    }

    /// Parse a storage key (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        let key = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == key)
    }
}

impl std::str::FromStr for InvolvementType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| DomainError::unknown("involvement type", s))
    }
}

impl fmt::Display for InvolvementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Association between a person and a case
///
/// Unique per (person, case, involvement_type): the same person may appear in
/// one case under several roles, but never twice under the same role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Involvement {
    /// Unique identifier
    pub id: InvolvementId,

    /// Involved person
    pub person: PersonId,

    /// Case the person is involved in
    pub case: CaseId,

    /// Role within the case
    pub involvement_type: InvolvementType,

    /// Free-text description
    pub description: String,

    /// Credibility rating [1, 5]
    pub credibility: u8,
}

impl Involvement {
    /// Create an involvement with default credibility
    pub fn new(
        id: InvolvementId,
        person: PersonId,
        case: CaseId,
        involvement_type: InvolvementType,
    ) -> Self {
        Self {
            id,
            person,
            case,
            involvement_type,
            description: String::new(),
            credibility: DEFAULT_CREDIBILITY,
        }
    }

    /// Set the credibility rating, rejecting values outside [1, 5]
    pub fn with_credibility(mut self, credibility: u8) -> Result<Self, DomainError> {
        if !(1..=5).contains(&credibility) {
            return Err(DomainError::OutOfRange {
                field: "credibility",
                min: 1,
                max: 5,
                value: credibility as i64,
            });
        }
        self.credibility = credibility;
        Ok(self)
    }

    /// Whether this involvement marks the person as a suspect
    pub fn is_suspect(&self) -> bool {
        self.involvement_type == InvolvementType::Suspect
    }
}

/// An involvement joined with the metadata of its case
///
/// This is the row shape returned by batch involvement queries so analytics
/// never need a second lookup per case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseInvolvement {
    /// The involvement record
    pub involvement: Involvement,

    /// Type of the referenced case
    pub case_type: CaseType,

    /// Incident date of the referenced case
    pub incident_date: Option<DateTime<Utc>>,
}

impl CaseInvolvement {
    /// Involved person
    pub fn person(&self) -> PersonId {
        self.involvement.person
    }

    /// Referenced case
    pub fn case(&self) -> CaseId {
        self.involvement.case
    }

    /// Role within the case
    pub fn role(&self) -> InvolvementType {
        self.involvement.involvement_type
    }
}
