//! Relationship module - directed, typed edges between persons

use crate::{DomainError, PersonId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum relationship strength
pub const MIN_STRENGTH: u8 = 1;

/// Maximum relationship strength
pub const MAX_STRENGTH: u8 = 5;

/// Identifier of a relationship record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipId(pub i64);

impl fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Type of relationship between two persons
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    /// Relatives
    Family,
    /// Friends
    Friend,
    /// Work colleagues
    Colleague,
    /// Neighbours
    Neighbor,
    /// Acquaintances / business associates
    Associate,
    /// Suspicious connection
    Suspect,
    /// Victim connection
    Victim,
    /// Witness connection
    Witness,
    /// Anything else
    Other,
}

impl RelationshipType {
    /// All relationship types in declaration order
    pub const ALL: [RelationshipType; 9] = [
        RelationshipType::Family,
        RelationshipType::Friend,
        RelationshipType::Colleague,
        RelationshipType::Neighbor,
        RelationshipType::Associate,
        RelationshipType::Suspect,
        RelationshipType::Victim,
        RelationshipType::Witness,
        RelationshipType::Other,
    ];

    /// Storage key
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::Family => "family",
            RelationshipType::Friend => "friend",
            RelationshipType::Colleague => "colleague",
            RelationshipType::Neighbor => "neighbor",
            RelationshipType::Associate => "associate",
            RelationshipType::Suspect => "suspect",
            RelationshipType::Victim => "victim",
            RelationshipType::Witness => "witness",
            RelationshipType::Other => "other",
        }
    }

    /// Display label, used as the edge label in graph views
    pub fn label(&self) -> &'static str {
        match self {
            RelationshipType::Family => "Family",
            RelationshipType::Friend => "Friend",
            RelationshipType::Colleague => "Colleague",
            RelationshipType::Neighbor => "Neighbor",
            RelationshipType::Associate => "Associate",
            RelationshipType::Suspect => "Suspect",
            RelationshipType::Victim => "Victim",
            RelationshipType::Witness => "Witness",
            RelationshipType::Other => "Other",
        }
    }

    /// Parse a storage key (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        let key = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == key)
    }
}

impl std::str::FromStr for RelationshipType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| DomainError::unknown("relationship type", s))
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed relationship `person1 -> person2`
///
/// At most one relationship exists per (person1, person2, type); the store
/// enforces this with a unique index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Unique identifier
    pub id: RelationshipId,

    /// Source person
    pub person1: PersonId,

    /// Target person
    pub person2: PersonId,

    /// Type of relationship
    pub relationship_type: RelationshipType,

    /// Free-text description
    pub description: String,

    /// Strength of the tie [1, 5]
    pub strength: u8,

    /// Known since
    pub start_date: Option<NaiveDate>,

    /// Known until
    pub end_date: Option<NaiveDate>,
}

impl Relationship {
    /// Create a new relationship
    ///
    /// Fails when `strength` is outside [1, 5].
    pub fn new(
        id: RelationshipId,
        person1: PersonId,
        person2: PersonId,
        relationship_type: RelationshipType,
        strength: u8,
    ) -> Result<Self, DomainError> {
        validate_strength(strength)?;

        Ok(Self {
            id,
            person1,
            person2,
            relationship_type,
            description: String::new(),
            strength,
            start_date: None,
            end_date: None,
        })
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Whether the person is either endpoint
    pub fn touches(&self, person: PersonId) -> bool {
        self.person1 == person || self.person2 == person
    }
}

/// Check a strength value against [`MIN_STRENGTH`, `MAX_STRENGTH`]
pub fn validate_strength(strength: u8) -> Result<(), DomainError> {
    if !(MIN_STRENGTH..=MAX_STRENGTH).contains(&strength) {
        return Err(DomainError::OutOfRange {
            field: "strength",
            min: MIN_STRENGTH as i64,
            max: MAX_STRENGTH as i64,
            value: strength as i64,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relationship_creation() {
        let rel = Relationship::new(
            RelationshipId(1),
            PersonId(1),
            PersonId(2),
            RelationshipType::Friend,
            3,
        )
        .unwrap();
        assert_eq!(rel.strength, 3);
        assert!(rel.touches(PersonId(2)));
        assert!(!rel.touches(PersonId(3)));
    }

    #[test]
    fn test_strength_bounds() {
        for strength in [0u8, 6, 255] {
            let result = Relationship::new(
                RelationshipId(1),
                PersonId(1),
                PersonId(2),
                RelationshipType::Friend,
                strength,
            );
            assert!(result.is_err(), "strength {} should be rejected", strength);
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(RelationshipType::Colleague.label(), "Colleague");
        assert_eq!(RelationshipType::parse("Neighbor"), Some(RelationshipType::Neighbor));
        assert!(RelationshipType::parse("enemy").is_none());
    }
}
