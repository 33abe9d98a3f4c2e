//! Person module - the nodes of the relationship graph

use crate::DomainError;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a person record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub i64);

impl PersonId {
    /// Get the raw value
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordinal risk assessment attached to a person (0-4)
///
/// Serialized as its numeric level so graph consumers can compare thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RiskLevel {
    /// No known risk
    #[default]
    None,
    /// Low risk
    Low,
    /// Medium risk
    Medium,
    /// High risk
    High,
    /// Very high risk
    VeryHigh,
}

impl RiskLevel {
    /// All levels in ascending order
    pub const ALL: [RiskLevel; 5] = [
        RiskLevel::None,
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::VeryHigh,
    ];

    /// Numeric level (0-4)
    pub fn value(&self) -> u8 {
        match self {
            RiskLevel::None => 0,
            RiskLevel::Low => 1,
            RiskLevel::Medium => 2,
            RiskLevel::High => 3,
            RiskLevel::VeryHigh => 4,
        }
    }

    /// Build a level from its numeric value
    pub fn from_value(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::None => "No risk",
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::VeryHigh => "Very high",
        }
    }
}

impl TryFrom<u8> for RiskLevel {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_value(value).ok_or(DomainError::OutOfRange {
            field: "risk_level",
            min: 0,
            max: 4,
            value: value as i64,
        })
    }
}

impl From<RiskLevel> for u8 {
    fn from(level: RiskLevel) -> Self {
        level.value()
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u8 = s
            .trim()
            .parse()
            .map_err(|_| DomainError::unknown("risk level", s))?;
        Self::try_from(value)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A person tracked by the system
///
/// Identity fields are fixed once the record is created; `risk_level` and
/// `notes` are maintained by investigators over time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    /// Unique identifier
    pub id: PersonId,

    /// Given name
    pub first_name: String,

    /// Family name
    pub last_name: String,

    /// Date of birth, if known
    pub birth_date: Option<NaiveDate>,

    /// Place of birth, if known
    pub birth_place: Option<String>,

    /// National ID / passport number
    pub id_number: Option<String>,

    /// Known aliases, free text
    pub known_aliases: String,

    /// Current risk assessment
    pub risk_level: RiskLevel,

    /// Investigator notes
    pub notes: String,

    /// When the record was created
    pub created_at: DateTime<Utc>,

    /// When the record was last modified
    pub updated_at: DateTime<Utc>,
}

impl Person {
    /// Create a person with only a name; everything else defaults
    pub fn new(id: PersonId, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            birth_date: None,
            birth_place: None,
            id_number: None,
            known_aliases: String::new(),
            risk_level: RiskLevel::None,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the risk level
    pub fn with_risk_level(mut self, risk_level: RiskLevel) -> Self {
        self.risk_level = risk_level;
        self
    }

    /// Set the birth date
    pub fn with_birth_date(mut self, birth_date: NaiveDate) -> Self {
        self.birth_date = Some(birth_date);
        self
    }

    /// "First Last"
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Age in whole years on the given day, if the birth date is known
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        let birth = self.birth_date?;
        let mut age = today.year() - birth.year();
        if (today.month(), today.day()) < (birth.month(), birth.day()) {
            age -= 1;
        }
        u32::try_from(age).ok()
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        let person = Person::new(PersonId(1), "Max", "Mustermann");
        assert_eq!(person.full_name(), "Max Mustermann");
        assert_eq!(person.to_string(), "Max Mustermann");
    }

    #[test]
    fn test_default_risk_level() {
        let person = Person::new(PersonId(1), "Test", "User");
        assert_eq!(person.risk_level, RiskLevel::None);
        assert_eq!(person.risk_level.value(), 0);
    }

    #[test]
    fn test_age_calculation() {
        let person = Person::new(PersonId(1), "Max", "Mustermann")
            .with_birth_date(NaiveDate::from_ymd_opt(1990, 5, 15).unwrap());

        let before_birthday = NaiveDate::from_ymd_opt(2024, 5, 14).unwrap();
        let on_birthday = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
        assert_eq!(person.age_on(before_birthday), Some(33));
        assert_eq!(person.age_on(on_birthday), Some(34));
    }

    #[test]
    fn test_age_none_without_birth_date() {
        let person = Person::new(PersonId(1), "Test", "Person");
        assert!(person.age_on(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).is_none());
    }

    #[test]
    fn test_risk_level_bounds() {
        assert_eq!(RiskLevel::from_value(4), Some(RiskLevel::VeryHigh));
        assert_eq!(RiskLevel::from_value(5), None);
        assert!(RiskLevel::try_from(7).is_err());
        assert!(RiskLevel::High > RiskLevel::Medium);
    }

    #[test]
    fn test_risk_level_parse() {
        assert_eq!("3".parse::<RiskLevel>().unwrap(), RiskLevel::High);
        assert!("high".parse::<RiskLevel>().is_err());
        assert!("9".parse::<RiskLevel>().is_err());
    }

    #[test]
    fn test_risk_level_serializes_as_number() {
        let json = serde_json::to_string(&RiskLevel::High).unwrap();
        assert_eq!(json, "3");
        let parsed: RiskLevel = serde_json::from_str("2").unwrap();
        assert_eq!(parsed, RiskLevel::Medium);
        assert!(serde_json::from_str::<RiskLevel>("8").is_err());
    }
}
