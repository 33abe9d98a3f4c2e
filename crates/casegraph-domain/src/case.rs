//! Case module - investigation units

use crate::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a case record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseId(pub i64);

impl CaseId {
    /// Get the raw value
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Offence category of a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseType {
    /// Theft and burglary
    Theft,
    /// Fraud
    Fraud,
    /// Assault / bodily harm
    Assault,
    /// Narcotics
    Drug,
    /// Traffic offences
    Traffic,
    /// Domestic violence
    Domestic,
    /// Anything else
    Other,
}

impl CaseType {
    /// All case types in declaration order
    pub const ALL: [CaseType; 7] = [
        CaseType::Theft,
        CaseType::Fraud,
        CaseType::Assault,
        CaseType::Drug,
        CaseType::Traffic,
        CaseType::Domestic,
        CaseType::Other,
    ];

    /// Storage key
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseType::Theft => "theft",
            CaseType::Fraud => "fraud",
            CaseType::Assault => "assault",
            CaseType::Drug => "drug",
            CaseType::Traffic => "traffic",
            CaseType::Domestic => "domestic",
            CaseType::Other => "other",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            CaseType::Theft => "Theft",
            CaseType::Fraud => "Fraud",
            CaseType::Assault => "Assault",
            CaseType::Drug => "Narcotics",
            CaseType::Traffic => "Traffic",
            CaseType::Domestic => "Domestic violence",
            CaseType::Other => "Other",
        }
    }

    /// Parse a storage key (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        let key = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == key)
    }
}

impl std::str::FromStr for CaseType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| DomainError::unknown("case type", s))
    }
}

impl fmt::Display for CaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workflow status of a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    /// Newly opened
    Open,
    /// Actively worked
    InProgress,
    /// Concluded
    Closed,
    /// On hold
    Suspended,
}

impl CaseStatus {
    /// All statuses in declaration order
    pub const ALL: [CaseStatus; 4] = [
        CaseStatus::Open,
        CaseStatus::InProgress,
        CaseStatus::Closed,
        CaseStatus::Suspended,
    ];

    /// Storage key
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Open => "open",
            CaseStatus::InProgress => "in_progress",
            CaseStatus::Closed => "closed",
            CaseStatus::Suspended => "suspended",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            CaseStatus::Open => "Open",
            CaseStatus::InProgress => "In progress",
            CaseStatus::Closed => "Closed",
            CaseStatus::Suspended => "Suspended",
        }
    }

    /// Parse a storage key (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        let key = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == key)
    }
}

impl std::str::FromStr for CaseStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| DomainError::unknown("case status", s))
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handling priority of a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CasePriority {
    /// Low
    Low,
    /// Medium (default)
    Medium,
    /// High
    High,
    /// Urgent
    Urgent,
}

impl CasePriority {
    /// All priorities in ascending order
    pub const ALL: [CasePriority; 4] = [
        CasePriority::Low,
        CasePriority::Medium,
        CasePriority::High,
        CasePriority::Urgent,
    ];

    /// Storage key
    pub fn as_str(&self) -> &'static str {
        match self {
            CasePriority::Low => "low",
            CasePriority::Medium => "medium",
            CasePriority::High => "high",
            CasePriority::Urgent => "urgent",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            CasePriority::Low => "Low",
            CasePriority::Medium => "Medium",
            CasePriority::High => "High",
            CasePriority::Urgent => "Urgent",
        }
    }

    /// Parse a storage key (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        let key = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == key)
    }
}

impl std::str::FromStr for CasePriority {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| DomainError::unknown("case priority", s))
    }
}

impl fmt::Display for CasePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An investigation case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    /// Unique identifier
    pub id: CaseId,

    /// File number, unique per case (e.g. "2024-001")
    pub case_number: String,

    /// Short title
    pub title: String,

    /// Free-text description
    pub description: String,

    /// Offence category
    pub case_type: CaseType,

    /// Workflow status
    pub status: CaseStatus,

    /// Handling priority
    pub priority: CasePriority,

    /// When the incident happened, if known
    pub incident_date: Option<DateTime<Utc>>,

    /// When the case was reported
    pub reported_date: DateTime<Utc>,

    /// Incident location (display form of the address)
    pub location: Option<String>,

    /// When the record was created; defines the stable case order
    pub created_at: DateTime<Utc>,
}

impl Case {
    /// Create an open, medium-priority case
    pub fn new(
        id: CaseId,
        case_number: impl Into<String>,
        title: impl Into<String>,
        case_type: CaseType,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            case_number: case_number.into(),
            title: title.into(),
            description: String::new(),
            case_type,
            status: CaseStatus::Open,
            priority: CasePriority::Medium,
            incident_date: None,
            reported_date: now,
            location: None,
            created_at: now,
        }
    }

    /// Set the workflow status
    pub fn with_status(mut self, status: CaseStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: CasePriority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the incident date
    pub fn with_incident_date(mut self, incident_date: DateTime<Utc>) -> Self {
        self.incident_date = Some(incident_date);
        self
    }

    /// Set the creation (and report) timestamp
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.reported_date = created_at;
        self
    }
}

impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.case_number, self.title)
    }
}
