//! Casegraph Domain Layer
//!
//! Entities, value objects and the data-access trait shared by every other
//! casegraph crate. Nothing in here performs I/O; the store crate implements
//! [`traits::CaseStore`] and the analytics crate consumes it.
//!
//! ## Key Concepts
//!
//! - **Person**: an individual tracked by investigators, with an ordinal risk level
//! - **Relationship**: a directed, typed edge between two persons
//! - **Case**: an investigation unit with type, status and priority
//! - **Involvement**: the role a person plays in a case (suspect, victim, ...)
//! - **Timeline**: dated events recorded against a case
//!
//! Every choice field (risk levels, case types, relationship types, ...) is a
//! closed enumeration with a storage key (`as_str`) and a display label (`label`).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod case;
pub mod error;
pub mod involvement;
pub mod person;
pub mod relationship;
pub mod timeline;
pub mod traits;

// Re-exports for convenience
pub use case::{Case, CaseId, CasePriority, CaseStatus, CaseType};
pub use error::DomainError;
pub use involvement::{CaseInvolvement, Involvement, InvolvementId, InvolvementType};
pub use person::{Person, PersonId, RiskLevel};
pub use relationship::{Relationship, RelationshipId, RelationshipType};
pub use timeline::{TimelineEntry, TimelineEntryId};
