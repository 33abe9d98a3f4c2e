//! Casegraph Storage Layer
//!
//! Implements the [`CaseStore`] trait on SQLite.
//!
//! # Architecture
//!
//! - One table per entity (persons, relationships, cases, involvements, timeline)
//! - Uniqueness of typed edges and involvements is enforced by the schema
//! - Every read method is a single statement; an id set is bound as one array
//!   parameter through the `rarray` table-valued function, so its size is not
//!   limited by SQLite's bound-variable cap
//!
//! The write methods (`insert_person`, `add_relationship`, ...) exist for the
//! collaborators that own the data: loaders, importers and tests. The analytics
//! crate only ever sees the read-only trait.
//!
//! # Examples
//!
//! ```no_run
//! use casegraph_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for queries
//! ```

#![warn(missing_docs)]

pub mod sample;

use casegraph_domain::traits::{
    CaseQuery, CaseStore, InvolvementQuery, RelationshipQuery, TimelineQuery,
};
use casegraph_domain::{
    Case, CaseId, CaseInvolvement, DomainError, Involvement, InvolvementId, Person, PersonId,
    Relationship, RelationshipId, RiskLevel, TimelineEntry, TimelineEntryId,
};
use rusqlite::types::{Type, Value};
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};
use std::path::Path;
use std::rc::Rc;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Record with the same identity already exists
    #[error("Duplicate record: {0}")]
    Duplicate(String),
}

impl From<DomainError> for StoreError {
    fn from(e: DomainError) -> Self {
        StoreError::InvalidData(e.to_string())
    }
}

const PERSON_COLUMNS: &str = "id, first_name, last_name, birth_date, birth_place, id_number, \
     known_aliases, risk_level, notes, created_at, updated_at";

const CASE_COLUMNS: &str = "id, case_number, title, description, case_type, status, priority, \
     incident_date, reported_date, location, created_at";

const RELATIONSHIP_COLUMNS: &str =
    "id, person1_id, person2_id, relationship_type, description, strength, start_date, end_date";

/// SQLite-based implementation of CaseStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own SqliteStore instance.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use casegraph_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("casegraph.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        rusqlite::vtab::array::load_module(&conn)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        tracing::debug!(path = %path.as_ref().display(), "opened case store");
        Ok(store)
    }

    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Run `f` inside a transaction, rolling back when it fails
    pub fn in_transaction<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        self.conn.execute_batch("BEGIN")?;
        match f(self) {
            Ok(value) => {
                self.conn.execute_batch("COMMIT")?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = self.conn.execute_batch("ROLLBACK") {
                    tracing::warn!(error = %rollback, "rollback failed");
                }
                Err(e)
            }
        }
    }

    /// Whether the store holds no persons and no cases
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        let count: i64 = self.conn.query_row(
            "SELECT (SELECT COUNT(*) FROM persons) + (SELECT COUNT(*) FROM cases)",
            [],
            |row| row.get(0),
        )?;
        Ok(count == 0)
    }

    /// Insert a person
    ///
    /// An id of 0 lets the database assign one. The stored id is returned.
    pub fn insert_person(&mut self, person: &Person) -> Result<PersonId, StoreError> {
        if let Some(id) = explicit_id(person.id.0) {
            if self.exists("persons", id)? {
                return Err(StoreError::Duplicate(format!("person {}", id)));
            }
        }

        self.conn.execute(
            "INSERT INTO persons (id, first_name, last_name, birth_date, birth_place, id_number,
                                  known_aliases, risk_level, notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                explicit_id(person.id.0),
                &person.first_name,
                &person.last_name,
                person.birth_date,
                &person.birth_place,
                &person.id_number,
                &person.known_aliases,
                person.risk_level.value(),
                &person.notes,
                person.created_at,
                person.updated_at,
            ],
        )?;

        Ok(PersonId(self.conn.last_insert_rowid()))
    }

    /// Change a person's risk level
    pub fn set_risk_level(&mut self, id: PersonId, risk_level: RiskLevel) -> Result<(), StoreError> {
        let updated = self.conn.execute(
            "UPDATE persons SET risk_level = ?1, updated_at = ?2 WHERE id = ?3",
            params![risk_level.value(), chrono::Utc::now(), id.0],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(format!("person {}", id)));
        }
        Ok(())
    }

    /// Insert a case
    ///
    /// Fails with [`StoreError::Duplicate`] when the id or case number is taken.
    pub fn insert_case(&mut self, case: &Case) -> Result<CaseId, StoreError> {
        let taken: bool = self
            .conn
            .query_row(
                "SELECT 1 FROM cases WHERE id = ?1 OR case_number = ?2",
                params![explicit_id(case.id.0), &case.case_number],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);

        if taken {
            return Err(StoreError::Duplicate(format!("case {}", case.case_number)));
        }

        self.conn.execute(
            "INSERT INTO cases (id, case_number, title, description, case_type, status, priority,
                                incident_date, reported_date, location, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                explicit_id(case.id.0),
                &case.case_number,
                &case.title,
                &case.description,
                case.case_type.as_str(),
                case.status.as_str(),
                case.priority.as_str(),
                case.incident_date,
                case.reported_date,
                &case.location,
                case.created_at,
            ],
        )?;

        Ok(CaseId(self.conn.last_insert_rowid()))
    }

    /// Add or update a relationship
    ///
    /// A second relationship with the same (person1, person2, type) replaces
    /// the description, strength and dates of the first; the original id is kept.
    pub fn add_relationship(&mut self, rel: &Relationship) -> Result<RelationshipId, StoreError> {
        casegraph_domain::relationship::validate_strength(rel.strength)?;

        let id: i64 = self.conn.query_row(
            "INSERT INTO relationships (id, person1_id, person2_id, relationship_type, description,
                                        strength, start_date, end_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(person1_id, person2_id, relationship_type) DO UPDATE SET
             description = excluded.description, strength = excluded.strength,
             start_date = excluded.start_date, end_date = excluded.end_date
             RETURNING id",
            params![
                explicit_id(rel.id.0),
                rel.person1.0,
                rel.person2.0,
                rel.relationship_type.as_str(),
                &rel.description,
                rel.strength,
                rel.start_date,
                rel.end_date,
            ],
            |row| row.get(0),
        )?;

        Ok(RelationshipId(id))
    }

    /// Add or update an involvement
    ///
    /// Same upsert rule as relationships, keyed by (person, case, type).
    pub fn add_involvement(&mut self, inv: &Involvement) -> Result<InvolvementId, StoreError> {
        let id: i64 = self.conn.query_row(
            "INSERT INTO involvements (id, person_id, case_id, involvement_type, description, credibility)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(person_id, case_id, involvement_type) DO UPDATE SET
             description = excluded.description, credibility = excluded.credibility
             RETURNING id",
            params![
                explicit_id(inv.id.0),
                inv.person.0,
                inv.case.0,
                inv.involvement_type.as_str(),
                &inv.description,
                inv.credibility,
            ],
            |row| row.get(0),
        )?;

        Ok(InvolvementId(id))
    }

    /// Append a timeline entry to a case
    pub fn add_timeline_entry(&mut self, entry: &TimelineEntry) -> Result<TimelineEntryId, StoreError> {
        self.conn.execute(
            "INSERT INTO timeline (id, case_id, datetime, title, description, related_person)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                explicit_id(entry.id.0),
                entry.case.0,
                entry.datetime,
                &entry.title,
                &entry.description,
                entry.related_person.map(|p| p.0),
            ],
        )?;

        Ok(TimelineEntryId(self.conn.last_insert_rowid()))
    }

    fn exists(&self, table: &str, id: i64) -> Result<bool, StoreError> {
        let sql = format!("SELECT 1 FROM {} WHERE id = ?1", table);
        let found = self
            .conn
            .query_row(&sql, params![id], |_| Ok(true))
            .optional()?
            .unwrap_or(false);
        Ok(found)
    }

    fn query_all<T>(
        &self,
        sql: &str,
        params: &[Box<dyn ToSql>],
        map: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let rows = stmt
            .query_map(&param_refs[..], map)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

impl CaseStore for SqliteStore {
    type Error = StoreError;

    fn get_person(&self, id: PersonId) -> Result<Option<Person>, Self::Error> {
        let sql = format!("SELECT {} FROM persons WHERE id = ?1", PERSON_COLUMNS);
        let person = self
            .conn
            .query_row(&sql, params![id.0], person_from_row)
            .optional()?;
        Ok(person)
    }

    fn persons(&self, ids: Option<&[PersonId]>) -> Result<Vec<Person>, Self::Error> {
        let mut sql = format!("SELECT {} FROM persons WHERE 1=1", PERSON_COLUMNS);
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(ids) = ids {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            push_in_list(&mut sql, &mut params, "id", ids.iter().map(|id| id.0));
        }

        sql.push_str(" ORDER BY last_name, first_name, id");
        self.query_all(&sql, &params, person_from_row)
    }

    fn get_case(&self, id: CaseId) -> Result<Option<Case>, Self::Error> {
        let sql = format!("SELECT {} FROM cases WHERE id = ?1", CASE_COLUMNS);
        let case = self
            .conn
            .query_row(&sql, params![id.0], case_from_row)
            .optional()?;
        Ok(case)
    }

    fn cases(&self, query: &CaseQuery) -> Result<Vec<Case>, Self::Error> {
        let mut sql = format!("SELECT {} FROM cases WHERE 1=1", CASE_COLUMNS);
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(case_type) = query.case_type {
            sql.push_str(" AND case_type = ?");
            params.push(Box::new(case_type.as_str()));
        }

        if let Some(from) = query.incident_from {
            sql.push_str(" AND incident_date >= ?");
            params.push(Box::new(from));
        }

        if let Some(to) = query.incident_to {
            sql.push_str(" AND incident_date < ?");
            params.push(Box::new(to));
        }

        sql.push_str(" ORDER BY created_at, id");
        self.query_all(&sql, &params, case_from_row)
    }

    fn relationships(&self, query: &RelationshipQuery) -> Result<Vec<Relationship>, Self::Error> {
        let mut sql = format!("SELECT {} FROM relationships WHERE 1=1", RELATIONSHIP_COLUMNS);
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(ids) = &query.within {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            push_in_list(&mut sql, &mut params, "person1_id", ids.iter().map(|id| id.0));
            push_in_list(&mut sql, &mut params, "person2_id", ids.iter().map(|id| id.0));
        }

        if let Some(person) = query.touching {
            sql.push_str(" AND (person1_id = ? OR person2_id = ?)");
            params.push(Box::new(person.0));
            params.push(Box::new(person.0));
        }

        sql.push_str(" ORDER BY id");
        self.query_all(&sql, &params, relationship_from_row)
    }

    fn involvements(&self, query: &InvolvementQuery) -> Result<Vec<CaseInvolvement>, Self::Error> {
        let mut sql = String::from(
            "SELECT i.id, i.person_id, i.case_id, i.involvement_type, i.description, i.credibility,
                    c.case_type, c.incident_date
             FROM involvements i JOIN cases c ON c.id = i.case_id
             WHERE 1=1",
        );
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(ids) = &query.person_ids {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            push_in_list(&mut sql, &mut params, "i.person_id", ids.iter().map(|id| id.0));
        }

        if let Some(ids) = &query.case_ids {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            push_in_list(&mut sql, &mut params, "i.case_id", ids.iter().map(|id| id.0));
        }

        if let Some(case_type) = query.case_type {
            sql.push_str(" AND c.case_type = ?");
            params.push(Box::new(case_type.as_str()));
        }

        if let Some(role) = query.involvement_type {
            sql.push_str(" AND i.involvement_type = ?");
            params.push(Box::new(role.as_str()));
        }

        sql.push_str(" ORDER BY i.id");
        self.query_all(&sql, &params, |row| {
            Ok(CaseInvolvement {
                involvement: Involvement {
                    id: InvolvementId(row.get(0)?),
                    person: PersonId(row.get(1)?),
                    case: CaseId(row.get(2)?),
                    involvement_type: parse_column(row, 3)?,
                    description: row.get(4)?,
                    credibility: row.get(5)?,
                },
                case_type: parse_column(row, 6)?,
                incident_date: row.get(7)?,
            })
        })
    }

    fn timeline(&self, query: &TimelineQuery) -> Result<Vec<TimelineEntry>, Self::Error> {
        let mut sql = String::from(
            "SELECT t.id, t.case_id, t.datetime, t.title, t.description, t.related_person
             FROM timeline t JOIN cases c ON c.id = t.case_id
             WHERE 1=1",
        );
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(case_id) = query.case_id {
            sql.push_str(" AND t.case_id = ?");
            params.push(Box::new(case_id.0));
        }

        if let Some(person_id) = query.person_id {
            sql.push_str(" AND t.related_person = ?");
            params.push(Box::new(person_id.0));
        }

        if let Some(case_type) = query.case_type {
            sql.push_str(" AND c.case_type = ?");
            params.push(Box::new(case_type.as_str()));
        }

        sql.push_str(" ORDER BY t.datetime, t.id");
        self.query_all(&sql, &params, |row| {
            let related: Option<i64> = row.get(5)?;
            Ok(TimelineEntry {
                id: TimelineEntryId(row.get(0)?),
                case: CaseId(row.get(1)?),
                datetime: row.get(2)?,
                title: row.get(3)?,
                description: row.get(4)?,
                related_person: related.map(PersonId),
            })
        })
    }
}

/// Ids of 0 (or below) are left for SQLite to assign
fn explicit_id(id: i64) -> Option<i64> {
    (id > 0).then_some(id)
}

fn push_in_list(
    sql: &mut String,
    params: &mut Vec<Box<dyn ToSql>>,
    column: &str,
    values: impl Iterator<Item = i64>,
) {
    let values: Vec<Value> = values.map(Value::from).collect();
    sql.push_str(&format!(" AND {} IN rarray(?)", column));
    params.push(Box::new(Rc::new(values)));
}

fn conversion_error(idx: usize, e: DomainError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

/// Read a text column holding an enumeration key
fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = DomainError>,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>().map_err(|e| conversion_error(idx, e))
}

fn person_from_row(row: &Row<'_>) -> rusqlite::Result<Person> {
    let risk: u8 = row.get(7)?;
    let risk_level = RiskLevel::try_from(risk).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(7, Type::Integer, Box::new(e))
    })?;

    Ok(Person {
        id: PersonId(row.get(0)?),
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        birth_date: row.get(3)?,
        birth_place: row.get(4)?,
        id_number: row.get(5)?,
        known_aliases: row.get(6)?,
        risk_level,
        notes: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn case_from_row(row: &Row<'_>) -> rusqlite::Result<Case> {
    Ok(Case {
        id: CaseId(row.get(0)?),
        case_number: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        case_type: parse_column(row, 4)?,
        status: parse_column(row, 5)?,
        priority: parse_column(row, 6)?,
        incident_date: row.get(7)?,
        reported_date: row.get(8)?,
        location: row.get(9)?,
        created_at: row.get(10)?,
    })
}

fn relationship_from_row(row: &Row<'_>) -> rusqlite::Result<Relationship> {
    Ok(Relationship {
        id: RelationshipId(row.get(0)?),
        person1: PersonId(row.get(1)?),
        person2: PersonId(row.get(2)?),
        relationship_type: parse_column(row, 3)?,
        description: row.get(4)?,
        strength: row.get(5)?,
        start_date: row.get(6)?,
        end_date: row.get(7)?,
    })
}
