//! Snapshot store contract and SQLite implementation.
//!
//! # Responsibility
//! - Expose the five key-based operations used by cache reload and
//!   mutations.
//! - Preserve missing measures as SQL `NULL`.
//!
//! # Invariants
//! - `insert` reports `Duplicate` on primary-key collision and writes nothing.
//! - `update_fields` touches measure columns only.
//! - `find_all` returns rows ordered by `(region_name, year)`.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::record::{MeasurePatch, Measures, Record, RecordId, RecordValidationError};
use rusqlite::types::Value;
use rusqlite::{ffi, params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const RECORD_SELECT_SQL: &str = "SELECT
    id,
    region_name,
    year,
    poverty_severity_index,
    poverty_population_pct,
    unemployment_rate
FROM indicator_records";

const REQUIRED_COLUMNS: &[&str] = &[
    "id",
    "region_name",
    "year",
    "poverty_severity_index",
    "poverty_population_pct",
    "unemployment_rate",
];

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level failure for snapshot collection access.
#[derive(Debug)]
pub enum StoreError {
    Duplicate(RecordId),
    Db(DbError),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Duplicate(id) => write!(f, "record already exists: {id}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "store connection is at schema version {actual_version}, expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<RecordValidationError> for StoreError {
    fn from(value: RecordValidationError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

/// Key-based access to the remote record collection.
///
/// No filter pushdown: filtering happens in-process over `find_all`.
pub trait SnapshotStore {
    fn find_all(&self) -> StoreResult<Vec<Record>>;
    fn find_by_id(&self, id: &RecordId) -> StoreResult<Option<Record>>;
    fn insert(&self, record: &Record) -> StoreResult<()>;
    /// Returns the number of records matched by `id` (0 or 1).
    fn update_fields(&self, id: &RecordId, patch: &MeasurePatch) -> StoreResult<usize>;
    /// Returns the number of records removed (0 or 1).
    fn delete_by_id(&self, id: &RecordId) -> StoreResult<usize>;
}

/// SQLite-backed snapshot store: one row per record keyed by `id`.
pub struct SqliteSnapshotStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSnapshotStore<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` on schema drift.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_user_version(conn)?;
        if actual_version != expected_version {
            return Err(StoreError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        ensure_schema(conn)?;
        Ok(Self { conn })
    }
}

impl SnapshotStore for SqliteSnapshotStore<'_> {
    fn find_all(&self) -> StoreResult<Vec<Record>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RECORD_SELECT_SQL} ORDER BY region_name ASC, year ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }

        Ok(records)
    }

    fn find_by_id(&self, id: &RecordId) -> StoreResult<Option<Record>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RECORD_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.as_str()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_record_row(row)?));
        }

        Ok(None)
    }

    fn insert(&self, record: &Record) -> StoreResult<()> {
        let result = self.conn.execute(
            "INSERT INTO indicator_records (
                id,
                region_name,
                year,
                poverty_severity_index,
                poverty_population_pct,
                unemployment_rate
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                record.id.as_str(),
                record.region_name.as_str(),
                record.year,
                record.measures.poverty_severity_index,
                record.measures.poverty_population_pct,
                record.measures.unemployment_rate,
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_primary_key_violation(&err) => {
                Err(StoreError::Duplicate(record.id.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn update_fields(&self, id: &RecordId, patch: &MeasurePatch) -> StoreResult<usize> {
        let fields = patch.fields();
        if fields.is_empty() {
            return Ok(0);
        }

        let assignments = fields
            .iter()
            .map(|(measure, _)| format!("{} = ?", measure.column()))
            .collect::<Vec<_>>()
            .join(", ");
        let mut bind_values: Vec<Value> = fields
            .iter()
            .map(|(_, value)| Value::Real(*value))
            .collect();
        bind_values.push(Value::Text(id.as_str().to_string()));

        let changed = self.conn.execute(
            &format!("UPDATE indicator_records SET {assignments} WHERE id = ?;"),
            params_from_iter(bind_values),
        )?;

        Ok(changed)
    }

    fn delete_by_id(&self, id: &RecordId) -> StoreResult<usize> {
        let changed = self
            .conn
            .execute("DELETE FROM indicator_records WHERE id = ?1;", [id.as_str()])?;
        Ok(changed)
    }
}

fn parse_record_row(row: &Row<'_>) -> StoreResult<Record> {
    let id_text: String = row.get("id")?;
    let id = RecordId::parse(&id_text).map_err(|_| {
        StoreError::InvalidData(format!(
            "invalid id value `{id_text}` in indicator_records.id"
        ))
    })?;

    let record = Record {
        id,
        region_name: row.get("region_name")?,
        year: row.get("year")?,
        measures: Measures {
            poverty_severity_index: row.get("poverty_severity_index")?,
            poverty_population_pct: row.get("poverty_population_pct")?,
            unemployment_rate: row.get("unemployment_rate")?,
        },
    };
    record.validate_identity()?;
    Ok(record)
}

fn is_primary_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

fn ensure_schema(conn: &Connection) -> StoreResult<()> {
    let table_exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'indicator_records'
        );",
        [],
        |row| row.get(0),
    )?;
    if table_exists == 0 {
        return Err(StoreError::MissingRequiredTable("indicator_records"));
    }

    let mut stmt = conn.prepare("PRAGMA table_info(indicator_records);")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    for &column in REQUIRED_COLUMNS {
        if !columns.iter().any(|existing| existing == column) {
            return Err(StoreError::MissingRequiredColumn {
                table: "indicator_records",
                column,
            });
        }
    }

    Ok(())
}
