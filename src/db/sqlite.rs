use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{DatabaseError, ReportStore};
use crate::models::enums::RangeStatus;
use crate::models::{format_timestamp, ClassifiedTest};

/// Open a SQLite connection to the given path and run migrations
pub fn open_database(path: &Path) -> Result<Connection, DatabaseError> {
    let conn = Connection::open(path)?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

/// Open an in-memory database (for testing)
pub fn open_memory_database() -> Result<Connection, DatabaseError> {
    let conn = Connection::open_in_memory()?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

fn configure_pragmas(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "PRAGMA journal_mode=DELETE;
         PRAGMA foreign_keys=ON;"
    )?;
    Ok(())
}

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let current_version = get_current_version(conn);

    let migrations: Vec<(i64, &str)> = vec![
        (1, include_str!("../../resources/migrations/001_report_tests.sql")),
    ];

    for (version, sql) in migrations {
        if version > current_version {
            tracing::info!("Running migration v{version}");
            conn.execute_batch(sql).map_err(|e| DatabaseError::MigrationFailed {
                version,
                reason: e.to_string(),
            })?;
        }
    }

    Ok(())
}

/// Get the current schema version (0 if no schema exists yet)
fn get_current_version(conn: &Connection) -> i64 {
    conn.query_row(
        "SELECT MAX(version) FROM schema_version",
        [],
        |row| row.get::<_, i64>(0),
    )
    .unwrap_or(0)
}

/// Embedded report store for local runs and tests.
///
/// Holds a single connection behind a mutex; statements are short and the
/// pipeline never issues them concurrently.
pub struct SqliteReportStore {
    conn: Mutex<Connection>,
}

impl SqliteReportStore {
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        Ok(Self::from_connection(open_database(path)?))
    }

    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Ok(Self::from_connection(open_memory_database()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, DatabaseError> {
        self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)
    }

    /// Register (or replace) the notification address of a patient.
    pub fn insert_user(&self, user_id: i64, email: &str) -> Result<(), DatabaseError> {
        self.conn()?.execute(
            "INSERT OR REPLACE INTO users (user_id, email) VALUES (?1, ?2)",
            params![user_id, email],
        )?;
        Ok(())
    }

    /// All stored results of a patient, in insertion order.
    pub fn tests_for_patient(&self, patient_id: i64) -> Result<Vec<ClassifiedTest>, DatabaseError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT patient_id, test_type, value, minlimit, maxlimit, unit,
             test_timestamp, status, created_at
             FROM report_test WHERE patient_id = ?1 ORDER BY id",
        )?;

        let rows = stmt.query_map(params![patient_id], |row| Ok(report_row_from_rusqlite(row)))?;

        let mut tests = Vec::new();
        for row in rows {
            tests.push(test_from_row(row??)?);
        }
        Ok(tests)
    }

    pub fn count_tests(&self) -> Result<i64, DatabaseError> {
        let count = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM report_test", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[async_trait]
impl ReportStore for SqliteReportStore {
    async fn insert_test(&self, test: &ClassifiedTest) -> Result<(), DatabaseError> {
        self.conn()?.execute(
            "INSERT INTO report_test
             (patient_id, test_type, value, minlimit, maxlimit, unit, test_timestamp, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                test.patient_id,
                test.test_type,
                test.value,
                test.minlimit,
                test.maxlimit,
                test.unit,
                format_timestamp(&test.test_timestamp),
                test.status.as_flag(),
                format_timestamp(&test.created_at),
            ],
        )?;
        Ok(())
    }

    async fn find_patient_email(&self, patient_id: i64) -> Result<Option<String>, DatabaseError> {
        let email = self
            .conn()?
            .query_row(
                "SELECT email FROM users WHERE user_id = ?1",
                params![patient_id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(email)
    }
}

// Internal row type for ClassifiedTest mapping
struct ReportRow {
    patient_id: i64,
    test_type: String,
    value: f64,
    minlimit: f64,
    maxlimit: f64,
    unit: Option<String>,
    test_timestamp: String,
    status: i32,
    created_at: String,
}

fn report_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<ReportRow, rusqlite::Error> {
    Ok(ReportRow {
        patient_id: row.get(0)?,
        test_type: row.get(1)?,
        value: row.get(2)?,
        minlimit: row.get(3)?,
        maxlimit: row.get(4)?,
        unit: row.get(5)?,
        test_timestamp: row.get(6)?,
        status: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn test_from_row(row: ReportRow) -> Result<ClassifiedTest, DatabaseError> {
    Ok(ClassifiedTest {
        patient_id: row.patient_id,
        test_type: row.test_type,
        value: row.value,
        minlimit: row.minlimit,
        maxlimit: row.maxlimit,
        unit: row.unit,
        test_timestamp: parse_timestamp(&row.test_timestamp)?,
        status: RangeStatus::from_flag(row.status)?,
        created_at: parse_timestamp(&row.created_at)?,
    })
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| DatabaseError::InvalidTimestamp(format!("{raw}: {e}")))
}
