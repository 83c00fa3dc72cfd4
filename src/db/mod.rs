pub mod postgres;
pub mod sqlite;

pub use postgres::*;
pub use sqlite::*;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::ClassifiedTest;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Postgres error: {0}")]
    Postgres(#[from] sqlx::Error),

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Invalid stored timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Connection lock poisoned")]
    LockPoisoned,
}

/// Datastore seam used by the ingestion pipeline.
///
/// Each call is its own unit of work: there is no transaction spanning the
/// inserts of one report, so a later failure leaves earlier rows in place.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Insert one classified test as a single row of `report_test`.
    async fn insert_test(&self, test: &ClassifiedTest) -> Result<(), DatabaseError>;

    /// Notification address of a patient, `None` when no such user exists.
    async fn find_patient_email(&self, patient_id: i64) -> Result<Option<String>, DatabaseError>;
}
