use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;

use super::{DatabaseError, ReportStore};
use crate::config::DatabaseConfig;
use crate::models::ClassifiedTest;

/// Production report store backed by a shared Postgres pool.
///
/// Connections are taken from the pool per query; the pool is built once at
/// cold start and reused by every invocation of the process.
pub struct PgReportStore {
    pool: PgPool,
}

impl PgReportStore {
    /// Build the pool lazily: no connection is opened until the first query.
    pub fn connect_lazy(config: &DatabaseConfig) -> Self {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(config.password.expose())
            .database(&config.name)
            // TLS without certificate verification, as the managed instance is set up.
            .ssl_mode(PgSslMode::Require);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_lazy_with(options);

        tracing::info!(
            host = %config.host,
            port = config.port,
            database = %config.name,
            max_connections = config.max_connections,
            "Postgres pool configured"
        );

        Self { pool }
    }
}

#[async_trait]
impl ReportStore for PgReportStore {
    async fn insert_test(&self, test: &ClassifiedTest) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO report_test
             (patient_id, test_type, value, minlimit, maxlimit, unit, test_timestamp, status, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(test.patient_id)
        .bind(&test.test_type)
        .bind(test.value)
        .bind(test.minlimit)
        .bind(test.maxlimit)
        .bind(test.unit.as_deref())
        .bind(test.test_timestamp)
        .bind(test.status.as_flag())
        .bind(test.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_patient_email(&self, patient_id: i64) -> Result<Option<String>, DatabaseError> {
        let email = sqlx::query_scalar::<_, String>("SELECT email FROM users WHERE user_id = $1")
            .bind(patient_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(email)
    }
}
