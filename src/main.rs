use std::sync::Arc;

use aws_lambda_events::event::s3::S3Event;
use lambda_runtime::{service_fn, Error, LambdaEvent};

use diagnexus_lib::config::{self, AppConfig, DatastoreConfig};
use diagnexus_lib::db::{PgReportStore, ReportStore, SqliteReportStore};
use diagnexus_lib::notify::SmtpNotifier;
use diagnexus_lib::pipeline::extraction::PdfTextExtractor;
use diagnexus_lib::pipeline::storage::S3ObjectStore;
use diagnexus_lib::pipeline::structuring::ChatCompletionsClient;
use diagnexus_lib::pipeline::{BatchSummary, ReportIngestionHandler, ReportProcessor};

#[tokio::main]
async fn main() -> Result<(), Error> {
    diagnexus_lib::init_tracing();
    tracing::info!("{} ingest starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = AppConfig::from_env()?;
    let handler = build_handler(&config).await?;
    let handler = &handler;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<S3Event>| async move {
        Ok::<BatchSummary, Error>(handler.handle(event.payload).await)
    }))
    .await
}

/// Process-scoped clients, built once per cold start.
async fn build_handler(config: &AppConfig) -> Result<ReportIngestionHandler, Error> {
    let reports: Arc<dyn ReportStore> = match &config.datastore {
        DatastoreConfig::Postgres(db) => Arc::new(PgReportStore::connect_lazy(db)),
        DatastoreConfig::Sqlite(path) => {
            tracing::info!(path = %path.display(), "Using embedded SQLite datastore");
            Arc::new(SqliteReportStore::open(path)?)
        }
    };

    let processor = ReportProcessor::new(
        Arc::new(S3ObjectStore::from_env().await),
        Arc::new(PdfTextExtractor),
        Arc::new(ChatCompletionsClient::from_config(&config.model)),
        &config.model.model,
        reports,
        Arc::new(SmtpNotifier::from_config(&config.smtp)?),
    );

    Ok(ReportIngestionHandler::new(processor))
}
