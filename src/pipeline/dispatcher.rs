//! Storage-event batch handling.
//!
//! Records run one after another. A failed record is logged and reported in
//! the [`BatchSummary`]; it never stops the rest of the batch.

use aws_lambda_events::event::s3::{S3Event, S3EventRecord};
use serde::Serialize;
use tracing::Instrument;

use super::event::ReportLocation;
use super::processor::{ProcessingError, RecordOutcome, ReportProcessor};

/// Outcome of one record, tagged with where the report lives.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordReport {
    pub bucket: Option<String>,
    pub key: Option<String>,
    pub outcome: RecordOutcome,
}

/// Invocation response: one entry per record, in batch order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub records: Vec<RecordReport>,
    pub succeeded: usize,
    pub partially: usize,
    pub failed: usize,
}

impl BatchSummary {
    fn push(&mut self, report: RecordReport) {
        match report.outcome {
            RecordOutcome::Notified { .. } => self.succeeded += 1,
            RecordOutcome::PersistedWithoutNotification { .. } => self.partially += 1,
            RecordOutcome::Failed { .. } => self.failed += 1,
        }
        self.records.push(report);
    }
}

/// Entry point for storage notifications.
pub struct ReportIngestionHandler {
    processor: ReportProcessor,
}

impl ReportIngestionHandler {
    pub fn new(processor: ReportProcessor) -> Self {
        Self { processor }
    }

    pub async fn handle(&self, event: S3Event) -> BatchSummary {
        tracing::info!(records = event.records.len(), "Storage event received");

        let mut summary = BatchSummary::default();
        for record in &event.records {
            let report = self.handle_record(record).await;
            summary.push(report);
        }

        tracing::info!(
            succeeded = summary.succeeded,
            partially = summary.partially,
            failed = summary.failed,
            "Batch complete"
        );
        summary
    }

    async fn handle_record(&self, record: &S3EventRecord) -> RecordReport {
        let span = tracing::info_span!(
            "record",
            bucket = record.s3.bucket.name.as_deref().unwrap_or(""),
            key = tracing::field::Empty,
        );

        let outcome = async {
            match ReportLocation::from_record(record) {
                Ok(location) => {
                    tracing::Span::current().record("key", location.key.as_str());
                    tracing::info!("Processing report");
                    self.processor.process(&location).await
                }
                Err(e) => RecordOutcome::failed(&ProcessingError::from(e)),
            }
        }
        .instrument(span.clone())
        .await;

        span.in_scope(|| log_outcome(&outcome));

        RecordReport {
            bucket: record.s3.bucket.name.clone(),
            key: record.s3.object.key.clone(),
            outcome,
        }
    }
}

fn log_outcome(outcome: &RecordOutcome) {
    match outcome {
        RecordOutcome::Notified { persisted, .. } => {
            tracing::info!(persisted, "Record processed");
        }
        RecordOutcome::PersistedWithoutNotification {
            patient_id,
            persisted,
            kind,
            error,
        } => {
            tracing::error!(patient_id, persisted, kind = %kind, error = %error, "Record persisted but patient not notified");
        }
        RecordOutcome::Failed { kind, error } => {
            tracing::error!(kind = %kind, error = %error, "Record failed");
        }
    }
}
