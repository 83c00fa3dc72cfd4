//! Per-record report pipeline.
//!
//! fetch → extract → structure → parse → patient id → classify/persist → notify.
//!
//! Every external system sits behind a trait injected at construction, so the
//! processor runs unchanged against S3/Postgres/SMTP in production and against
//! the in-memory doubles in tests.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::db::{DatabaseError, ReportStore};
use crate::models::enums::ErrorKind;
use crate::models::TestObservation;
use crate::notify::{NotificationError, Notifier, SendReceipt};
use crate::pipeline::classify::{classify_observation, Disposition, ResultLists};
use crate::pipeline::event::{patient_id_from_key, KeyError, ReportLocation};
use crate::pipeline::extraction::{extract_text_blocking, ExtractionError, PdfExtractor};
use crate::pipeline::storage::{FetchError, ObjectStore};
use crate::pipeline::structuring::{
    build_structuring_prompt, parse_observations, LlmClient, StructuringError,
    STRUCTURING_TEMPERATURE,
};

/// Characters of extracted text or model output shown in debug logs.
const LOG_PREVIEW_CHARS: usize = 200;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that end the processing of one record.
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Invalid object key: {0}")]
    Key(#[from] KeyError),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Structuring failed: {0}")]
    Structuring(#[from] StructuringError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("No user found with ID {0}")]
    PatientNotFound(i64),

    #[error("Notification failed: {0}")]
    Notification(#[from] NotificationError),
}

impl ProcessingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Key(KeyError::MissingBucket | KeyError::MissingKey) => ErrorKind::MalformedRecord,
            Self::Key(_) => ErrorKind::KeyFormat,
            Self::Fetch(_) => ErrorKind::FetchFailure,
            Self::Extraction(_) => ErrorKind::ExtractionFailure,
            Self::Structuring(e) if e.is_format_error() => ErrorKind::ModelResponseFormat,
            Self::Structuring(_) => ErrorKind::ModelCallFailure,
            Self::Database(_) => ErrorKind::PersistenceFailure,
            Self::PatientNotFound(_) => ErrorKind::PatientNotFound,
            Self::Notification(_) => ErrorKind::NotificationFailure,
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Terminal state of one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordOutcome {
    /// Rows persisted and the summary email sent.
    Notified {
        patient_id: i64,
        persisted: usize,
        in_range: usize,
        out_of_range: usize,
        receipt: SendReceipt,
    },
    /// Rows were inserted, then a later step failed. Rows are not rolled back.
    PersistedWithoutNotification {
        patient_id: i64,
        persisted: usize,
        kind: ErrorKind,
        error: String,
    },
    /// Nothing persisted for this record.
    Failed { kind: ErrorKind, error: String },
}

impl RecordOutcome {
    pub fn failed(error: &ProcessingError) -> Self {
        Self::Failed {
            kind: error.kind(),
            error: error.to_string(),
        }
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Notified { .. } => None,
            Self::PersistedWithoutNotification { kind, .. } | Self::Failed { kind, .. } => {
                Some(*kind)
            }
        }
    }

    pub fn persisted(&self) -> usize {
        match self {
            Self::Notified { persisted, .. }
            | Self::PersistedWithoutNotification { persisted, .. } => *persisted,
            Self::Failed { .. } => 0,
        }
    }
}

/// Classification result of one report, after every row is stored.
#[derive(Debug, Clone)]
pub struct PersistedReport {
    pub patient_id: i64,
    pub results: ResultLists,
    pub skipped_missing_bounds: usize,
    pub skipped_non_numeric: usize,
}

/// A step failed; `persisted` rows for `patient_id` are already stored.
#[derive(Debug)]
struct StepFailure {
    patient_id: Option<i64>,
    persisted: usize,
    error: ProcessingError,
}

impl StepFailure {
    fn into_outcome(self) -> RecordOutcome {
        match self.patient_id {
            Some(patient_id) if self.persisted > 0 => RecordOutcome::PersistedWithoutNotification {
                patient_id,
                persisted: self.persisted,
                kind: self.error.kind(),
                error: self.error.to_string(),
            },
            _ => RecordOutcome::failed(&self.error),
        }
    }
}

impl From<ProcessingError> for StepFailure {
    fn from(error: ProcessingError) -> Self {
        Self {
            patient_id: None,
            persisted: 0,
            error,
        }
    }
}

// ---------------------------------------------------------------------------
// Processor
// ---------------------------------------------------------------------------

/// Runs the full pipeline for one uploaded report.
pub struct ReportProcessor {
    objects: Arc<dyn ObjectStore>,
    extractor: Arc<dyn PdfExtractor>,
    llm: Arc<dyn LlmClient>,
    model: String,
    reports: Arc<dyn ReportStore>,
    notifier: Arc<dyn Notifier>,
}

impl ReportProcessor {
    pub fn new(
        objects: Arc<dyn ObjectStore>,
        extractor: Arc<dyn PdfExtractor>,
        llm: Arc<dyn LlmClient>,
        model: &str,
        reports: Arc<dyn ReportStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            objects,
            extractor,
            llm,
            model: model.to_string(),
            reports,
            notifier,
        }
    }

    /// Process one report. Never panics on bad input; every failure becomes
    /// a [`RecordOutcome`].
    pub async fn process(&self, location: &ReportLocation) -> RecordOutcome {
        let report = match self.persist_report(location).await {
            Ok(report) => report,
            Err(failure) => return failure.into_outcome(),
        };

        let persisted = report.results.len();
        match self.notify(&report).await {
            Ok(receipt) => {
                tracing::info!(
                    patient_id = report.patient_id,
                    message_id = %receipt.message_id,
                    "Summary email sent"
                );
                RecordOutcome::Notified {
                    patient_id: report.patient_id,
                    persisted,
                    in_range: report.results.in_range.len(),
                    out_of_range: report.results.out_of_range.len(),
                    receipt,
                }
            }
            Err(error) => StepFailure {
                patient_id: Some(report.patient_id),
                persisted,
                error,
            }
            .into_outcome(),
        }
    }

    /// Steps up to and including persistence.
    async fn persist_report(&self, location: &ReportLocation) -> Result<PersistedReport, StepFailure> {
        let pdf_bytes = self.fetch(location).await?;
        let text = self.extract(pdf_bytes).await?;
        let observations = self.structure(&text).await?;
        let patient_id = patient_id_from_key(&location.key).map_err(ProcessingError::from)?;
        tracing::info!(patient_id, "Patient identified from object key");

        self.classify_and_store(patient_id, &observations).await
    }

    async fn fetch(&self, location: &ReportLocation) -> Result<Vec<u8>, ProcessingError> {
        let bytes = self.objects.fetch(location).await?;
        tracing::info!(bytes = bytes.len(), "Report fetched");
        Ok(bytes)
    }

    async fn extract(&self, pdf_bytes: Vec<u8>) -> Result<String, ProcessingError> {
        let text = extract_text_blocking(self.extractor.clone(), pdf_bytes).await?;
        tracing::info!(chars = text.chars().count(), "Text extracted");
        tracing::debug!(preview = %preview(&text), "Extracted text");
        Ok(text)
    }

    async fn structure(&self, text: &str) -> Result<Vec<TestObservation>, ProcessingError> {
        let prompt = build_structuring_prompt(text);
        let content = self
            .llm
            .complete(&self.model, &prompt, STRUCTURING_TEMPERATURE)
            .await?;
        tracing::debug!(preview = %preview(&content), "Model output");

        let observations = parse_observations(&content)?;
        tracing::info!(observations = observations.len(), "Model output validated");
        Ok(observations)
    }

    /// Classify in array order, inserting each row as soon as it is built.
    async fn classify_and_store(
        &self,
        patient_id: i64,
        observations: &[TestObservation],
    ) -> Result<PersistedReport, StepFailure> {
        let now = Utc::now();
        let mut report = PersistedReport {
            patient_id,
            results: ResultLists::default(),
            skipped_missing_bounds: 0,
            skipped_non_numeric: 0,
        };

        for observation in observations {
            match classify_observation(observation, patient_id, now) {
                Disposition::MissingBounds => {
                    report.skipped_missing_bounds += 1;
                    tracing::debug!(test_type = %observation.test_type, "Skipping test without reference bounds");
                }
                Disposition::NonNumeric => {
                    report.skipped_non_numeric += 1;
                    tracing::warn!(
                        test_type = %observation.test_type,
                        value = ?observation.value,
                        "Dropping test with non-numeric value"
                    );
                }
                Disposition::Classified(test) => {
                    tracing::debug!(
                        test_type = %test.test_type,
                        status = %test.status,
                        reported_at = ?observation.timestamp,
                        "Test classified"
                    );
                    if let Err(e) = self.reports.insert_test(&test).await {
                        return Err(StepFailure {
                            patient_id: Some(patient_id),
                            persisted: report.results.len(),
                            error: e.into(),
                        });
                    }
                    report.results.push(test);
                }
            }
        }

        tracing::info!(
            patient_id,
            in_range = report.results.in_range.len(),
            out_of_range = report.results.out_of_range.len(),
            skipped_missing_bounds = report.skipped_missing_bounds,
            skipped_non_numeric = report.skipped_non_numeric,
            "Results persisted"
        );
        Ok(report)
    }

    async fn notify(&self, report: &PersistedReport) -> Result<SendReceipt, ProcessingError> {
        let email = self
            .reports
            .find_patient_email(report.patient_id)
            .await?
            .ok_or(ProcessingError::PatientNotFound(report.patient_id))?;

        let receipt = self
            .notifier
            .send_report(
                &email,
                &report.results.out_of_range,
                &report.results.in_range,
            )
            .await?;
        Ok(receipt)
    }
}

fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(LOG_PREVIEW_CHARS).collect();
    if text.chars().nth(LOG_PREVIEW_CHARS).is_some() {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteReportStore;
    use crate::models::enums::RangeStatus;
    use crate::notify::RecordingNotifier;
    use crate::pipeline::extraction::StaticTextExtractor;
    use crate::pipeline::storage::InMemoryObjectStore;
    use crate::pipeline::structuring::MockLlmClient;

    const BUCKET: &str = "diagnexus-medical-reports";
    const KEY: &str = "1752425200816deepak_3.pdf";
    const REPORT_TEXT: &str = "HAEMOGLOBIN (Hb) 14.9 gm/dL 13.0 - 17.0";

    const FOUR_TESTS: &str = r#"[
      {"test_type": "HAEMOGLOBIN (Hb)", "value": 14.9, "minlimit": 13.0, "maxlimit": 17.0, "unit": "gm/dL", "timestamp": "10/Apr/2025 05:30PM"},
      {"test_type": "Glucose (Fasting)", "value": 92, "minlimit": 70, "maxlimit": 110, "unit": "mg/dL", "timestamp": null},
      {"test_type": "Platelet Count", "value": 250, "minlimit": 150, "maxlimit": 450, "unit": "10^3/uL", "timestamp": null},
      {"test_type": "Total Cholesterol", "value": 240, "minlimit": 0, "maxlimit": 200, "unit": "mg/dL", "timestamp": null}
    ]"#;

    struct Harness {
        objects: Arc<InMemoryObjectStore>,
        llm: Arc<MockLlmClient>,
        store: Arc<SqliteReportStore>,
        notifier: Arc<RecordingNotifier>,
        processor: ReportProcessor,
    }

    fn harness_with(llm: MockLlmClient, notifier: RecordingNotifier) -> Harness {
        let objects = Arc::new(InMemoryObjectStore::new().with_object(BUCKET, KEY, b"%PDF-1.4"));
        let llm = Arc::new(llm);
        let store = Arc::new(SqliteReportStore::open_in_memory().unwrap());
        store.insert_user(3, "deepak@example.com").unwrap();
        let notifier = Arc::new(notifier);

        let processor = ReportProcessor::new(
            objects.clone(),
            Arc::new(StaticTextExtractor::new(REPORT_TEXT)),
            llm.clone(),
            "gpt-4o-mini",
            store.clone(),
            notifier.clone(),
        );
        Harness {
            objects,
            llm,
            store,
            notifier,
            processor,
        }
    }

    fn harness(llm_response: &str) -> Harness {
        harness_with(MockLlmClient::new(llm_response), RecordingNotifier::new())
    }

    fn location(key: &str) -> ReportLocation {
        ReportLocation {
            bucket: BUCKET.into(),
            key: key.into(),
        }
    }

    #[tokio::test]
    async fn four_test_report_persists_and_notifies() {
        let h = harness(FOUR_TESTS);
        let outcome = h.processor.process(&location(KEY)).await;

        match &outcome {
            RecordOutcome::Notified {
                patient_id,
                persisted,
                in_range,
                out_of_range,
                ..
            } => {
                assert_eq!(*patient_id, 3);
                assert_eq!(*persisted, 4);
                assert_eq!(*in_range, 3);
                assert_eq!(*out_of_range, 1);
            }
            other => panic!("expected Notified, got {other:?}"),
        }

        let rows = h.store.tests_for_patient(3).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[3].test_type, "Total Cholesterol");
        assert_eq!(rows[3].status, RangeStatus::Abnormal);
        assert!(rows[..3].iter().all(|r| r.status == RangeStatus::Normal));

        let sent = h.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "deepak@example.com");
        assert_eq!(sent[0].out_of_range.len(), 1);
        assert_eq!(sent[0].out_of_range[0].test_type, "Total Cholesterol");
        assert_eq!(sent[0].in_range.len(), 3);
        assert!(sent[0].email.html.contains("240 mg/dL"));
        assert!(sent[0].email.html.contains("0 - 200"));
    }

    #[tokio::test]
    async fn prompt_embeds_text_and_uses_fixed_settings() {
        let h = harness("[]");
        h.processor.process(&location(KEY)).await;

        let calls = h.llm.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].model, "gpt-4o-mini");
        assert_eq!(calls[0].temperature, 0.0);
        assert!(calls[0].prompt.contains(REPORT_TEXT));
    }

    #[tokio::test]
    async fn empty_array_still_notifies_with_empty_lists() {
        let h = harness("[]");
        let outcome = h.processor.process(&location(KEY)).await;

        assert!(matches!(outcome, RecordOutcome::Notified { persisted: 0, .. }));
        assert_eq!(h.store.count_tests().unwrap(), 0);
        let sent = h.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].in_range.is_empty());
        assert!(sent[0].out_of_range.is_empty());
        assert!(sent[0].email.html.contains("No critical test results."));
    }

    #[tokio::test]
    async fn code_fenced_response_fails_without_rows() {
        let h = harness(&format!("```json\n{FOUR_TESTS}\n```"));
        let outcome = h.processor.process(&location(KEY)).await;

        assert_eq!(outcome.kind(), Some(ErrorKind::ModelResponseFormat));
        assert!(matches!(outcome, RecordOutcome::Failed { .. }));
        assert_eq!(h.store.count_tests().unwrap(), 0);
        assert!(h.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn null_bounds_are_skipped() {
        let h = harness(
            r#"[
              {"test_type": "Urine Colour", "value": "Pale yellow", "minlimit": null, "maxlimit": null, "unit": null, "timestamp": null},
              {"test_type": "Glucose", "value": 92, "minlimit": 70, "maxlimit": null, "unit": "mg/dL", "timestamp": null},
              {"test_type": "Haemoglobin", "value": 12.0, "minlimit": 12.0, "maxlimit": 15.0, "unit": "g/dL", "timestamp": null}
            ]"#,
        );
        let outcome = h.processor.process(&location(KEY)).await;

        assert_eq!(outcome.persisted(), 1);
        let rows = h.store.tests_for_patient(3).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].test_type, "Haemoglobin");
        assert_eq!(rows[0].status, RangeStatus::Normal);
    }

    #[tokio::test]
    async fn non_numeric_value_is_dropped() {
        let h = harness(
            r#"[
              {"test_type": "HIV", "value": "Negative", "minlimit": 0, "maxlimit": 1, "unit": null, "timestamp": null},
              {"test_type": "Glucose", "value": "180", "minlimit": 70, "maxlimit": 110, "unit": "mg/dL", "timestamp": null}
            ]"#,
        );
        let outcome = h.processor.process(&location(KEY)).await;

        assert!(matches!(
            outcome,
            RecordOutcome::Notified { persisted: 1, out_of_range: 1, .. }
        ));
        assert_eq!(h.store.tests_for_patient(3).unwrap()[0].value, 180.0);
    }

    #[tokio::test]
    async fn missing_patient_after_inserts_keeps_rows() {
        let objects = Arc::new(InMemoryObjectStore::new().with_object(BUCKET, "someone_77.pdf", b"%PDF"));
        let store = Arc::new(SqliteReportStore::open_in_memory().unwrap());
        let notifier = Arc::new(RecordingNotifier::new());
        let processor = ReportProcessor::new(
            objects,
            Arc::new(StaticTextExtractor::new(REPORT_TEXT)),
            Arc::new(MockLlmClient::new(FOUR_TESTS)),
            "gpt-4o-mini",
            store.clone(),
            notifier.clone(),
        );

        let outcome = processor.process(&location("someone_77.pdf")).await;
        match outcome {
            RecordOutcome::PersistedWithoutNotification {
                patient_id,
                persisted,
                kind,
                ref error,
            } => {
                assert_eq!(patient_id, 77);
                assert_eq!(persisted, 4);
                assert_eq!(kind, ErrorKind::PatientNotFound);
                assert!(error.contains("77"));
            }
            other => panic!("expected PersistedWithoutNotification, got {other:?}"),
        }
        assert_eq!(store.tests_for_patient(77).unwrap().len(), 4);
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn missing_patient_with_no_rows_is_a_plain_failure() {
        let objects = Arc::new(InMemoryObjectStore::new().with_object(BUCKET, "someone_77.pdf", b"%PDF"));
        let processor = ReportProcessor::new(
            objects,
            Arc::new(StaticTextExtractor::new(REPORT_TEXT)),
            Arc::new(MockLlmClient::new("[]")),
            "gpt-4o-mini",
            Arc::new(SqliteReportStore::open_in_memory().unwrap()),
            Arc::new(RecordingNotifier::new()),
        );

        let outcome = processor.process(&location("someone_77.pdf")).await;
        assert!(matches!(
            outcome,
            RecordOutcome::Failed {
                kind: ErrorKind::PatientNotFound,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn email_failure_keeps_rows() {
        let h = harness_with(
            MockLlmClient::new(FOUR_TESTS),
            RecordingNotifier::failing("connection reset"),
        );
        let outcome = h.processor.process(&location(KEY)).await;

        assert!(matches!(
            outcome,
            RecordOutcome::PersistedWithoutNotification {
                kind: ErrorKind::NotificationFailure,
                persisted: 4,
                ..
            }
        ));
        assert_eq!(h.store.count_tests().unwrap(), 4);
    }

    #[tokio::test]
    async fn key_without_patient_id_fails_after_model_call() {
        let objects = Arc::new(InMemoryObjectStore::new().with_object(BUCKET, "report.pdf", b"%PDF"));
        let llm = Arc::new(MockLlmClient::new(FOUR_TESTS));
        let store = Arc::new(SqliteReportStore::open_in_memory().unwrap());
        let processor = ReportProcessor::new(
            objects,
            Arc::new(StaticTextExtractor::new(REPORT_TEXT)),
            llm.clone(),
            "gpt-4o-mini",
            store.clone(),
            Arc::new(RecordingNotifier::new()),
        );

        let outcome = processor.process(&location("report.pdf")).await;
        assert_eq!(outcome.kind(), Some(ErrorKind::KeyFormat));
        assert_eq!(llm.calls().len(), 1);
        assert_eq!(store.count_tests().unwrap(), 0);
    }

    #[tokio::test]
    async fn model_call_failure_is_classified() {
        let h = harness_with(MockLlmClient::failing("503"), RecordingNotifier::new());
        let outcome = h.processor.process(&location(KEY)).await;
        assert_eq!(outcome.kind(), Some(ErrorKind::ModelCallFailure));
        assert_eq!(h.objects.requests().len(), 1);
    }

    /// Store that accepts inserts until `fail_on` (1-based), then errors.
    struct FlakyStore {
        fail_on: usize,
        inserted: std::sync::Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl ReportStore for FlakyStore {
        async fn insert_test(&self, test: &crate::models::ClassifiedTest) -> Result<(), DatabaseError> {
            let mut inserted = self.inserted.lock().map_err(|_| DatabaseError::LockPoisoned)?;
            if inserted.len() + 1 == self.fail_on {
                return Err(DatabaseError::InvalidTimestamp("disk full".into()));
            }
            inserted.push(test.test_type.clone());
            Ok(())
        }

        async fn find_patient_email(&self, _patient_id: i64) -> Result<Option<String>, DatabaseError> {
            Ok(Some("deepak@example.com".into()))
        }
    }

    #[tokio::test]
    async fn insert_failure_stops_remaining_rows_and_email() {
        let store = Arc::new(FlakyStore {
            fail_on: 2,
            inserted: std::sync::Mutex::new(Vec::new()),
        });
        let notifier = Arc::new(RecordingNotifier::new());
        let processor = ReportProcessor::new(
            Arc::new(InMemoryObjectStore::new().with_object(BUCKET, KEY, b"%PDF")),
            Arc::new(StaticTextExtractor::new(REPORT_TEXT)),
            Arc::new(MockLlmClient::new(
                r#"[
                  {"test_type": "A", "value": 1, "minlimit": 0, "maxlimit": 2, "unit": null, "timestamp": null},
                  {"test_type": "B", "value": 1, "minlimit": 0, "maxlimit": 2, "unit": null, "timestamp": null},
                  {"test_type": "C", "value": 1, "minlimit": 0, "maxlimit": 2, "unit": null, "timestamp": null}
                ]"#,
            )),
            "gpt-4o-mini",
            store.clone(),
            notifier.clone(),
        );

        let outcome = processor.process(&location(KEY)).await;
        assert!(matches!(
            outcome,
            RecordOutcome::PersistedWithoutNotification {
                patient_id: 3,
                persisted: 1,
                kind: ErrorKind::PersistenceFailure,
                ..
            }
        ));
        assert_eq!(*store.inserted.lock().unwrap(), vec!["A".to_string()]);
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn first_insert_failure_is_a_plain_failure() {
        let store = Arc::new(FlakyStore {
            fail_on: 1,
            inserted: std::sync::Mutex::new(Vec::new()),
        });
        let processor = ReportProcessor::new(
            Arc::new(InMemoryObjectStore::new().with_object(BUCKET, KEY, b"%PDF")),
            Arc::new(StaticTextExtractor::new(REPORT_TEXT)),
            Arc::new(MockLlmClient::new(FOUR_TESTS)),
            "gpt-4o-mini",
            store.clone(),
            Arc::new(RecordingNotifier::new()),
        );

        let outcome = processor.process(&location(KEY)).await;
        assert!(matches!(
            outcome,
            RecordOutcome::Failed {
                kind: ErrorKind::PersistenceFailure,
                ..
            }
        ));
        assert!(store.inserted.lock().unwrap().is_empty());
    }

    #[test]
    fn error_kinds_cover_every_variant() {
        assert_eq!(
            ProcessingError::from(KeyError::MissingKey).kind(),
            ErrorKind::MalformedRecord
        );
        assert_eq!(
            ProcessingError::from(KeyError::NoPatientId("x.pdf".into())).kind(),
            ErrorKind::KeyFormat
        );
        assert_eq!(
            ProcessingError::from(StructuringError::SchemaViolation("x".into())).kind(),
            ErrorKind::ModelResponseFormat
        );
        assert_eq!(
            ProcessingError::from(StructuringError::Connection("x".into())).kind(),
            ErrorKind::ModelCallFailure
        );
        assert_eq!(
            ProcessingError::from(ExtractionError::PdfParsing("x".into())).kind(),
            ErrorKind::ExtractionFailure
        );
        assert_eq!(
            ProcessingError::from(DatabaseError::LockPoisoned).kind(),
            ErrorKind::PersistenceFailure
        );
        assert_eq!(
            ProcessingError::from(NotificationError::Transport("x".into())).kind(),
            ErrorKind::NotificationFailure
        );
    }

    #[test]
    fn preview_is_bounded() {
        let long = "a".repeat(500);
        let p = preview(&long);
        assert_eq!(p.chars().count(), LOG_PREVIEW_CHARS + 1);
        assert_eq!(preview("short"), "short");
    }
}
