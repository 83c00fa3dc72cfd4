pub mod event;
pub mod storage;
pub mod extraction;
pub mod structuring;
pub mod classify;
pub mod processor;
pub mod dispatcher;

pub use dispatcher::{BatchSummary, RecordReport, ReportIngestionHandler};
pub use processor::{ProcessingError, RecordOutcome, ReportProcessor};
