pub mod pdf;

pub use pdf::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("Extraction task failed: {0}")]
    Task(String),
}
