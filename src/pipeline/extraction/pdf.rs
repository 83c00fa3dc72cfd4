use std::sync::Arc;

use super::ExtractionError;

/// PDF text extraction abstraction (allows mocking for tests)
pub trait PdfExtractor: Send + Sync {
    /// Plain text of the whole document, pages concatenated in order.
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// PDF text extractor using the pdf-extract crate.
/// Handles digital PDFs with embedded text layers.
pub struct PdfTextExtractor;

impl PdfExtractor for PdfTextExtractor {
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
        pdf_extract::extract_text_from_mem(pdf_bytes)
            .map_err(|e| ExtractionError::PdfParsing(e.to_string()))
    }
}

/// Run extraction on the blocking pool; PDF parsing is CPU-bound.
pub async fn extract_text_blocking(
    extractor: Arc<dyn PdfExtractor>,
    pdf_bytes: Vec<u8>,
) -> Result<String, ExtractionError> {
    tokio::task::spawn_blocking(move || extractor.extract_text(&pdf_bytes))
        .await
        .map_err(|e| ExtractionError::Task(e.to_string()))?
}

/// Fixed-text extractor for tests and local dry runs.
pub struct StaticTextExtractor {
    text: String,
}

impl StaticTextExtractor {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

impl PdfExtractor for StaticTextExtractor {
    fn extract_text(&self, _pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
        Ok(self.text.clone())
    }
}
