//! PDF Processor
//! 
//! Pulls the text layer out of attendance audit PDFs, one string per page.

use std::sync::Arc;

use reportcard_utils::{ReportError, ReportResult};
use tokio::task::JoinError;

/// Text content of a PDF
#[derive(Debug, Clone)]
pub struct PdfText {
    pub pages: Vec<String>,
}

impl PdfText {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Whether no page carries any text (e.g. a scanned audit)
    pub fn is_blank(&self) -> bool {
        self.pages.iter().all(|page| page.trim().is_empty())
    }
}

/// PDF processor
#[derive(Debug, Clone, Copy)]
pub struct PdfProcessor;

impl PdfProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Extract page texts from PDF bytes
    pub fn extract(&self, data: &[u8]) -> ReportResult<PdfText> {
        if !data.starts_with(b"%PDF") {
            return Err(ReportError::extraction("File is not a PDF document"));
        }

        let pages = pdf_extract::extract_text_from_mem_by_pages(data)
            .map_err(|e| ReportError::extraction(format!("Failed to extract text from PDF: {}", e)))?;

        Ok(PdfText { pages })
    }

    /// Extract on the blocking pool, off the async runtime threads
    pub async fn extract_blocking(&self, data: Arc<Vec<u8>>) -> ReportResult<PdfText> {
        let processor = self.clone();
        run_blocking(move || processor.extract(&data)).await
    }
}

async fn run_blocking<F>(job: F) -> ReportResult<PdfText>
where
    F: FnOnce() -> ReportResult<PdfText> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(extraction_aborted)?
}

// pdf-extract can panic on malformed documents.
fn extraction_aborted(e: JoinError) -> ReportError {
    if e.is_panic() {
        ReportError::extraction("PDF parser crashed on this document")
    } else {
        ReportError::extraction(format!("PDF extraction was cancelled: {}", e))
    }
}

impl Default for PdfProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_pdf_bytes() {
        let err = PdfProcessor::new().extract(b"Student,Grade\n").unwrap_err();
        assert_eq!(err.error_code(), "TEXT_EXTRACTION_ERROR");
        assert_eq!(err.http_status_code(), 422);
    }

    #[test]
    fn test_truncated_pdf_is_extraction_error() {
        let err = PdfProcessor::new().extract(b"%PDF-1.4\n%%EOF").unwrap_err();
        assert_eq!(err.http_status_code(), 422);
    }

    #[tokio::test]
    async fn test_blocking_extract_rejects_non_pdf() {
        let data = Arc::new(b"Student,Grade\n".to_vec());
        let err = PdfProcessor::new().extract_blocking(data).await.unwrap_err();
        assert_eq!(err.http_status_code(), 422);
    }

    #[tokio::test]
    async fn test_parser_panic_is_extraction_error() {
        let err = run_blocking(|| panic!("malformed xref table")).await.unwrap_err();
        assert_eq!(err.error_code(), "TEXT_EXTRACTION_ERROR");
        assert_eq!(err.http_status_code(), 422);
    }

    #[test]
    fn test_blank_text() {
        let text = PdfText { pages: vec!["  \n".to_string(), String::new()] };
        assert!(text.is_blank());
        assert_eq!(text.page_count(), 2);
    }
}
