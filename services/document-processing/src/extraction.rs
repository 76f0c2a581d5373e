//! Attendance Extraction Service
//! 
//! Keeps uploaded audits in memory and runs the attendance parser over them.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use reportcard_models::{AttendanceRecord, AttendanceSummary};
use reportcard_utils::{
    AttendanceExtractor, AttendanceValidator, ParseSummary, ReportError, ReportResult,
    TracingObserver, ValidationResult,
};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::pdf_processor::PdfProcessor;

/// Processing state of an uploaded audit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditStatus {
    Uploaded,
    Extracted,
    Failed,
}

/// Stored audit document
#[derive(Debug, Clone)]
pub struct StoredAudit {
    pub id: Uuid,
    pub filename: String,
    pub file_type: String,
    pub upload_date: String,
    pub status: AuditStatus,
    pub data: Arc<Vec<u8>>,
    pub extraction: Option<AuditExtraction>,
    pub error: Option<String>,
}

/// Parser output for one audit
#[derive(Debug, Clone, Serialize)]
pub struct AuditExtraction {
    pub page_count: usize,
    pub records: BTreeMap<String, AttendanceRecord>,
    pub summary: ParseSummary,
    pub validation: ValidationResult,
}

impl AuditExtraction {
    pub fn student_summaries(&self) -> Vec<StudentAttendance> {
        self.records
            .iter()
            .map(|(name, record)| StudentAttendance {
                name: name.clone(),
                summary: record.summary(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentAttendance {
    pub name: String,
    pub summary: AttendanceSummary,
}

/// Attendance extraction service
#[derive(Clone)]
pub struct AttendanceService {
    audits: Arc<RwLock<HashMap<Uuid, StoredAudit>>>,
    pdf_processor: Arc<PdfProcessor>,
    extractor: Arc<AttendanceExtractor>,
    validator: Arc<AttendanceValidator>,
}

impl AttendanceService {
    pub fn new(extractor: AttendanceExtractor) -> Self {
        Self {
            audits: Arc::new(RwLock::new(HashMap::new())),
            pdf_processor: Arc::new(PdfProcessor::new()),
            extractor: Arc::new(extractor),
            validator: Arc::new(AttendanceValidator::new()),
        }
    }

    /// Store uploaded audit
    pub async fn store_document(&self, filename: &str, file_type: &str, data: &[u8]) -> Uuid {
        let id = Uuid::new_v4();
        let audit = StoredAudit {
            id,
            filename: filename.to_string(),
            file_type: file_type.to_string(),
            upload_date: chrono::Utc::now().to_rfc3339(),
            status: AuditStatus::Uploaded,
            data: Arc::new(data.to_vec()),
            extraction: None,
            error: None,
        };

        let mut audits = self.audits.write().await;
        audits.insert(id, audit);

        id
    }

    /// Get audit by ID
    pub async fn get_document(&self, id: Uuid) -> ReportResult<StoredAudit> {
        let audits = self.audits.read().await;
        audits
            .get(&id)
            .cloned()
            .ok_or_else(|| ReportError::not_found(format!("attendance audit {}", id)))
    }

    /// Extract attendance from a stored audit and keep the result
    pub async fn extract(&self, id: Uuid) -> ReportResult<AuditExtraction> {
        let data = self.get_document(id).await?.data;

        let outcome = self
            .pdf_processor
            .extract_blocking(data)
            .await
            .map(|text| {
                if text.is_blank() {
                    warn!(audit_id = %id, "PDF has no text layer");
                }
                self.parse_pages(&text.pages)
            });

        let mut audits = self.audits.write().await;
        let audit = audits
            .get_mut(&id)
            .ok_or_else(|| ReportError::not_found(format!("attendance audit {}", id)))?;

        match outcome {
            Ok(extraction) => {
                info!(
                    audit_id = %id,
                    students = extraction.records.len(),
                    pages = extraction.page_count,
                    "Extracted attendance"
                );
                audit.status = AuditStatus::Extracted;
                audit.error = None;
                audit.extraction = Some(extraction.clone());
                Ok(extraction)
            }
            Err(e) => {
                warn!(audit_id = %id, error = %e, "Attendance extraction failed");
                audit.status = AuditStatus::Failed;
                audit.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Parse page texts that were extracted elsewhere
    pub fn parse_pages<S: AsRef<str>>(&self, pages: &[S]) -> AuditExtraction {
        let parsed = self.extractor.parse_with_summary(pages, &mut TracingObserver);
        let validation = self.validator.validate(&parsed);

        AuditExtraction {
            page_count: pages.len(),
            records: parsed.records,
            summary: parsed.summary,
            validation,
        }
    }
}

impl Default for AttendanceService {
    fn default() -> Self {
        Self::new(AttendanceExtractor::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pages() {
        let service = AttendanceService::default();
        let extraction = service.parse_pages(&[
            "Total Membership: 1\n1. Smith, John 9 4 PPAT",
            "Page 2 of 2",
        ]);

        assert_eq!(extraction.page_count, 2);
        assert!(extraction.validation.is_valid);
        let students = extraction.student_summaries();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].name, "John Smith");
        assert_eq!(students[0].summary.total_days, 4);
        assert_eq!(students[0].summary.tardies, 1);
    }

    #[tokio::test]
    async fn test_store_and_get() {
        let service = AttendanceService::default();
        let id = service.store_document("audit.pdf", "application/pdf", b"%PDF-1.4").await;

        let audit = service.get_document(id).await.unwrap();
        assert_eq!(audit.filename, "audit.pdf");
        assert_eq!(audit.status, AuditStatus::Uploaded);
    }

    #[tokio::test]
    async fn test_unknown_audit_is_not_found() {
        let service = AttendanceService::default();
        let err = service.extract(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.http_status_code(), 404);
    }

    #[tokio::test]
    async fn test_unreadable_pdf_marks_audit_failed() {
        let service = AttendanceService::default();
        let id = service.store_document("audit.pdf", "application/pdf", b"not a pdf").await;

        let err = service.extract(id).await.unwrap_err();
        assert_eq!(err.http_status_code(), 422);

        let audit = service.get_document(id).await.unwrap();
        assert_eq!(audit.status, AuditStatus::Failed);
        assert!(audit.error.is_some());
    }
}
