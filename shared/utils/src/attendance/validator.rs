//! Attendance Validator
//! 
//! Checks a parse result for completeness against the totals printed in the
//! audit itself.

use serde::Serialize;

use super::extractor::ParsedAttendance;

/// Validation severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

/// Single validation issue
#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub severity: ValidationSeverity,
    /// One-based source line, when the issue belongs to a row
    pub line: Option<usize>,
    pub student: Option<String>,
    pub message: String,
}

/// Validation result for a parsed audit
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub error_count: usize,
    pub warning_count: usize,
    pub issues: Vec<ValidationIssue>,
    pub summary: ValidationSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationSummary {
    pub students: usize,
    pub expected_students: Option<u32>,
    pub rows_skipped: usize,
    pub records_with_other_codes: usize,
}

pub struct AttendanceValidator {
    check_membership: bool,
    report_other_codes: bool,
}

impl Default for AttendanceValidator {
    fn default() -> Self {
        Self {
            check_membership: true,
            report_other_codes: true,
        }
    }
}

impl AttendanceValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_membership_check(mut self, enabled: bool) -> Self {
        self.check_membership = enabled;
        self
    }

    pub fn with_other_code_report(mut self, enabled: bool) -> Self {
        self.report_other_codes = enabled;
        self
    }

    pub fn validate(&self, parsed: &ParsedAttendance) -> ValidationResult {
        let mut issues = Vec::new();
        let students = parsed.records.len();
        let expected_students = parsed.summary.expected_students();

        if students == 0 {
            issues.push(ValidationIssue {
                severity: ValidationSeverity::Warning,
                line: None,
                student: None,
                message: "No attendance records found".to_string(),
            });
        }

        if let (true, Some(expected)) = (self.check_membership, expected_students) {
            let expected = expected as usize;
            if students < expected {
                issues.push(ValidationIssue {
                    severity: ValidationSeverity::Error,
                    line: None,
                    student: None,
                    message: format!(
                        "Parsed {} students but the audit lists {} in total membership",
                        students, expected
                    ),
                });
            } else if students > expected {
                issues.push(ValidationIssue {
                    severity: ValidationSeverity::Warning,
                    line: None,
                    student: None,
                    message: format!(
                        "Parsed {} students, more than the {} in total membership",
                        students, expected
                    ),
                });
            }
        }

        for row in &parsed.summary.skipped {
            issues.push(ValidationIssue {
                severity: ValidationSeverity::Warning,
                line: Some(row.line_number + 1),
                student: None,
                message: format!("Row skipped ({}): {}", row.reason.as_str(), row.text),
            });
        }

        let mut records_with_other_codes = 0;
        for (student, record) in &parsed.records {
            if record.other().is_empty() {
                continue;
            }
            records_with_other_codes += 1;
            if self.report_other_codes {
                let codes: Vec<String> = record
                    .other()
                    .iter()
                    .map(|(code, n)| format!("{} x{}", code, n))
                    .collect();
                issues.push(ValidationIssue {
                    severity: ValidationSeverity::Info,
                    line: None,
                    student: Some(student.clone()),
                    message: format!("Unrecognized codes: {}", codes.join(", ")),
                });
            }
        }

        let error_count = issues.iter().filter(|i| i.severity == ValidationSeverity::Error).count();
        let warning_count = issues.iter().filter(|i| i.severity == ValidationSeverity::Warning).count();

        ValidationResult {
            is_valid: error_count == 0,
            error_count,
            warning_count,
            issues,
            summary: ValidationSummary {
                students,
                expected_students,
                rows_skipped: parsed.summary.rows_skipped,
                records_with_other_codes,
            },
        }
    }
}
