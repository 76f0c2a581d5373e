//! Gradebook File Parser
//! 
//! The first column holds the student as "Last, First", the second holds the
//! grade and percentage ("B 84.5%"), and every other column is an assignment
//! score.

use std::path::Path;

use reportcard_models::StudentGrade;
use serde::Serialize;

use crate::error::{ReportError, ReportResult};
use crate::names::{display_name, normalize_name};

/// Supported gradebook file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GradebookFormat {
    Csv,
    Excel,
}

impl GradebookFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" => Some(Self::Excel),
            _ => None,
        }
    }

    /// Detect format from content type header
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type {
            "text/csv" | "application/csv" => Some(Self::Csv),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => Some(Self::Excel),
            _ => None,
        }
    }
}

/// Parsed gradebook with metadata
#[derive(Debug, Clone, Serialize)]
pub struct ParsedGradebook {
    pub filename: String,
    pub format: GradebookFormat,
    pub students: Vec<StudentGrade>,
    pub assignment_columns: Vec<String>,
    pub total_rows: usize,
    pub warnings: Vec<String>,
}

/// Gradebook parser
pub struct GradebookParser {
    /// Scores that mark an assignment as missing
    missing_markers: Vec<String>,
}

impl Default for GradebookParser {
    fn default() -> Self {
        Self {
            missing_markers: vec!["0".to_string(), "0.0".to_string()],
        }
    }
}

impl GradebookParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse gradebook file from bytes
    pub fn parse_bytes(
        &self,
        filename: &str,
        data: &[u8],
        format: Option<GradebookFormat>,
    ) -> ReportResult<ParsedGradebook> {
        let format = format
            .or_else(|| GradebookFormat::from_extension(Path::new(filename)))
            .ok_or_else(|| {
                ReportError::gradebook(format!("Could not determine file format of {}", filename))
            })?;

        let (headers, rows) = match format {
            GradebookFormat::Csv => self.read_csv(data)?,
            GradebookFormat::Excel => self.read_excel(data)?,
        };
        if headers.len() < 2 {
            return Err(ReportError::gradebook(
                "Header row must name a student column and a grade column",
            ));
        }

        Ok(self.build(filename, format, headers, rows))
    }

    fn read_csv(&self, data: &[u8]) -> ReportResult<(Vec<String>, Vec<Vec<String>>)> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(data);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(|v| v.to_string()).collect());
        }

        Ok((headers, rows))
    }

    fn read_excel(&self, data: &[u8]) -> ReportResult<(Vec<String>, Vec<Vec<String>>)> {
        use calamine::{open_workbook_from_rs, DataType, Reader, Xlsx};

        let cursor = std::io::Cursor::new(data);
        let mut workbook: Xlsx<_> = open_workbook_from_rs(cursor)?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ReportError::gradebook("No sheets found in workbook"))?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .ok_or_else(|| ReportError::gradebook(format!("Failed to read worksheet {}", sheet_name)))??;

        let mut rows_iter = range.rows();
        let headers: Vec<String> = match rows_iter.next() {
            Some(row) => row
                .iter()
                .map(|cell: &DataType| cell.to_string().trim().to_string())
                .collect(),
            None => Vec::new(),
        };

        let rows: Vec<Vec<String>> = rows_iter
            .map(|row| row.iter().map(|cell: &DataType| cell.to_string()).collect())
            .collect();

        Ok((headers, rows))
    }

    fn build(
        &self,
        filename: &str,
        format: GradebookFormat,
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    ) -> ParsedGradebook {
        let mut students = Vec::new();
        let mut warnings = Vec::new();
        let total_rows = rows.len();

        for (idx, cells) in rows.iter().enumerate() {
            // Header is line 1
            let row_number = idx + 2;
            if cells.iter().all(|c| c.trim().is_empty()) {
                continue;
            }
            match self.map_row(&headers, cells) {
                Ok(student) => students.push(student),
                Err(message) => warnings.push(format!("Row {}: {}", row_number, message)),
            }
        }

        ParsedGradebook {
            filename: filename.to_string(),
            format,
            students,
            assignment_columns: headers.iter().skip(2).cloned().collect(),
            total_rows,
            warnings,
        }
    }

    fn map_row(&self, headers: &[String], cells: &[String]) -> Result<StudentGrade, String> {
        let raw_name = cells.first().map(|c| c.trim()).unwrap_or("");
        let name = normalize_name(raw_name);
        if name.is_empty() {
            return Err("missing student name, skipped".to_string());
        }

        let grade_cell = cells.get(1).map(|c| c.trim()).unwrap_or("");
        let mut parts = grade_cell.split_whitespace();
        let (grade, percent) = match (parts.next(), parts.next()) {
            (Some(grade), Some(percent)) => (grade.to_string(), percent.to_string()),
            _ => {
                return Err(format!(
                    "expected \"<grade> <percent>\" for {}, found {:?}",
                    raw_name, grade_cell
                ))
            }
        };

        let missing_assignments = headers
            .iter()
            .enumerate()
            .skip(2)
            .filter(|(i, _)| {
                cells
                    .get(*i)
                    .map(|v| self.missing_markers.iter().any(|m| m == v.trim()))
                    .unwrap_or(false)
            })
            .map(|(_, header)| header.clone())
            .collect();

        Ok(StudentGrade {
            first_name: name.split(' ').next().unwrap_or("").to_string(),
            display_name: display_name(raw_name),
            name,
            grade,
            percent,
            missing_assignments,
        })
    }
}
