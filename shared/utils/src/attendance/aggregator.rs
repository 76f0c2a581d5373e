//! Attendance aggregator
//! 
//! Accumulates code tokens into per-student `AttendanceRecord`s.

use std::collections::BTreeMap;

use reportcard_models::{AttendanceCategory, AttendanceRecord, IGNORED_TOKENS};

/// What happened to one token passed to `add_code`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeOutcome {
    Counted(AttendanceCategory),
    /// Not a named category; tallied under `other`
    Other(String),
    /// Empty, sentinel or banner token
    Ignored,
}

/// Per-student tally keyed by normalized name
#[derive(Debug, Default)]
pub struct AttendanceAggregator {
    records: BTreeMap<String, AttendanceRecord>,
}

impl AttendanceAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one token for a student.
    ///
    /// The student's record is created on first sight, even when the token
    /// itself is ignored.
    pub fn add_code(&mut self, student: &str, token: &str) -> CodeOutcome {
        let record = self.records.entry(student.to_string()).or_default();

        let code = token.trim().to_uppercase();
        if code.is_empty() || IGNORED_TOKENS.contains(&code.as_str()) {
            return CodeOutcome::Ignored;
        }

        match AttendanceCategory::from_code(&code) {
            Some(category) => {
                record.record(category);
                CodeOutcome::Counted(category)
            }
            None => {
                record.record_other(code.clone());
                CodeOutcome::Other(code)
            }
        }
    }

    pub fn get(&self, student: &str) -> Option<&AttendanceRecord> {
        self.records.get(student)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consume the aggregator, returning records sorted by student
    pub fn finish(self) -> BTreeMap<String, AttendanceRecord> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_named_categories() {
        let mut aggregator = AttendanceAggregator::new();
        for token in ["P", "P", "A", "T", "pfd"] {
            aggregator.add_code("John Smith", token);
        }

        let record = aggregator.get("John Smith").unwrap();
        assert_eq!(record.count(AttendanceCategory::Present), 2);
        assert_eq!(record.absences(), 1);
        assert_eq!(record.tardies(), 1);
        assert_eq!(record.count(AttendanceCategory::PlannedFutureDay), 1);
        assert_eq!(record.total_days(), 5);
    }

    #[test]
    fn test_ignored_tokens() {
        let mut aggregator = AttendanceAggregator::new();
        for token in ["", "  ", "-", "N/E", "MF", "male", "FEMALE"] {
            assert_eq!(aggregator.add_code("Ana Perez", token), CodeOutcome::Ignored);
        }
        assert_eq!(aggregator.get("Ana Perez").unwrap().total_days(), 0);
    }

    #[test]
    fn test_unknown_codes_go_to_other() {
        let mut aggregator = AttendanceAggregator::new();
        assert_eq!(aggregator.add_code("Ana Perez", "v"), CodeOutcome::Other("V".to_string()));
        aggregator.add_code("Ana Perez", "X");
        aggregator.add_code("Ana Perez", "X");

        let record = aggregator.get("Ana Perez").unwrap();
        assert_eq!(record.other().get("X"), Some(&2));
        assert_eq!(record.total_days(), 3);
    }

    #[test]
    fn test_finish_is_sorted() {
        let mut aggregator = AttendanceAggregator::new();
        aggregator.add_code("Zoe Adams", "P");
        aggregator.add_code("Amy Brown", "P");
        let names: Vec<String> = aggregator.finish().into_keys().collect();
        assert_eq!(names, vec!["Amy Brown", "Zoe Adams"]);
    }
}
