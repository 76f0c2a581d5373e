//! Attendance Extractor
//! 
//! Drives the full parse: pages are joined into lines, lines are grouped
//! into logical rows, and each row is split, tokenized and aggregated.

use std::collections::BTreeMap;

use reportcard_models::AttendanceRecord;
use serde::Serialize;
use tracing::info;

use super::aggregator::AttendanceAggregator;
use super::joiner::ContinuationJoiner;
use super::observer::{NoopObserver, ParseObserver, SkipReason};
use super::parser_config::ParserConfig;
use super::splitter::RowSplitter;
use super::tokenizer::CodeTokenizer;

/// Row that produced no record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub line_number: usize,
    pub reason: SkipReason,
    pub text: String,
}

/// Counters collected during one parse
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseSummary {
    pub index_lines: usize,
    pub rows_parsed: usize,
    pub rows_skipped: usize,
    pub continuation_lines: usize,
    /// `Total Membership: N` values in document order
    pub membership_totals: Vec<u32>,
    pub skipped: Vec<SkippedRow>,
}

impl ParseSummary {
    pub fn expected_students(&self) -> Option<u32> {
        if self.membership_totals.is_empty() {
            None
        } else {
            Some(self.membership_totals.iter().sum())
        }
    }
}

/// Parse result with its summary
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParsedAttendance {
    pub records: BTreeMap<String, AttendanceRecord>,
    pub summary: ParseSummary,
}

/// Attendance audit parser
#[derive(Debug, Clone, Default)]
pub struct AttendanceExtractor {
    config: ParserConfig,
}

impl AttendanceExtractor {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse page texts into per-student records keyed by normalized name
    pub fn parse<S: AsRef<str>>(&self, pages: &[S]) -> BTreeMap<String, AttendanceRecord> {
        self.parse_with_summary(pages, &mut NoopObserver).records
    }

    /// Parse a single block of text
    pub fn parse_text(&self, text: &str) -> BTreeMap<String, AttendanceRecord> {
        self.parse(&[text])
    }

    pub fn parse_with_summary<S: AsRef<str>>(
        &self,
        pages: &[S],
        observer: &mut dyn ParseObserver,
    ) -> ParsedAttendance {
        let text = pages
            .iter()
            .map(|page| page.as_ref())
            .collect::<Vec<_>>()
            .join("\n");
        let lines: Vec<&str> = text.split('\n').collect();

        let mut summary = ParseSummary {
            membership_totals: self.membership_totals(&lines),
            ..ParseSummary::default()
        };

        let rows = ContinuationJoiner::new(&self.config).join(&lines);
        let splitter = RowSplitter::new(&self.config);
        let tokenizer = CodeTokenizer::new(&self.config);
        let mut aggregator = AttendanceAggregator::new();

        summary.index_lines = rows.len();
        observer.progress(0);

        for (i, row) in rows.iter().enumerate() {
            observer.row_opened(row.line_number, &row.text);
            for &line_number in &row.continuations {
                observer.line_joined(row.line_number, line_number);
            }
            summary.continuation_lines += row.continuations.len();

            let split = splitter.split(&row.text);
            let tokens = tokenizer.tokenize(&split.codes);

            let skip = if !split.anchored {
                Some(SkipReason::NoNumericColumns)
            } else if split.name.is_empty() {
                Some(SkipReason::MissingName)
            } else if tokens.is_empty() {
                Some(SkipReason::MissingCodes)
            } else {
                None
            };

            match skip {
                Some(reason) => {
                    observer.row_skipped(row, reason);
                    summary.rows_skipped += 1;
                    summary.skipped.push(SkippedRow {
                        line_number: row.line_number,
                        reason,
                        text: row.text.clone(),
                    });
                }
                None => {
                    for token in &tokens {
                        aggregator.add_code(&split.name, token);
                    }
                    observer.row_parsed(row, &split.name, &tokens);
                    summary.rows_parsed += 1;
                }
            }

            observer.progress(((i + 1) * 100 / rows.len()) as u8);
        }

        if rows.is_empty() {
            observer.progress(100);
        }

        let records = aggregator.finish();
        info!(
            students = records.len(),
            parsed = summary.rows_parsed,
            skipped = summary.rows_skipped,
            "Parsed attendance audit"
        );

        ParsedAttendance { records, summary }
    }

    fn membership_totals(&self, lines: &[&str]) -> Vec<u32> {
        lines
            .iter()
            .flat_map(|line| self.config.membership_total.captures_iter(line))
            .filter_map(|caps| caps.get(1)?.as_str().parse().ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::LogicalRow;
    use reportcard_models::AttendanceCategory;

    #[test]
    fn test_empty_input_gives_empty_map() {
        let extractor = AttendanceExtractor::default();
        assert!(extractor.parse::<&str>(&[]).is_empty());
        assert!(extractor.parse(&[""]).is_empty());
    }

    #[test]
    fn test_single_row() {
        let extractor = AttendanceExtractor::default();
        let records = extractor.parse_text("3. Smith, John 85 A 7   PA T P");
        let record = &records["John Smith"];
        assert_eq!(record.count(AttendanceCategory::Present), 2);
        assert_eq!(record.absences(), 1);
        assert_eq!(record.tardies(), 1);
    }

    #[test]
    fn test_row_without_digits_is_skipped() {
        let extractor = AttendanceExtractor::default();
        let parsed = extractor.parse_with_summary(&["1. Smith, John PPA"], &mut NoopObserver);
        assert!(parsed.records.is_empty());
        assert_eq!(parsed.summary.rows_skipped, 1);
        assert_eq!(parsed.summary.skipped[0].reason, SkipReason::NoNumericColumns);
    }

    #[test]
    fn test_accented_and_plain_names_merge() {
        let extractor = AttendanceExtractor::default();
        let records = extractor.parse(&[
            "1. García, José 9 2 P A",
            "1. GARCIA, JOSE 9 1 T",
        ]);
        assert_eq!(records.len(), 1);
        assert_eq!(records["Jose Garcia"].total_days(), 3);
    }

    #[test]
    fn test_membership_totals_collected() {
        let extractor = AttendanceExtractor::default();
        let parsed = extractor.parse_with_summary(
            &["Total Membership: 2\n1. Smith, John 9 1 P", "TOTAL MEMBERSHIP: 3"],
            &mut NoopObserver,
        );
        assert_eq!(parsed.summary.membership_totals, vec![2, 3]);
        assert_eq!(parsed.summary.expected_students(), Some(5));
    }

    #[test]
    fn test_observer_sees_every_row() {
        #[derive(Default)]
        struct Counting {
            opened: usize,
            parsed: usize,
            skipped: usize,
            last_progress: u8,
        }
        impl ParseObserver for Counting {
            fn row_opened(&mut self, _line: usize, _text: &str) {
                self.opened += 1;
            }
            fn row_parsed(&mut self, _row: &LogicalRow, _student: &str, _tokens: &[&str]) {
                self.parsed += 1;
            }
            fn row_skipped(&mut self, _row: &LogicalRow, _reason: SkipReason) {
                self.skipped += 1;
            }
            fn progress(&mut self, percent: u8) {
                self.last_progress = percent;
            }
        }

        let mut observer = Counting::default();
        AttendanceExtractor::default().parse_with_summary(
            &["1. Smith, John 9 1 P\n2. 4 4 P\n3. Doe, Jane 9 2 A T"],
            &mut observer,
        );
        assert_eq!(observer.opened, 3);
        assert_eq!(observer.parsed, 2);
        assert_eq!(observer.skipped, 1);
        assert_eq!(observer.last_progress, 100);
    }
}
