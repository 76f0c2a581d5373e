//! Parse observers
//! 
//! Hooks for watching the extractor work through a document. Every method
//! has a no-op default, so an observer only implements what it needs.

use serde::Serialize;
use tracing::{debug, trace};

use super::joiner::LogicalRow;

/// Why a logical row produced no record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No numeric column to split name from codes
    NoNumericColumns,
    MissingName,
    MissingCodes,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoNumericColumns => "no numeric columns",
            Self::MissingName => "missing name",
            Self::MissingCodes => "missing codes",
        }
    }
}

pub trait ParseObserver {
    fn row_opened(&mut self, _line_number: usize, _text: &str) {}

    fn line_joined(&mut self, _row_line: usize, _line_number: usize) {}

    fn row_parsed(&mut self, _row: &LogicalRow, _student: &str, _tokens: &[&str]) {}

    fn row_skipped(&mut self, _row: &LogicalRow, _reason: SkipReason) {}

    /// Rough completion percentage, 0 to 100
    fn progress(&mut self, _percent: u8) {}
}

/// Observer that does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ParseObserver for NoopObserver {}

/// Observer that reports parser decisions as tracing events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ParseObserver for TracingObserver {
    fn row_opened(&mut self, line_number: usize, text: &str) {
        trace!(line = line_number, text, "Opened attendance row");
    }

    fn line_joined(&mut self, row_line: usize, line_number: usize) {
        trace!(row = row_line, line = line_number, "Joined continuation line");
    }

    fn row_parsed(&mut self, row: &LogicalRow, student: &str, tokens: &[&str]) {
        debug!(
            line = row.line_number,
            student,
            codes = tokens.len(),
            continuations = row.continuations.len(),
            "Parsed attendance row"
        );
    }

    fn row_skipped(&mut self, row: &LogicalRow, reason: SkipReason) {
        debug!(
            line = row.line_number,
            reason = reason.as_str(),
            text = %row.text,
            "Skipped attendance row"
        );
    }
}

/// Forwards progress updates to a callback
pub struct ProgressObserver<F: FnMut(u8)> {
    callback: F,
    last: Option<u8>,
}

impl<F: FnMut(u8)> ProgressObserver<F> {
    pub fn new(callback: F) -> Self {
        Self { callback, last: None }
    }
}

impl<F: FnMut(u8)> ParseObserver for ProgressObserver<F> {
    fn progress(&mut self, percent: u8) {
        // Only report changes
        if self.last != Some(percent) {
            self.last = Some(percent);
            (self.callback)(percent);
        }
    }
}
