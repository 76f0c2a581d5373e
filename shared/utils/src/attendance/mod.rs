//! Attendance Audit Parsing
//! 
//! Turns the page text of a district attendance audit into per-student
//! attendance tallies. The pipeline is line joining, row splitting, code
//! tokenizing and aggregation, driven by `AttendanceExtractor`.

pub mod parser_config;
pub mod tokenizer;
pub mod splitter;
pub mod joiner;
pub mod aggregator;
pub mod observer;
pub mod extractor;
pub mod validator;

pub use parser_config::{ParserConfig, UnknownCodePolicy, DEFAULT_FOOTER_PATTERNS, DEFAULT_SECTION_PATTERNS};
pub use tokenizer::CodeTokenizer;
pub use splitter::{RowSplitter, SplitRow};
pub use joiner::{ContinuationJoiner, LogicalRow};
pub use aggregator::{AttendanceAggregator, CodeOutcome};
pub use observer::{NoopObserver, ParseObserver, ProgressObserver, SkipReason, TracingObserver};
pub use extractor::{AttendanceExtractor, ParseSummary, ParsedAttendance, SkippedRow};
pub use validator::{AttendanceValidator, ValidationIssue, ValidationResult, ValidationSeverity, ValidationSummary};
