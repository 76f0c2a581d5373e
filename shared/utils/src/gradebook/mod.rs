//! Gradebook Import Module
//! 
//! Reads teacher gradebook exports (CSV or XLSX) into `StudentGrade` rows.

pub mod parser;

pub use parser::{GradebookFormat, GradebookParser, ParsedGradebook};
