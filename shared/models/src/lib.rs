//! # Reportcard Core Domain Models
//!
//! Domain types shared by the attendance parser and the letter services.
//!
//! ## Key Models
//!
//! - **AttendanceRecord**: per-student tallies of attendance codes plus derived rates
//! - **AttendanceCategory**: the named categories district codes map onto
//! - **StudentGrade**: one gradebook row with grade, percentage and missing work
//! - **LetterSettings**: teacher and class details printed on each letter

pub mod attendance;
pub mod student;


pub use attendance::*;
pub use student::*;
