//! Attendance domain models.
//!
//! Defines the district attendance code vocabulary, the named categories those
//! codes map onto, and the per-student `AttendanceRecord` the parser produces.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// District attendance codes in match-priority order.
///
/// Entries that have another entry as a prefix come first (`PFD` before `P`,
/// `QEA` before `QA`), so a greedy scan in list order picks the longest code.
pub const DEFAULT_VOCABULARY: &[&str] = &[
    "QEA", "PFD", "N/E", "QA", "QP", "EA", "SA", "FT", "NC",
    "J", "H", "S", "I", "K", "M", "T", "A", "P", "V", "-",
];

/// "No entry" sentinel printed for days without a mark.
pub const NO_ENTRY: &str = "N/E";

/// Weekday banner glued in front of the first code of many rows.
pub const DAY_HEADER: &str = "MF";

/// Tokens that are never counted as a day.
pub const IGNORED_TOKENS: &[&str] = &["-", NO_ENTRY, DAY_HEADER, "MALE", "FEMALE"];

/// Named attendance categories tracked per student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceCategory {
    Present,
    Absent,
    Tardy,
    PlannedFutureDay,
    ExcusedAbsence,
    ExcusedAbsenceTransport,
    ExcusedAbsenceMedical,
    OutOfSchoolSuspension,
    InSchoolSuspension,
    SchoolActivity,
    FieldTrip,
    Testing,
    Homebound,
    NoClass,
    QuarantinePresent,
    QuarantineAbsent,
    QuarantineExcusedAbsence,
}

impl AttendanceCategory {
    pub const ALL: [AttendanceCategory; 17] = [
        Self::Present,
        Self::Absent,
        Self::Tardy,
        Self::PlannedFutureDay,
        Self::ExcusedAbsence,
        Self::ExcusedAbsenceTransport,
        Self::ExcusedAbsenceMedical,
        Self::OutOfSchoolSuspension,
        Self::InSchoolSuspension,
        Self::SchoolActivity,
        Self::FieldTrip,
        Self::Testing,
        Self::Homebound,
        Self::NoClass,
        Self::QuarantinePresent,
        Self::QuarantineAbsent,
        Self::QuarantineExcusedAbsence,
    ];

    /// District code printed on the attendance audit
    pub fn code(&self) -> &'static str {
        match self {
            Self::Present => "P",
            Self::Absent => "A",
            Self::Tardy => "T",
            Self::PlannedFutureDay => "PFD",
            Self::ExcusedAbsence => "EA",
            Self::ExcusedAbsenceTransport => "K",
            Self::ExcusedAbsenceMedical => "M",
            Self::OutOfSchoolSuspension => "S",
            Self::InSchoolSuspension => "I",
            Self::SchoolActivity => "SA",
            Self::FieldTrip => "FT",
            Self::Testing => "J",
            Self::Homebound => "H",
            Self::NoClass => "NC",
            Self::QuarantinePresent => "QP",
            Self::QuarantineAbsent => "QA",
            Self::QuarantineExcusedAbsence => "QEA",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::Absent => "Absent",
            Self::Tardy => "Tardy",
            Self::PlannedFutureDay => "Planned future day",
            Self::ExcusedAbsence => "Excused absence",
            Self::ExcusedAbsenceTransport => "Excused absence (transportation)",
            Self::ExcusedAbsenceMedical => "Excused absence (medical)",
            Self::OutOfSchoolSuspension => "Out-of-school suspension",
            Self::InSchoolSuspension => "In-school suspension",
            Self::SchoolActivity => "School activity",
            Self::FieldTrip => "Field trip",
            Self::Testing => "Testing",
            Self::Homebound => "Homebound",
            Self::NoClass => "No class",
            Self::QuarantinePresent => "Quarantine (present)",
            Self::QuarantineAbsent => "Quarantine (absent)",
            Self::QuarantineExcusedAbsence => "Quarantine (excused absence)",
        }
    }

    /// Look up the category for an already upper-cased code
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.code() == code)
    }

    /// Whether a day in this category counts toward total absences
    pub fn is_absence(&self) -> bool {
        matches!(
            self,
            Self::Absent
                | Self::ExcusedAbsence
                | Self::ExcusedAbsenceTransport
                | Self::ExcusedAbsenceMedical
                | Self::OutOfSchoolSuspension
                | Self::QuarantineAbsent
                | Self::QuarantineExcusedAbsence
        )
    }

    /// Whether a day in this category counts as attended for the tardy rate
    pub fn is_attended(&self) -> bool {
        matches!(
            self,
            Self::Present | Self::Tardy | Self::PlannedFutureDay | Self::QuarantinePresent
        )
    }
}

/// Per-student attendance tallies.
///
/// Counts only ever grow by one per recognized code. Codes outside the named
/// categories are kept in `other` so they stay visible for auditing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    counts: BTreeMap<AttendanceCategory, u32>,
    other: BTreeMap<String, u32>,
}

impl AttendanceRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, category: AttendanceCategory) -> u32 {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    pub fn other(&self) -> &BTreeMap<String, u32> {
        &self.other
    }

    pub fn record(&mut self, category: AttendanceCategory) {
        *self.counts.entry(category).or_insert(0) += 1;
    }

    pub fn record_other(&mut self, code: impl Into<String>) {
        *self.other.entry(code.into()).or_insert(0) += 1;
    }

    pub fn tardies(&self) -> u32 {
        self.count(AttendanceCategory::Tardy)
    }

    pub fn absences(&self) -> u32 {
        self.count(AttendanceCategory::Absent)
    }

    /// Every recorded day, unrecognized codes included
    pub fn total_days(&self) -> u32 {
        self.counts.values().sum::<u32>() + self.other.values().sum::<u32>()
    }

    pub fn total_absences(&self) -> u32 {
        self.counts
            .iter()
            .filter(|(category, _)| category.is_absence())
            .map(|(_, n)| *n)
            .sum()
    }

    pub fn percent_absent(&self) -> f64 {
        let total = self.total_days();
        if total == 0 {
            return 0.0;
        }
        self.total_absences() as f64 / total as f64 * 100.0
    }

    pub fn percent_tardy(&self) -> f64 {
        let attended: u32 = self
            .counts
            .iter()
            .filter(|(category, _)| category.is_attended())
            .map(|(_, n)| *n)
            .sum();
        if attended == 0 {
            return 0.0;
        }
        self.tardies() as f64 / attended as f64 * 100.0
    }

    pub fn summary(&self) -> AttendanceSummary {
        AttendanceSummary {
            total_days: self.total_days(),
            total_absences: self.total_absences(),
            tardies: self.tardies(),
            percent_absent: self.percent_absent(),
            percent_tardy: self.percent_tardy(),
        }
    }
}

/// Derived statistics for one record, computed on demand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    pub total_days: u32,
    pub total_absences: u32,
    pub tardies: u32,
    pub percent_absent: f64,
    pub percent_tardy: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_lookup_round_trips() {
        for category in AttendanceCategory::ALL {
            assert_eq!(AttendanceCategory::from_code(category.code()), Some(category));
        }
        assert_eq!(AttendanceCategory::from_code("V"), None);
        assert_eq!(AttendanceCategory::from_code("p"), None);
    }

    #[test]
    fn test_vocabulary_lists_longer_codes_before_their_prefixes() {
        for (i, code) in DEFAULT_VOCABULARY.iter().enumerate() {
            for later in &DEFAULT_VOCABULARY[i + 1..] {
                assert!(
                    !later.starts_with(code) || later == code,
                    "{} is listed before {}, which it prefixes",
                    code,
                    later
                );
            }
        }
    }

    #[test]
    fn test_every_category_code_is_in_vocabulary() {
        for category in AttendanceCategory::ALL {
            assert!(DEFAULT_VOCABULARY.contains(&category.code()));
        }
    }

    #[test]
    fn test_empty_record_has_zero_percentages() {
        let record = AttendanceRecord::new();
        assert_eq!(record.total_days(), 0);
        assert_eq!(record.percent_absent(), 0.0);
        assert_eq!(record.percent_tardy(), 0.0);
    }

    #[test]
    fn test_derived_totals() {
        let mut record = AttendanceRecord::new();
        for _ in 0..6 {
            record.record(AttendanceCategory::Present);
        }
        record.record(AttendanceCategory::Tardy);
        record.record(AttendanceCategory::Tardy);
        record.record(AttendanceCategory::Absent);
        record.record(AttendanceCategory::ExcusedAbsenceMedical);
        record.record_other("X");

        assert_eq!(record.total_days(), 11);
        assert_eq!(record.total_absences(), 2);
        assert!((record.percent_absent() - 2.0 / 11.0 * 100.0).abs() < 1e-9);
        assert!((record.percent_tardy() - 25.0).abs() < 1e-9);
        assert_eq!(record.other().get("X"), Some(&1));
    }

    #[test]
    fn test_only_other_codes_gives_zero_tardy_rate() {
        let mut record = AttendanceRecord::new();
        record.record_other("V");
        record.record(AttendanceCategory::Absent);
        assert_eq!(record.percent_tardy(), 0.0);
        assert_eq!(record.percent_absent(), 50.0);
    }
}
