//! Gradebook student models.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// One student row from a gradebook export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentGrade {
    /// Normalized "First Last" key, shared with attendance records
    pub name: String,
    /// Name as printed in the letter
    pub display_name: String,
    pub first_name: String,
    /// Letter grade, e.g. "B"
    pub grade: String,
    /// Percentage as exported, e.g. "84.5%"
    pub percent: String,
    pub missing_assignments: Vec<String>,
}

impl StudentGrade {
    /// Numeric percentage, if the exported text parses
    pub fn percent_value(&self) -> Option<f64> {
        self.percent.trim().trim_end_matches('%').trim().parse().ok()
    }

    pub fn missing_count(&self) -> usize {
        self.missing_assignments.len()
    }

    /// Whether the student's grade is under the given cutoff.
    ///
    /// Students whose percentage cannot be read are never filtered out.
    pub fn is_below(&self, cutoff: f64) -> bool {
        self.percent_value().map(|p| p < cutoff).unwrap_or(true)
    }
}

/// Teacher and class details printed on every letter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct LetterSettings {
    #[validate(length(min = 1, max = 255, message = "Teacher name must be between 1 and 255 characters"))]
    pub teacher_name: String,
    #[validate(email(message = "Teacher email must be a valid email address"))]
    pub teacher_email: String,
    #[validate(length(min = 1, max = 255, message = "Class name must be between 1 and 255 characters"))]
    pub class_name: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub custom_message: String,
    /// Only students below this percentage get a letter
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0, message = "Grade cutoff must be between 0 and 100"))]
    pub grade_cutoff: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(percent: &str) -> StudentGrade {
        StudentGrade {
            name: "John Smith".to_string(),
            display_name: "John Smith".to_string(),
            first_name: "John".to_string(),
            grade: "C".to_string(),
            percent: percent.to_string(),
            missing_assignments: vec!["Quiz 1".to_string()],
        }
    }

    #[test]
    fn test_percent_value_strips_sign() {
        assert_eq!(student("72.5%").percent_value(), Some(72.5));
        assert_eq!(student(" 90 ").percent_value(), Some(90.0));
        assert_eq!(student("n/a").percent_value(), None);
    }

    #[test]
    fn test_cutoff_filter() {
        assert!(student("59.9%").is_below(60.0));
        assert!(!student("60%").is_below(60.0));
        assert!(student("").is_below(60.0));
    }

    #[test]
    fn test_letter_settings_validation() {
        let mut settings = LetterSettings {
            teacher_name: "Ms. Rivera".to_string(),
            teacher_email: "rivera@example.org".to_string(),
            class_name: "Algebra I".to_string(),
            custom_message: String::new(),
            grade_cutoff: Some(70.0),
        };
        assert!(settings.validate().is_ok());

        settings.teacher_email = "not-an-email".to_string();
        assert!(settings.validate().is_err());

        settings.teacher_email = "rivera@example.org".to_string();
        settings.grade_cutoff = Some(120.0);
        assert!(settings.validate().is_err());
    }
}
