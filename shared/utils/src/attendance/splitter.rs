//! Row splitter
//! 
//! Separates a logical row into the student name and the code string. Audit
//! rows look like `<index>. <Last, First> <grade> ... <total> <codes>`, so the
//! name ends at the first number and the codes start after the last one.

use super::parser_config::ParserConfig;
use crate::names::normalize_name;

/// Name and code string recovered from one logical row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitRow {
    /// Normalized "First Last" name, empty when none was found
    pub name: String,
    /// Filtered codes (letters and `/` only), day-header marker removed
    pub codes: String,
    /// Whether the row had any numeric column to split on
    pub anchored: bool,
}

impl SplitRow {
    pub fn is_record(&self) -> bool {
        !self.name.is_empty() && !self.codes.is_empty()
    }
}

pub struct RowSplitter<'a> {
    config: &'a ParserConfig,
}

impl<'a> RowSplitter<'a> {
    pub fn new(config: &'a ParserConfig) -> Self {
        Self { config }
    }

    pub fn split(&self, text: &str) -> SplitRow {
        let config = self.config;
        let body = self.strip_noise(&config.list_prefix.replace(text, ""));
        let body = body.trim();

        let runs: Vec<_> = config.numeric_run.find_iter(body).collect();
        let (first, last) = match (runs.first(), runs.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return SplitRow {
                    name: normalize_name(body.trim_end_matches(',')),
                    codes: String::new(),
                    anchored: false,
                }
            }
        };

        let head = body[..first.start()].trim();
        let head = config.trailing_digits.replace(head, "");
        let name = normalize_name(head.trim_end_matches(','));

        SplitRow {
            name,
            codes: self.clean_codes(&body[last.end()..]),
            anchored: true,
        }
    }

    // Page furniture carries its own digits, so it has to go before the
    // numeric columns are located.
    fn strip_noise(&self, body: &str) -> String {
        let mut body = body.to_string();
        for footer in &self.config.footer_phrases {
            body = footer.replace_all(&body, "").into_owned();
        }
        self.config.banner_words.replace_all(&body, "").into_owned()
    }

    fn clean_codes(&self, tail: &str) -> String {
        let codes = self.config.non_code.replace_all(tail.trim(), "").into_owned();
        let day_header = self.config.day_header.as_str();
        if !day_header.is_empty() {
            if let Some(rest) = codes.strip_prefix(day_header) {
                return rest.to_string();
            }
        }
        codes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserSettings;

    fn split(text: &str) -> SplitRow {
        let config = ParserConfig::default();
        RowSplitter::new(&config).split(text)
    }

    #[test]
    fn test_splits_name_and_codes() {
        let row = split("3. Smith, John 85 A 7   PA T P");
        assert_eq!(row.name, "John Smith");
        assert_eq!(row.codes, "PATP");
        assert!(row.is_record());
    }

    #[test]
    fn test_strips_glued_digits_from_name() {
        let row = split("12) Lopez, Jesus11 4 2 MFPPTA");
        assert_eq!(row.name, "Jesus Lopez");
        assert_eq!(row.codes, "PPTA");
    }

    #[test]
    fn test_row_without_digits_has_no_codes() {
        let row = split("Garcia, Maria PPA");
        assert!(!row.anchored);
        assert!(row.codes.is_empty());
        assert!(!row.is_record());
    }

    #[test]
    fn test_footer_removed_from_tail() {
        let row = split("7. Brown, Amy 10 3 P A P Class Attendance Audit");
        assert_eq!(row.codes, "PAP");
    }

    #[test]
    fn test_glued_page_footer_keeps_row() {
        let row = split("2. Garcia, Jose 10 5 PPPPT Page 1 of 3");
        assert_eq!(row.name, "Jose Garcia");
        assert_eq!(row.codes, "PPPPT");
        assert!(row.is_record());
    }

    #[test]
    fn test_gender_banner_removed() {
        let row = split("1. Smith, John 9 3 PPP Female");
        assert_eq!(row.codes, "PPP");
        let row = split("4. Malec, Tom 9 2 MALE P A");
        assert_eq!(row.name, "Tom Malec");
        assert_eq!(row.codes, "PA");
    }

    #[test]
    fn test_surname_page_is_not_a_footer() {
        let row = split("6. Page, Anna 10 2 P T");
        assert_eq!(row.name, "Anna Page");
        assert_eq!(row.codes, "PT");
    }

    #[test]
    fn test_institution_footer_removed() {
        let settings = ParserSettings {
            institution_name: Some("Lakeside High".to_string()),
            ..ParserSettings::default()
        };
        let config = ParserConfig::from_settings(&settings).unwrap();
        let row = RowSplitter::new(&config).split("1. Chen, Li 9 1 P T Lakeside High School");
        assert_eq!(row.codes, "PT");
    }

    #[test]
    fn test_keeps_no_entry_slash() {
        let row = split("4. Diaz, Rosa 11 0 N/E P");
        assert_eq!(row.codes, "N/EP");
    }

    #[test]
    fn test_numbers_only_row_has_no_name() {
        let row = split("5. 10 4 P A");
        assert!(row.name.is_empty());
        assert!(!row.is_record());
    }
}
