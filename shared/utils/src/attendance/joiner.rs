//! Continuation joiner
//! 
//! PDF text extraction wraps long student rows onto following lines. The
//! joiner rebuilds one logical row per list-index line by appending the
//! physical lines that plausibly belong to it.

use super::parser_config::ParserConfig;

/// One reconstructed student row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalRow {
    /// Zero-based line number of the opening index line
    pub line_number: usize,
    pub text: String,
    /// Line numbers of the physical lines appended to `text`
    pub continuations: Vec<usize>,
}

pub struct ContinuationJoiner<'a> {
    config: &'a ParserConfig,
}

impl<'a> ContinuationJoiner<'a> {
    pub fn new(config: &'a ParserConfig) -> Self {
        Self { config }
    }

    /// Group physical lines into logical rows.
    ///
    /// Lines before the first index line, and lines that neither open a row
    /// nor continue one, are ignored.
    pub fn join<S: AsRef<str>>(&self, lines: &[S]) -> Vec<LogicalRow> {
        let mut rows = Vec::new();

        for (line_number, line) in lines.iter().enumerate() {
            let line = line.as_ref().trim();
            if !self.is_index_line(line) {
                continue;
            }

            let mut row = LogicalRow {
                line_number,
                text: line.to_string(),
                continuations: Vec::new(),
            };

            let window_end = (line_number + 1 + self.config.lookahead).min(lines.len());
            for (next_number, next) in lines
                .iter()
                .enumerate()
                .take(window_end)
                .skip(line_number + 1)
            {
                let next = next.as_ref().trim();
                if next.is_empty() {
                    continue;
                }
                if self.is_index_line(next)
                    || self.is_section_line(next)
                    || !self.looks_like_continuation(next)
                {
                    break;
                }
                row.text.push(' ');
                row.text.push_str(next);
                row.continuations.push(next_number);
            }

            rows.push(row);
        }

        rows
    }

    pub fn is_index_line(&self, line: &str) -> bool {
        self.config.index_line.is_match(line.trim())
    }

    /// Section header, total, banner or footer line
    pub fn is_section_line(&self, line: &str) -> bool {
        let line = line.trim();
        self.config
            .section_lines
            .iter()
            .any(|pattern| pattern.is_match(line))
    }

    /// Name fragment, date, or a line carrying a standalone attendance code
    pub fn looks_like_continuation(&self, line: &str) -> bool {
        let line = line.trim();
        self.config.name_fragment.is_match(line)
            || self.config.date_like.is_match(line)
            || self
                .config
                .code_hint
                .as_ref()
                .map(|hint| hint.is_match(line))
                .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn join(text: &str) -> Vec<LogicalRow> {
        let config = ParserConfig::default();
        let lines: Vec<&str> = text.lines().collect();
        ContinuationJoiner::new(&config).join(&lines)
    }

    #[test]
    fn test_wrapped_codes_are_joined() {
        let rows = join("1. Smith, John 9 12 P P A\nT P P\n2. Doe, Jane 10 12 P P P");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text, "1. Smith, John 9 12 P P A T P P");
        assert_eq!(rows[0].continuations, vec![1]);
        assert_eq!(rows[1].line_number, 2);
    }

    #[test]
    fn test_new_index_line_is_never_merged() {
        let rows = join("1. Smith, John 9 12 P\n2. Doe, Jane 10 12 A");
        assert_eq!(rows.len(), 2);
        assert!(rows[0].continuations.is_empty());
        assert!(!rows[0].text.contains("Doe"));
    }

    #[test]
    fn test_section_line_stops_joining() {
        let rows = join("1. Smith, John 9 12 P\nTotal Membership: 24\nP P");
        assert_eq!(rows[0].text, "1. Smith, John 9 12 P");
    }

    #[test]
    fn test_blank_lines_count_toward_window() {
        let rows = join("1. Smith, John 9 12 P\n\n\n\n\nP A\nP");
        assert_eq!(rows[0].text, "1. Smith, John 9 12 P P A");
        assert_eq!(rows[0].continuations, vec![5]);
    }

    #[test]
    fn test_joining_stops_at_first_implausible_line() {
        let rows = join("1. Smith, John 9 12 P\n#### 42 ####\nA");
        assert!(rows[0].continuations.is_empty());
    }

    #[test]
    fn test_name_fragment_and_date_continue() {
        let rows = join("3. Garcia-Lopez,\nMaria 11 20 P\n08/14/24 A");
        assert_eq!(rows[0].continuations, vec![1, 2]);
    }

    #[test]
    fn test_lines_before_first_index_ignored() {
        let rows = join("Teacher: Rivera\nCourse: Algebra\nP A T\n1. Smith, John 9 1 P");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].line_number, 3);
    }

    #[test]
    fn test_weekday_banner_is_section_line() {
        let config = ParserConfig::default();
        let joiner = ContinuationJoiner::new(&config);
        assert!(joiner.is_section_line("M T W T F M T W T F"));
        assert!(joiner.is_section_line("August September"));
        assert!(joiner.is_section_line("12 14 20"));
        assert!(!joiner.is_section_line("P P A T"));
        assert!(!joiner.is_section_line("A T"));
        assert!(!joiner.is_section_line("A"));
    }

    #[test]
    fn test_short_code_line_is_joined() {
        let rows = join("1. Smith, John 9 12 P P
A T
2. Doe, Jane 10 12 P");
        assert_eq!(rows[0].text, "1. Smith, John 9 12 P P A T");
        assert_eq!(rows[0].continuations, vec![1]);
    }
}
