//! Attendance code tokenizer
//! 
//! Splits a run of glued attendance codes ("PFDPAT") into one token per day.

use super::parser_config::{ParserConfig, UnknownCodePolicy};

/// Greedy tokenizer over an ordered code vocabulary.
///
/// At every position the vocabulary is tried in list order and the first
/// entry that matches wins, so longer codes must be listed before the codes
/// they start with.
pub struct CodeTokenizer<'a> {
    vocabulary: &'a [String],
    unknown_codes: UnknownCodePolicy,
}

impl<'a> CodeTokenizer<'a> {
    pub fn new(config: &'a ParserConfig) -> Self {
        Self {
            vocabulary: &config.vocabulary,
            unknown_codes: config.unknown_codes,
        }
    }

    /// Tokenize a filtered code string (letters and `/` only).
    pub fn tokenize<'s>(&self, codes: &'s str) -> Vec<&'s str> {
        let mut tokens = Vec::new();
        let mut rest = codes;

        while let Some(first) = rest.chars().next() {
            let matched = self
                .vocabulary
                .iter()
                .find(|code| rest.starts_with(code.as_str()));

            let len = match matched {
                Some(code) => {
                    tokens.push(&rest[..code.len()]);
                    code.len()
                }
                None => {
                    let len = first.len_utf8();
                    if self.unknown_codes == UnknownCodePolicy::Emit {
                        tokens.push(&rest[..len]);
                    }
                    len
                }
            };
            rest = &rest[len..];
        }

        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tokenize(codes: &str) -> Vec<String> {
        let config = ParserConfig::default();
        CodeTokenizer::new(&config)
            .tokenize(codes)
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_longest_code_wins() {
        assert_eq!(tokenize("PFDP"), vec!["PFD", "P"]);
        assert_eq!(tokenize("QEAQA"), vec!["QEA", "QA"]);
        assert_eq!(tokenize("N/EP"), vec!["N/E", "P"]);
    }

    #[test]
    fn test_duplicates_and_order_preserved() {
        assert_eq!(tokenize("PATPP"), vec!["P", "A", "T", "P", "P"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_unknown_policy() {
        assert_eq!(tokenize("PXA"), vec!["P", "X", "A"]);

        let config = ParserConfig::default().with_unknown_codes(UnknownCodePolicy::Drop);
        let tokens = CodeTokenizer::new(&config).tokenize("PXA");
        assert_eq!(tokens, vec!["P", "A"]);
    }

    #[test]
    fn test_lone_slash_is_unknown() {
        assert_eq!(tokenize("P/"), vec!["P", "/"]);
    }

    proptest! {
        #[test]
        fn prop_concatenated_codes_round_trip(
            picks in prop::collection::vec(0usize..attendance_codes().len(), 0..40)
        ) {
            let codes = attendance_codes();
            let sequence: Vec<&str> = picks.iter().map(|&i| codes[i]).collect();
            // "S" followed by an "A..." code reads back as "SA".
            prop_assume!(!sequence.windows(2).any(|w| w[0] == "S" && w[1].starts_with('A')));

            let joined = sequence.concat();
            prop_assert_eq!(tokenize(&joined), sequence);
        }

        #[test]
        fn prop_every_character_is_covered_when_emitting(s in "[A-Z/]{0,30}") {
            let joined: String = tokenize(&s).concat();
            prop_assert_eq!(joined, s);
        }
    }

    fn attendance_codes() -> Vec<&'static str> {
        reportcard_models::DEFAULT_VOCABULARY.to_vec()
    }
}
