//! Student name normalization.
//!
//! Attendance audits and gradebook exports spell the same student in different
//! ways ("GARCÍA, JOSÉ", "Jose Garcia"). Both sides are keyed by the string
//! produced here so their records line up.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Canonical "First Last" key for a raw student name.
///
/// Accents are stripped, case is folded and "Last, First Middle" input is
/// reordered. Without a comma the first and final words are kept. The result
/// is title-cased; empty or symbol-only input gives an empty string.
pub fn normalize_name(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let folded = raw
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();

    let cleaned: String = folded
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_whitespace() || matches!(c, ',' | '\'' | '-'))
        .collect();
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    let (first, last) = match cleaned.split_once(',') {
        Some((last, rest)) => {
            let first = rest.split_whitespace().next().unwrap_or("");
            (first.to_string(), last.trim().to_string())
        }
        None => {
            let parts: Vec<&str> = cleaned.split_whitespace().collect();
            match parts.as_slice() {
                [] => return String::new(),
                [only] => (only.to_string(), String::new()),
                [first, .., last] => (first.to_string(), last.to_string()),
            }
        }
    };

    format!("{} {}", title_case(&first), title_case(&last))
        .trim()
        .to_string()
}

/// Name as printed in a letter: "Last, First" becomes "First Last".
pub fn display_name(raw: &str) -> String {
    let mut parts: Vec<&str> = raw.trim().split(", ").collect();
    parts.reverse();
    parts.join(" ")
}

// Upper-cases every letter that follows a non-letter ("o'neil" -> "O'Neil").
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
