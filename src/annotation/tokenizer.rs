//! Inner-punctuation tokenizer.
//!
//! Word-character runs joined by inner punctuation (`'`, `’`, `.`, `-`) stay
//! one token, so `don't`, `3.5` and `e-mail` are single tokens. Every other
//! non-whitespace character becomes a token of its own.

use std::sync::OnceLock;

use regex::Regex;

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\w+(?:['’.\-]\w+)*|[^\w\s]").expect("token pattern is valid")
    })
}

/// Splits `text` into tokens.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    token_pattern()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace() {
        assert_eq!(tokenize("Homo  sapiens\tL."), vec!["Homo", "sapiens", "L", "."]);
    }

    #[test]
    fn keeps_inner_punctuation() {
        assert_eq!(
            tokenize("don't use 3.5 e-mail"),
            vec!["don't", "use", "3.5", "e-mail"]
        );
    }

    #[test]
    fn outer_punctuation_is_separate() {
        assert_eq!(
            tokenize("(Smith, 1899)"),
            vec!["(", "Smith", ",", "1899", ")"]
        );
    }

    #[test]
    fn empty_and_blank_yield_nothing() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \n").is_empty());
    }
}
