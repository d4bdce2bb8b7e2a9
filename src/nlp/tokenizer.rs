//! Rule-based tokenizer producing byte-offset token boundaries.

use once_cell::sync::Lazy;
use regex::Regex;

/// Words (with inner hyphens and apostrophes) or single non-space symbols.
static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\w+(?:['’\-]\w+)*|[^\w\s]").expect("valid regex"));

/// Splits raw text into `(start, end)` byte ranges.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    pattern: Regex,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self {
            pattern: TOKEN_PATTERN.clone(),
        }
    }
}

impl Tokenizer {
    /// Use a custom token pattern; every match becomes one token.
    pub fn with_pattern(pattern: Regex) -> Self {
        Self { pattern }
    }

    pub fn tokenize(&self, text: &str) -> Vec<(usize, usize)> {
        self.pattern
            .find_iter(text)
            .map(|m| (m.start(), m.end()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<&str> {
        Tokenizer::default()
            .tokenize(text)
            .into_iter()
            .map(|(s, e)| &text[s..e])
            .collect()
    }

    #[test]
    fn punctuation_is_split_off() {
        assert_eq!(
            words("Mary Sanchez, the engraver."),
            vec!["Mary", "Sanchez", ",", "the", "engraver", "."]
        );
    }

    #[test]
    fn hyphenated_words_stay_whole() {
        assert_eq!(words("a well-known O'Neil"), vec!["a", "well-known", "O'Neil"]);
    }

    #[test]
    fn offsets_are_bytes() {
        let spans = Tokenizer::default().tokenize("café au lait");
        assert_eq!(spans, vec![(0, 5), (6, 8), (9, 13)]);
    }
}
