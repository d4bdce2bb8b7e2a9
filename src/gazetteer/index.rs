//! Multi-pattern keyword index over the registered surface strings.
//!
//! Matching is word-bounded and non-overlapping: at each position the longest
//! registered keyword wins, and a keyword only matches when it is not glued to
//! surrounding letters, digits or underscores.

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use indexmap::IndexSet;

use crate::{error::Result, gazetteer::patterns::PatternRegistry};

/// One keyword occurrence. `surface` is the registered key. When matching
/// case-insensitively it is the key spelled exactly like the document text if
/// one is registered, otherwise the earliest key differing only in ASCII case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'i> {
    pub surface: &'i str,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone)]
pub struct PatternIndex {
    automaton: AhoCorasick,
    surfaces: IndexSet<String>,
    case_sensitive: bool,
}

impl PatternIndex {
    pub fn build<I, S>(surfaces: I, case_sensitive: bool) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let surfaces: IndexSet<String> = surfaces
            .into_iter()
            .map(Into::into)
            .filter(|s| !s.is_empty())
            .collect();
        let automaton = AhoCorasickBuilder::new()
            .match_kind(MatchKind::Standard)
            .ascii_case_insensitive(!case_sensitive)
            .build(&surfaces)?;
        Ok(Self {
            automaton,
            surfaces,
            case_sensitive,
        })
    }

    pub fn from_registry(registry: &PatternRegistry, case_sensitive: bool) -> Result<Self> {
        Self::build(registry.surfaces(), case_sensitive)
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn surfaces(&self) -> &IndexSet<String> {
        &self.surfaces
    }

    /// Every non-overlapping, word-bounded keyword occurrence in `text`, in
    /// document order.
    pub fn find_iter<'i>(&'i self, text: &str) -> Vec<Match<'i>> {
        let mut candidates: Vec<(usize, usize, usize)> = self
            .automaton
            .find_overlapping_iter(text)
            .filter(|m| on_word_boundaries(text, m.start(), m.end()))
            .map(|m| (m.start(), m.end(), m.pattern().as_usize()))
            .collect();
        // leftmost first, then longest, then earliest registered
        candidates.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)).then(a.2.cmp(&b.2)));

        let mut matches = Vec::new();
        let mut cursor = 0;
        for (start, end, pattern) in candidates {
            if start < cursor {
                continue;
            }
            let pattern = if self.case_sensitive {
                pattern
            } else {
                self.surfaces
                    .get_index_of(&text[start..end])
                    .unwrap_or(pattern)
            };
            matches.push(Match {
                surface: &self.surfaces[pattern],
                start,
                end,
            });
            cursor = end;
        }
        matches
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn on_word_boundaries(text: &str, start: usize, end: usize) -> bool {
    let matched = &text[start..end];
    let starts_in_word = matched.chars().next().is_some_and(is_word_char)
        && text[..start].chars().next_back().is_some_and(is_word_char);
    let ends_in_word = matched.chars().next_back().is_some_and(is_word_char)
        && text[end..].chars().next().is_some_and(is_word_char);
    !starts_in_word && !ends_in_word
}

#[cfg(test)]
mod tests {
    use super::*;

    fn found<'t>(index: &PatternIndex, text: &'t str) -> Vec<&'t str> {
        index
            .find_iter(text)
            .into_iter()
            .map(|m| &text[m.start..m.end])
            .collect()
    }

    #[test]
    fn longest_keyword_wins() {
        let index = PatternIndex::build(["New York", "New York City", "York"], true).unwrap();
        assert_eq!(found(&index, "I love New York City."), vec!["New York City"]);
    }

    #[test]
    fn keywords_respect_word_boundaries() {
        let index = PatternIndex::build(["Bar", "Foo"], true).unwrap();
        assert_eq!(found(&index, "Barbara met Foo at the Bar."), vec!["Foo", "Bar"]);
    }

    #[test]
    fn shorter_keyword_survives_a_rejected_longer_one() {
        let index = PatternIndex::build(["Foo", "Foo Ba"], true).unwrap();
        assert_eq!(found(&index, "Foo Bar"), vec!["Foo"]);
    }

    #[test]
    fn case_insensitive_matches_report_the_registered_key() {
        let index = PatternIndex::build(["John Smith"], false).unwrap();
        let matches = index.find_iter("JOHN SMITH and john smith");
        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|m| m.surface == "John Smith"));
        assert_eq!((matches[1].start, matches[1].end), (15, 25));
    }

    #[test]
    fn exact_spelling_beats_an_earlier_case_variant() {
        let index = PatternIndex::build(["Us", "US"], false).unwrap();
        let surfaces: Vec<&str> = index
            .find_iter("US and us and Us")
            .into_iter()
            .map(|m| m.surface)
            .collect();
        assert_eq!(surfaces, vec!["US", "Us", "Us"]);
    }

    #[test]
    fn case_sensitive_index_ignores_other_casings() {
        let index = PatternIndex::build(["Foo"], true).unwrap();
        assert!(index.find_iter("foo FOO").is_empty());
    }

    #[test]
    fn duplicate_and_empty_surfaces_are_dropped() {
        let index = PatternIndex::build(["Foo", "", "Foo"], true).unwrap();
        assert_eq!(index.len(), 1);
    }
}
