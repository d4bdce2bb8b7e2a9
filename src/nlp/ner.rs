//! Base entity recognizers and the pipeline stage that runs them.
//!
//! The recognizers here are lightweight stand-ins for a statistical model:
//! a dictionary lookup and a capitalisation heuristic. Either can be swapped
//! for any other [`Ner`] implementation.

use std::sync::{Arc, PoisonError, RwLock};

use indexmap::{IndexMap, IndexSet};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::{
    error::Result,
    nlp::{
        doc::{AlignmentMode, Doc, Span},
        language::Pipe,
    },
};

/// Entity mention with byte offsets relative to the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Mention {
    pub start: usize,
    pub end: usize,
    pub label: String,
    pub text: String,
    pub score: f64,
}

/// Trait for NER implementations.
pub trait Ner: Send + Sync {
    fn extract(&self, text: &str) -> Vec<Mention>;

    /// Labels this recognizer can produce.
    fn labels(&self) -> Vec<String>;
}

/// Case-insensitive term lookup, one term list per label.
#[derive(Debug, Clone, Default)]
pub struct DictionaryNer {
    terms: IndexMap<String, Vec<String>>,
}

impl DictionaryNer {
    pub fn new(terms: IndexMap<String, Vec<String>>) -> Self {
        Self { terms }
    }

    pub fn with_terms<L, T>(mut self, label: L, terms: impl IntoIterator<Item = T>) -> Self
    where
        L: Into<String>,
        T: Into<String>,
    {
        self.terms
            .entry(label.into())
            .or_default()
            .extend(terms.into_iter().map(Into::into));
        self
    }
}

impl Ner for DictionaryNer {
    fn extract(&self, text: &str) -> Vec<Mention> {
        let mut mentions = Vec::new();
        for (label, terms) in &self.terms {
            mentions.extend(find_terms(text, terms, label));
        }
        mentions
    }

    fn labels(&self) -> Vec<String> {
        self.terms.keys().cloned().collect()
    }
}

// ASCII lowercasing keeps byte offsets identical to the source text.
fn find_terms(text: &str, terms: &[String], label: &str) -> Vec<Mention> {
    let lower = text.to_ascii_lowercase();
    let mut mentions = Vec::new();
    for term in terms {
        let term_lower = term.to_ascii_lowercase();
        if term_lower.is_empty() {
            continue;
        }
        let mut start_pos = 0;
        while let Some(pos) = lower[start_pos..].find(&term_lower) {
            let start = start_pos + pos;
            let end = start + term_lower.len();
            mentions.push(Mention {
                start,
                end,
                label: label.to_string(),
                text: text[start..end].to_string(),
                score: 0.8,
            });
            start_pos = end;
        }
    }
    mentions
}

const SENTENCE_STARTERS: &[&str] = &[
    "the", "a", "an", "this", "that", "these", "those", "it", "he", "she", "they", "we", "i",
    "in", "on", "at", "but", "and", "or", "if", "when", "while", "after", "before", "there",
];

const ORG_SUFFIX: &[&str] = &[
    "inc", "corp", "ltd", "llc", "plc", "gmbh", "company", "corporation", "foundation",
    "institute", "university", "college", "bank", "group", "agency", "museum", "gallery",
];

const LOC_PREPOSITION: &[&str] = &["in", "from", "of", "to", "near", "at"];

static CAPITALISED_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\p{Lu}[\p{L}'’\-]*(?:[ \t]+\p{Lu}[\p{L}'’\-]*)*").expect("valid regex")
});

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\s]+").expect("valid regex"));

/// Shape heuristic over runs of capitalised words.
///
/// Multi-word runs become `PERSON` unless they end in an organisation suffix
/// (`ORG`). Single words only count as `GPE` after a locative preposition.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapitalizationNer;

impl Ner for CapitalizationNer {
    fn extract(&self, text: &str) -> Vec<Mention> {
        let mut mentions = Vec::new();
        for run in CAPITALISED_RUN.find_iter(text) {
            let words: Vec<(usize, usize)> = WORD
                .find_iter(run.as_str())
                .map(|w| (run.start() + w.start(), run.start() + w.end()))
                .skip_while(|&(s, e)| is_listed(&text[s..e], SENTENCE_STARTERS))
                .collect();
            let (Some(&(start, _)), Some(&(last_start, end))) = (words.first(), words.last())
            else {
                continue;
            };
            let label = if is_listed(&text[last_start..end], ORG_SUFFIX) {
                "ORG"
            } else if words.len() >= 2 {
                "PERSON"
            } else if preceding_word(text, start).is_some_and(|w| is_listed(w, LOC_PREPOSITION)) {
                "GPE"
            } else {
                continue;
            };
            mentions.push(Mention {
                start,
                end,
                label: label.to_string(),
                text: text[start..end].to_string(),
                score: 0.6,
            });
        }
        mentions
    }

    fn labels(&self) -> Vec<String> {
        ["PERSON", "ORG", "GPE"].map(String::from).to_vec()
    }
}

fn is_listed(word: &str, list: &[&str]) -> bool {
    let word = word.trim_end_matches('.');
    list.iter().any(|entry| entry.eq_ignore_ascii_case(word))
}

fn preceding_word(text: &str, start: usize) -> Option<&str> {
    text[..start]
        .split_whitespace()
        .last()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
}

/// Pipeline stage wrapping a [`Ner`] model, bounded to a mutable label set.
pub struct EntityRecognizer {
    model: Arc<dyn Ner>,
    labels: RwLock<IndexSet<String>>,
}

impl std::fmt::Debug for EntityRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityRecognizer")
            .field("labels", &self.labels())
            .finish_non_exhaustive()
    }
}

impl EntityRecognizer {
    pub fn new(model: Arc<dyn Ner>) -> Self {
        let labels = model.labels().into_iter().collect();
        Self {
            model,
            labels: RwLock::new(labels),
        }
    }

    /// Allow `label` on this stage. Returns `false` when it was already known.
    pub fn add_label(&self, label: &str) -> bool {
        if self.has_label(label) {
            return false;
        }
        self.labels
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(label.to_string())
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(label)
    }

    pub fn labels(&self) -> Vec<String> {
        self.labels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

impl Pipe for EntityRecognizer {
    fn process(&self, mut doc: Doc) -> Result<Doc> {
        let mut candidates: Vec<(Span, f64)> = Vec::new();
        for mention in self.model.extract(doc.text()) {
            if !self.has_label(&mention.label) {
                continue;
            }
            let label = doc.vocab().add(&mention.label);
            match doc.char_span(mention.start, mention.end, Some(label), AlignmentMode::Strict) {
                Some(span) => candidates.push((span, mention.score)),
                None => debug!(text = %mention.text, "dropping mention not aligned to tokens"),
            }
        }
        let ents = filter_spans(candidates);
        debug!(ents = ents.len(), "recognised entities");
        doc.set_ents(ents)?;
        Ok(doc)
    }

    fn as_recognizer(&self) -> Option<&EntityRecognizer> {
        Some(self)
    }
}

/// Greedy non-overlapping selection: higher score, then longer, then earlier.
fn filter_spans(mut candidates: Vec<(Span, f64)>) -> Vec<Span> {
    candidates.sort_by(|(a, sa), (b, sb)| {
        sb.total_cmp(sa)
            .then(b.len().cmp(&a.len()))
            .then(a.start.cmp(&b.start))
    });
    let mut kept: Vec<Span> = Vec::new();
    for (span, _) in candidates {
        if kept.iter().all(|k| !k.overlaps(&span)) {
            kept.push(span);
        }
    }
    kept.sort_by_key(|span| span.start);
    kept
}
