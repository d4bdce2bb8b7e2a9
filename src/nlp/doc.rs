//! Document model: tokens, entity spans and per-token original labels.
//!
//! Entities are stored on the tokens themselves as IOB state, so
//! [`Doc::ents`] is always derived from the current token sequence and stays
//! consistent when tokens are merged.

use std::sync::Arc;

use clap::ValueEnum;
use indexmap::IndexSet;
use serde::Deserialize;

use crate::{
    error::{GazetteerError, Result},
    nlp::vocab::{LabelId, StringStore},
};

/// Position of a token relative to an entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntIob {
    #[default]
    Outside,
    Begin,
    Inside,
}

/// How [`Doc::char_span`] treats offsets that fall inside a token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentMode {
    /// Offsets must land exactly on token boundaries.
    #[default]
    Strict,
    /// Shrink to the tokens fully inside the range.
    Contract,
    /// Grow to every token the range touches.
    Expand,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    start: usize,
    end: usize,
    ent_iob: EntIob,
    ent_label: Option<LabelId>,
    original_labels: IndexSet<LabelId>,
}

impl Token {
    fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            ent_iob: EntIob::Outside,
            ent_label: None,
            original_labels: IndexSet::new(),
        }
    }

    /// Byte offset of the first character.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Byte offset one past the last character.
    pub fn end(&self) -> usize {
        self.end
    }

    pub fn text<'d>(&self, doc: &'d Doc) -> &'d str {
        &doc.text[self.start..self.end]
    }

    pub fn ent_iob(&self) -> EntIob {
        self.ent_iob
    }

    pub fn ent_label(&self) -> Option<LabelId> {
        self.ent_label
    }

    /// Labels this token carried before a later stage overrode them.
    pub fn original_labels(&self) -> &IndexSet<LabelId> {
        &self.original_labels
    }

    pub fn add_original_label(&mut self, label: LabelId) {
        self.original_labels.insert(label);
    }
}

/// View over the token range `[start, end)` of a [`Doc`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub start_char: usize,
    pub end_char: usize,
    pub label: Option<LabelId>,
}

impl Span {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn text<'d>(&self, doc: &'d Doc) -> &'d str {
        &doc.text[self.start_char..self.end_char]
    }

    pub fn label_text(&self, doc: &Doc) -> Option<String> {
        self.label.and_then(|id| doc.vocab.resolve(id))
    }

    pub fn tokens<'d>(&self, doc: &'d Doc) -> &'d [Token] {
        &doc.tokens[self.start..self.end]
    }

    /// Whether the two spans share at least one token.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Union of the original labels of every covered token. A token without
    /// any original label contributes `None`.
    pub fn original_labels(&self, doc: &Doc) -> IndexSet<Option<LabelId>> {
        let mut labels = IndexSet::new();
        for token in self.tokens(doc) {
            if token.original_labels.is_empty() {
                labels.insert(None);
            } else {
                labels.extend(token.original_labels.iter().copied().map(Some));
            }
        }
        labels
    }
}

#[derive(Debug, Clone)]
pub struct Doc {
    text: String,
    tokens: Vec<Token>,
    vocab: Arc<StringStore>,
}

impl Doc {
    /// Build a document from text and pre-computed `(start, end)` byte ranges.
    pub fn new(
        vocab: Arc<StringStore>,
        text: impl Into<String>,
        boundaries: &[(usize, usize)],
    ) -> Self {
        let tokens = boundaries
            .iter()
            .map(|&(start, end)| Token::new(start, end))
            .collect();
        Self {
            text: text.into(),
            tokens,
            vocab,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn tokens_mut(&mut self) -> &mut [Token] {
        &mut self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn vocab(&self) -> &Arc<StringStore> {
        &self.vocab
    }

    /// Span over the token range `[start, end)`.
    pub fn span(&self, start: usize, end: usize, label: Option<LabelId>) -> Result<Span> {
        if start >= end || end > self.tokens.len() {
            return Err(GazetteerError::InvalidTokenRange {
                start,
                end,
                len: self.tokens.len(),
            });
        }
        Ok(Span {
            start,
            end,
            start_char: self.tokens[start].start,
            end_char: self.tokens[end - 1].end,
            label,
        })
    }

    /// Span covering the byte range `[start, end)`, or `None` when the range
    /// cannot be aligned to tokens under `mode`.
    pub fn char_span(
        &self,
        start: usize,
        end: usize,
        label: Option<LabelId>,
        mode: AlignmentMode,
    ) -> Option<Span> {
        if start >= end {
            return None;
        }
        let (first, last) = match mode {
            AlignmentMode::Strict => {
                let first = self.tokens.iter().position(|t| t.start == start)?;
                let last = self.tokens[first..].iter().position(|t| t.end == end)? + first;
                (first, last)
            }
            AlignmentMode::Contract => {
                let first = self.tokens.iter().position(|t| t.start >= start)?;
                let last = self.tokens.iter().rposition(|t| t.end <= end)?;
                (first, last)
            }
            AlignmentMode::Expand => {
                let first = self.tokens.iter().position(|t| t.end > start)?;
                let last = self.tokens.iter().rposition(|t| t.start < end)?;
                (first, last)
            }
        };
        if first > last {
            return None;
        }
        self.span(first, last + 1, label).ok()
    }

    /// Entity spans in document order.
    pub fn ents(&self) -> Vec<Span> {
        let mut ents = Vec::new();
        let mut open: Option<(usize, LabelId)> = None;
        for (idx, token) in self.tokens.iter().enumerate() {
            match (token.ent_iob, token.ent_label, open) {
                (EntIob::Inside, Some(label), Some((_, current))) if label == current => continue,
                _ => {}
            }
            if let Some((start, label)) = open.take() {
                ents.push(self.entity(start, idx, label));
            }
            if token.ent_iob != EntIob::Outside {
                open = token.ent_label.map(|label| (idx, label));
            }
        }
        if let Some((start, label)) = open {
            ents.push(self.entity(start, self.tokens.len(), label));
        }
        ents
    }

    fn entity(&self, start: usize, end: usize, label: LabelId) -> Span {
        Span {
            start,
            end,
            start_char: self.tokens[start].start,
            end_char: self.tokens[end - 1].end,
            label: Some(label),
        }
    }

    /// Replace all entities with `spans`. Spans must be labelled, in bounds and
    /// pairwise disjoint.
    pub fn set_ents(&mut self, mut spans: Vec<Span>) -> Result<()> {
        spans.sort_by_key(|span| (span.start, span.end));
        for span in &spans {
            if span.start >= span.end || span.end > self.tokens.len() {
                return Err(GazetteerError::InvalidTokenRange {
                    start: span.start,
                    end: span.end,
                    len: self.tokens.len(),
                });
            }
            if span.label.is_none() {
                return Err(GazetteerError::UnlabelledEntity(span.start, span.end));
            }
        }
        for pair in spans.windows(2) {
            if pair[0].overlaps(&pair[1]) {
                return Err(GazetteerError::ConflictingEntities(
                    pair[0].start,
                    pair[0].end,
                    pair[1].start,
                    pair[1].end,
                ));
            }
        }

        for token in &mut self.tokens {
            token.ent_iob = EntIob::Outside;
            token.ent_label = None;
        }
        for span in spans {
            for idx in span.start..span.end {
                let token = &mut self.tokens[idx];
                token.ent_iob = if idx == span.start {
                    EntIob::Begin
                } else {
                    EntIob::Inside
                };
                token.ent_label = span.label;
            }
        }
        Ok(())
    }

    /// Record every entity's label on each of its tokens as an original label.
    pub fn record_original_labels(&mut self) {
        for ent in self.ents() {
            let Some(label) = ent.label else { continue };
            for token in &mut self.tokens[ent.start..ent.end] {
                token.add_original_label(label);
            }
        }
    }

    /// Collapse the tokens of `span` into a single token. The merged token
    /// keeps the entity state of the first token and the union of all
    /// original labels.
    pub fn merge(&mut self, span: &Span) -> Result<()> {
        if span.start >= span.end || span.end > self.tokens.len() {
            return Err(GazetteerError::InvalidTokenRange {
                start: span.start,
                end: span.end,
                len: self.tokens.len(),
            });
        }
        if span.len() == 1 {
            return Ok(());
        }
        let end_char = self.tokens[span.end - 1].end;
        let absorbed: Vec<Token> = self.tokens.drain(span.start + 1..span.end).collect();
        let merged = &mut self.tokens[span.start];
        merged.end = end_char;
        for token in absorbed {
            merged.original_labels.extend(token.original_labels);
        }
        Ok(())
    }

    /// Merge several disjoint spans. Later spans are merged first so the token
    /// indices of earlier ones stay valid.
    pub fn merge_spans(&mut self, spans: &[Span]) -> Result<()> {
        let mut ordered: Vec<&Span> = spans.iter().collect();
        ordered.sort_by_key(|span| std::cmp::Reverse(span.start));
        for span in ordered {
            self.merge(span)?;
        }
        Ok(())
    }
}
