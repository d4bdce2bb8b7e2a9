//! Pipeline stage that overrides entity spans with gazetteer matches.

use tracing::{debug, info};

use crate::{
    error::Result,
    gazetteer::{
        index::PatternIndex,
        patterns::PatternRegistry,
        resolver::LabelResolver,
    },
    nlp::{
        doc::{AlignmentMode, Doc, Span},
        language::{Language, Pipe},
    },
};

/// Stage name used when the annotator is added to a pipeline.
pub const GAZETTEER_PIPE: &str = "flashpatternmatcher";
/// Label applied to matches whose pattern has no `ent_type`.
pub const DEFAULT_LABEL: &str = "CUSTOM";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GazetteerConfig {
    pub default_label: String,
    pub case_sensitive: bool,
    /// How matches that cut through a token are handled. `Strict` drops them.
    pub alignment: AlignmentMode,
}

impl Default for GazetteerConfig {
    fn default() -> Self {
        Self {
            default_label: DEFAULT_LABEL.to_string(),
            case_sensitive: false,
            alignment: AlignmentMode::Strict,
        }
    }
}

impl GazetteerConfig {
    pub fn with_default_label(mut self, label: impl Into<String>) -> Self {
        self.default_label = label.into();
        self
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_alignment(mut self, alignment: AlignmentMode) -> Self {
        self.alignment = alignment;
        self
    }
}

/// Keyword matcher that forces registered phrases onto fixed entity labels.
///
/// For each document it records every token's current entity label as an
/// original label, sets one entity per keyword match (dropping any earlier
/// entity it overlaps) and finally merges each matched span into one token.
#[derive(Debug)]
pub struct GazetteerAnnotator {
    index: PatternIndex,
    resolver: LabelResolver,
    alignment: AlignmentMode,
}

impl GazetteerAnnotator {
    /// Build the index and register every label it can emit with `nlp`.
    ///
    /// Registration is idempotent, so several annotators may be built
    /// against the same pipeline.
    pub fn new(
        nlp: &Language,
        registry: PatternRegistry,
        config: GazetteerConfig,
    ) -> Result<Self> {
        nlp.add_entity_label(&config.default_label);
        for (class, surfaces) in registry.classes() {
            nlp.add_entity_label(class);
            for surface in surfaces {
                nlp.vocab().add(surface);
            }
        }
        for ent_type in registry
            .patterns()
            .values()
            .flatten()
            .filter_map(|record| record.ent_type.as_deref())
        {
            nlp.add_entity_label(ent_type);
        }

        let index = PatternIndex::from_registry(&registry, config.case_sensitive)?;
        info!(
            classes = registry.classes().len(),
            keywords = index.len(),
            default_label = %config.default_label,
            "gazetteer pattern matcher built"
        );
        Ok(Self {
            index,
            resolver: LabelResolver::new(registry, config.default_label),
            alignment: config.alignment,
        })
    }

    pub fn index(&self) -> &PatternIndex {
        &self.index
    }

    pub fn resolver(&self) -> &LabelResolver {
        &self.resolver
    }

    pub fn annotate(&self, mut doc: Doc) -> Result<Doc> {
        doc.record_original_labels();

        let matches = self.index.find_iter(doc.text());
        let mut spans: Vec<Span> = Vec::with_capacity(matches.len());
        for m in &matches {
            let label = doc.vocab().add(self.resolver.resolve(m.surface)?);
            let Some(span) = doc.char_span(m.start, m.end, Some(label), self.alignment) else {
                debug!(
                    surface = m.surface,
                    start = m.start,
                    end = m.end,
                    "match not aligned to tokens"
                );
                continue;
            };
            // snapping can make neighbouring matches share a token
            if spans.iter().any(|s| s.overlaps(&span)) {
                debug!(surface = m.surface, "match overlaps an earlier match");
                continue;
            }
            spans.push(span);
        }

        let mut ents: Vec<Span> = doc
            .ents()
            .into_iter()
            .filter(|ent| spans.iter().all(|s| !s.overlaps(ent)))
            .collect();
        let replaced = doc.ents().len() - ents.len();
        ents.extend(spans.iter().copied());
        doc.set_ents(ents)?;
        doc.merge_spans(&spans)?;

        debug!(
            matches = matches.len(),
            added = spans.len(),
            replaced,
            "gazetteer annotated document"
        );
        Ok(doc)
    }
}

impl Pipe for GazetteerAnnotator {
    fn process(&self, doc: Doc) -> Result<Doc> {
        self.annotate(doc)
    }
}
