//! Gazetteer keyword matching layered on top of a base pipeline.

pub mod annotator;
pub mod index;
pub mod patterns;
pub mod resolver;

use std::sync::Arc;

use tracing::info;

pub use annotator::{GazetteerAnnotator, GazetteerConfig, DEFAULT_LABEL, GAZETTEER_PIPE};
pub use index::{Match, PatternIndex};
pub use patterns::{EntAction, PatternRecord, PatternRegistry, Patterns, PatternsByClass};
pub use resolver::LabelResolver;

use crate::{
    error::Result,
    nlp::language::{Language, PipePosition, DEFAULT_MODEL, NER_PIPE},
};

/// Load a base pipeline and, when both vocabularies are non-empty, add the
/// gazetteer stage right after the entity recognizer.
pub fn initialise_nlp(
    lang_model: Option<&str>,
    patterns: Option<Patterns>,
    classes: Option<PatternsByClass>,
    label: Option<&str>,
) -> Result<Language> {
    let nlp = Language::load(lang_model.unwrap_or(DEFAULT_MODEL))?;
    let mut config = GazetteerConfig::default();
    if let Some(label) = label {
        config.default_label = label.to_string();
    }
    compose(nlp, patterns, classes, config)
}

/// Same as [`initialise_nlp`] for an already constructed base pipeline.
pub fn compose(
    mut nlp: Language,
    patterns: Option<Patterns>,
    classes: Option<PatternsByClass>,
    config: GazetteerConfig,
) -> Result<Language> {
    match (patterns, classes) {
        (Some(patterns), Some(classes)) if !patterns.is_empty() && !classes.is_empty() => {
            info!("parsed vocabulary data");
            let registry = PatternRegistry::new(patterns, classes)?;
            let annotator = GazetteerAnnotator::new(&nlp, registry, config)?;
            let position = if nlp.has_pipe(NER_PIPE) {
                PipePosition::After(NER_PIPE.to_string())
            } else {
                PipePosition::Last
            };
            nlp.add_pipe(GAZETTEER_PIPE, Arc::new(annotator), position)?;
        }
        _ => info!("no vocabulary supplied; using the base pipeline unchanged"),
    }
    Ok(nlp)
}
