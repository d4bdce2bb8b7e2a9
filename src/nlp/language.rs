//! Pipeline host: tokenizer plus a named, ordered list of document stages.

use std::{fmt, sync::Arc};

use tracing::{debug, info};

use crate::{
    error::{GazetteerError, Result},
    nlp::{
        doc::Doc,
        ner::{CapitalizationNer, EntityRecognizer, Ner},
        tokenizer::Tokenizer,
        vocab::{LabelId, StringStore},
    },
};

/// Model loaded when the caller does not name one.
pub const DEFAULT_MODEL: &str = "en_heuristic";
/// Tokenizer only, no stages.
pub const BLANK_MODEL: &str = "blank";
/// Stage name of the base entity recognizer.
pub const NER_PIPE: &str = "ner";

/// A pipeline stage. Takes ownership of the document and hands it back.
pub trait Pipe: Send + Sync {
    fn process(&self, doc: Doc) -> Result<Doc>;

    /// Downcast hook for the entity recognizer stage.
    fn as_recognizer(&self) -> Option<&EntityRecognizer> {
        None
    }
}

impl<F> Pipe for F
where
    F: Fn(Doc) -> Result<Doc> + Send + Sync,
{
    fn process(&self, doc: Doc) -> Result<Doc> {
        self(doc)
    }
}

/// Where [`Language::add_pipe`] inserts a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipePosition {
    First,
    Last,
    Before(String),
    After(String),
}

pub struct Language {
    model: String,
    vocab: Arc<StringStore>,
    tokenizer: Tokenizer,
    pipeline: Vec<(String, Arc<dyn Pipe>)>,
}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Language")
            .field("model", &self.model)
            .field("pipe_names", &self.pipe_names())
            .finish_non_exhaustive()
    }
}

impl Language {
    /// Pipeline with a tokenizer and no stages.
    pub fn blank() -> Self {
        Self {
            model: BLANK_MODEL.to_string(),
            vocab: Arc::new(StringStore::new()),
            tokenizer: Tokenizer::default(),
            pipeline: Vec::new(),
        }
    }

    /// Load one of the built-in base pipelines by name.
    pub fn load(model: &str) -> Result<Self> {
        let nlp = match model {
            BLANK_MODEL => Self::blank(),
            DEFAULT_MODEL => Self::blank().with_ner(Arc::new(CapitalizationNer))?,
            other => return Err(GazetteerError::UnknownModel(other.to_string())),
        };
        let nlp = Self {
            model: model.to_string(),
            ..nlp
        };
        info!(model, pipes = ?nlp.pipe_names(), "loaded base pipeline");
        Ok(nlp)
    }

    /// Append an entity recognizer stage named `"ner"` backed by `model`.
    pub fn with_ner(mut self, model: Arc<dyn Ner>) -> Result<Self> {
        let stage = EntityRecognizer::new(model);
        for label in stage.labels() {
            self.vocab.add(&label);
        }
        self.add_pipe(NER_PIPE, Arc::new(stage), PipePosition::Last)?;
        Ok(self)
    }

    pub fn with_tokenizer(mut self, tokenizer: Tokenizer) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn vocab(&self) -> &Arc<StringStore> {
        &self.vocab
    }

    pub fn pipe_names(&self) -> Vec<&str> {
        self.pipeline.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn has_pipe(&self, name: &str) -> bool {
        self.position_of(name).is_some()
    }

    pub fn get_pipe(&self, name: &str) -> Option<&Arc<dyn Pipe>> {
        self.pipeline
            .iter()
            .find(|(stage, _)| stage == name)
            .map(|(_, pipe)| pipe)
    }

    /// The `"ner"` stage, if this pipeline has one.
    pub fn entity_recognizer(&self) -> Option<&EntityRecognizer> {
        self.get_pipe(NER_PIPE).and_then(|pipe| pipe.as_recognizer())
    }

    fn position_of(&self, name: &str) -> Option<usize> {
        self.pipeline.iter().position(|(stage, _)| stage == name)
    }

    pub fn add_pipe(
        &mut self,
        name: impl Into<String>,
        pipe: Arc<dyn Pipe>,
        position: PipePosition,
    ) -> Result<()> {
        let name = name.into();
        if self.has_pipe(&name) {
            return Err(GazetteerError::DuplicatePipe(name));
        }
        let idx = match &position {
            PipePosition::First => 0,
            PipePosition::Last => self.pipeline.len(),
            PipePosition::Before(anchor) => self
                .position_of(anchor)
                .ok_or_else(|| GazetteerError::MissingPipe(anchor.clone()))?,
            PipePosition::After(anchor) => {
                self.position_of(anchor)
                    .ok_or_else(|| GazetteerError::MissingPipe(anchor.clone()))?
                    + 1
            }
        };
        debug!(%name, idx, "adding pipeline stage");
        self.pipeline.insert(idx, (name, pipe));
        Ok(())
    }

    pub fn remove_pipe(&mut self, name: &str) -> Result<Arc<dyn Pipe>> {
        let idx = self
            .position_of(name)
            .ok_or_else(|| GazetteerError::MissingPipe(name.to_string()))?;
        Ok(self.pipeline.remove(idx).1)
    }

    /// Intern `label` and allow the recognizer stage to emit it.
    pub fn add_entity_label(&self, label: &str) -> LabelId {
        let id = self.vocab.add(label);
        if let Some(ner) = self.entity_recognizer() {
            ner.add_label(label);
        }
        id
    }

    /// Tokenize without running any stage.
    pub fn make_doc(&self, text: &str) -> Doc {
        let boundaries = self.tokenizer.tokenize(text);
        Doc::new(Arc::clone(&self.vocab), text, &boundaries)
    }

    /// Tokenize and run every stage in order.
    pub fn process(&self, text: &str) -> Result<Doc> {
        self.pipeline
            .iter()
            .try_fold(self.make_doc(text), |doc, (_, pipe)| pipe.process(doc))
    }
}
