//! Minimal document-processing host the gazetteer stage runs inside.

pub mod doc;
pub mod language;
pub mod ner;
pub mod tokenizer;
pub mod vocab;

pub use doc::{AlignmentMode, Doc, EntIob, Span, Token};
pub use language::{Language, Pipe, PipePosition, BLANK_MODEL, DEFAULT_MODEL, NER_PIPE};
pub use ner::{CapitalizationNer, DictionaryNer, EntityRecognizer, Mention, Ner};
pub use tokenizer::Tokenizer;
pub use vocab::{LabelId, StringStore};
