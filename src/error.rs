//! Library error type.

use thiserror::Error;

/// Errors raised while building or running a pipeline.
#[derive(Debug, Error)]
pub enum GazetteerError {
    /// A surface string listed under a class has no pattern record.
    #[error("surface string {surface:?} of class {class:?} has no pattern record")]
    MissingPattern { class: String, surface: String },

    /// A surface string was looked up that was never registered.
    #[error("surface string {0:?} is not a registered pattern")]
    UnknownSurface(String),

    #[error("failed to build pattern index: {0}")]
    Index(#[from] aho_corasick::BuildError),

    #[error("unknown language model {0:?}")]
    UnknownModel(String),

    #[error("pipeline already has a stage named {0:?}")]
    DuplicatePipe(String),

    #[error("pipeline has no stage named {0:?}")]
    MissingPipe(String),

    /// Two entity spans passed to `Doc::set_ents` share a token.
    #[error("conflicting entity spans [{0}, {1}) and [{2}, {3})")]
    ConflictingEntities(usize, usize, usize, usize),

    #[error("entity span [{0}, {1}) has no label")]
    UnlabelledEntity(usize, usize),

    #[error("token range [{start}, {end}) is out of bounds for a document of {len} tokens")]
    InvalidTokenRange { start: usize, end: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, GazetteerError>;
