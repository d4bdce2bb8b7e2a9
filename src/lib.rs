//! Gazetteer keyword matching for entity recognition pipelines.
//!
//! A [`gazetteer::GazetteerAnnotator`] forces registered phrases onto fixed
//! entity labels after the base recognizer has run, while keeping the label
//! each token carried before the override.

pub mod cli;
pub mod config;
pub mod error;
pub mod gazetteer;
pub mod logging;
pub mod nlp;

pub use error::{GazetteerError, Result};
pub use gazetteer::{initialise_nlp, GazetteerAnnotator, GazetteerConfig};
pub use nlp::{Doc, Language};
