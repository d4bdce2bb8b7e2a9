//! Runtime configuration resolved from `.env`, the environment and defaults.

use std::{
    env,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use crate::{
    gazetteer::{GazetteerConfig, Patterns, PatternsByClass, DEFAULT_LABEL},
    nlp::{AlignmentMode, DEFAULT_MODEL},
};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base pipeline to load (`GAZETTEER_MODEL`).
    pub model: String,
    /// Label for matches without an explicit type (`GAZETTEER_DEFAULT_LABEL`).
    pub default_label: String,
    /// JSON file mapping surface strings to pattern records (`GAZETTEER_PATTERNS`).
    pub patterns_path: Option<PathBuf>,
    /// JSON file mapping class names to surface strings (`GAZETTEER_CLASSES`).
    pub classes_path: Option<PathBuf>,
    /// Match keywords with exact case (`GAZETTEER_CASE_SENSITIVE`).
    pub case_sensitive: bool,
    /// Token alignment for matches (`GAZETTEER_ALIGNMENT`: strict, contract, expand).
    pub alignment: AlignmentMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            default_label: DEFAULT_LABEL.to_string(),
            patterns_path: None,
            classes_path: None,
            case_sensitive: false,
            alignment: AlignmentMode::Strict,
        }
    }
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();
        let model = env::var("GAZETTEER_MODEL").unwrap_or(defaults.model);
        let default_label = env::var("GAZETTEER_DEFAULT_LABEL").unwrap_or(defaults.default_label);
        let patterns_path = env::var("GAZETTEER_PATTERNS").ok().map(PathBuf::from);
        let classes_path = env::var("GAZETTEER_CLASSES").ok().map(PathBuf::from);
        let case_sensitive = match env::var("GAZETTEER_CASE_SENSITIVE") {
            Ok(raw) => parse_flag(&raw)
                .with_context(|| format!("GAZETTEER_CASE_SENSITIVE={raw:?} is not a boolean"))?,
            Err(_) => defaults.case_sensitive,
        };
        let alignment = match env::var("GAZETTEER_ALIGNMENT") {
            Ok(raw) => serde_json::from_value(serde_json::Value::String(raw.to_lowercase()))
                .with_context(|| format!("GAZETTEER_ALIGNMENT={raw:?} is not an alignment mode"))?,
            Err(_) => defaults.alignment,
        };

        Ok(Self {
            model,
            default_label,
            patterns_path,
            classes_path,
            case_sensitive,
            alignment,
        })
    }

    /// Annotator options derived from these settings.
    pub fn gazetteer_config(&self) -> GazetteerConfig {
        GazetteerConfig::default()
            .with_default_label(self.default_label.clone())
            .with_case_sensitive(self.case_sensitive)
            .with_alignment(self.alignment)
    }

    /// Read both vocabulary files. Missing paths yield `None`.
    pub fn load_vocabulary(&self) -> Result<(Option<Patterns>, Option<PatternsByClass>)> {
        let patterns = self.patterns_path.as_deref().map(read_json::<Patterns>).transpose()?;
        let classes = self.classes_path.as_deref().map(read_json::<PatternsByClass>).transpose()?;
        Ok((patterns, classes))
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Deserialize a JSON document from `path`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}
