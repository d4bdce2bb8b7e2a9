//! Command-line interface wiring for gazetteer-ner.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::{
    config::Settings,
    gazetteer,
    nlp::{AlignmentMode, Language},
};

pub mod annotate;
pub mod inspect;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(author, version, about = "Gazetteer keyword matching over entity recognition", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Dispatch the selected sub-command.
    pub fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::Annotate(args) => annotate::run(args, settings),
            Commands::Inspect(args) => inspect::run(args, settings),
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the pipeline over text and print the resulting entities as JSON.
    Annotate(annotate::Args),
    /// Show pipeline stages, vocabulary sizes and known labels.
    Inspect(inspect::Args),
}

/// Pipeline options shared by every sub-command. Flags override environment settings.
#[derive(Debug, Clone, Args)]
pub struct PipelineArgs {
    /// Base pipeline to load.
    #[arg(long)]
    pub model: Option<String>,
    /// JSON file mapping surface strings to pattern records.
    #[arg(long)]
    pub patterns: Option<PathBuf>,
    /// JSON file mapping class names to surface strings.
    #[arg(long)]
    pub classes: Option<PathBuf>,
    /// Label for matches whose pattern has no entity type.
    #[arg(long)]
    pub label: Option<String>,
    /// Match keywords with exact case.
    #[arg(long)]
    pub case_sensitive: bool,
    /// How matches cutting through a token are aligned.
    #[arg(long, value_enum)]
    pub alignment: Option<AlignmentMode>,
}

impl PipelineArgs {
    /// Settings with these flags applied on top.
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(model) = &self.model {
            settings.model = model.clone();
        }
        if let Some(path) = &self.patterns {
            settings.patterns_path = Some(path.clone());
        }
        if let Some(path) = &self.classes {
            settings.classes_path = Some(path.clone());
        }
        if let Some(label) = &self.label {
            settings.default_label = label.clone();
        }
        if self.case_sensitive {
            settings.case_sensitive = true;
        }
        if let Some(alignment) = self.alignment {
            settings.alignment = alignment;
        }
        settings
    }
}

/// Load the base pipeline and attach the gazetteer stage when a vocabulary is configured.
pub fn build_pipeline(settings: &Settings) -> Result<Language> {
    let (patterns, classes) = settings.load_vocabulary()?;
    let base = Language::load(&settings.model)
        .with_context(|| format!("loading base pipeline {:?}", settings.model))?;
    let nlp = gazetteer::compose(base, patterns, classes, settings.gazetteer_config())
        .context("building gazetteer stage")?;
    info!(pipes = ?nlp.pipe_names(), "pipeline ready");
    Ok(nlp)
}
