//! CLI entry-point for inspecting a configured pipeline.

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::instrument;

use crate::{
    cli::PipelineArgs,
    config::Settings,
    gazetteer::{PatternRegistry, GAZETTEER_PIPE},
};

/// Args for the `inspect` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

#[derive(Debug, Serialize)]
struct PipelineSummary<'a> {
    model: &'a str,
    pipes: Vec<&'a str>,
    /// Recognizer label set, empty when the base model has no `ner` stage.
    labels: Vec<String>,
    /// Class name → number of surface strings.
    classes: IndexMap<String, usize>,
    keywords: usize,
}

#[instrument(skip(settings))]
pub fn run(args: Args, settings: Settings) -> Result<()> {
    let settings = args.pipeline.apply(settings);
    let (patterns, classes) = settings.load_vocabulary()?;
    let nlp = super::build_pipeline(&settings)?;

    let labels = nlp
        .entity_recognizer()
        .map(|ner| ner.labels())
        .unwrap_or_default();
    let keywords = match (patterns, classes.clone()) {
        (Some(patterns), Some(classes)) if nlp.has_pipe(GAZETTEER_PIPE) => {
            PatternRegistry::new(patterns, classes)
                .context("validating vocabulary")?
                .surfaces()
                .len()
        }
        _ => 0,
    };
    let summary = PipelineSummary {
        model: nlp.model(),
        pipes: nlp.pipe_names(),
        labels,
        classes: classes
            .unwrap_or_default()
            .into_iter()
            .map(|(class, surfaces)| (class, surfaces.len()))
            .collect(),
        keywords,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
