//! CLI entry-point for annotating text.

use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use serde::Serialize;
use tracing::instrument;

use crate::{cli::PipelineArgs, config::Settings, nlp::Doc};

/// Args for the `annotate` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Text to annotate. Read from `--input` or stdin when absent.
    #[arg(long, conflicts_with = "input")]
    pub text: Option<String>,
    /// File to annotate.
    #[arg(long)]
    pub input: Option<PathBuf>,
    /// Pretty-print the JSON output.
    #[arg(long)]
    pub pretty: bool,
    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

/// One entity in the command output.
#[derive(Debug, Serialize)]
pub struct EntityOutput {
    pub text: String,
    pub label: Option<String>,
    pub start: usize,
    pub end: usize,
    /// Labels the covered tokens carried before the gazetteer stage ran.
    pub original_labels: Vec<Option<String>>,
}

#[derive(Debug, Serialize)]
pub struct DocumentOutput {
    pub tokens: usize,
    pub entities: Vec<EntityOutput>,
}

impl From<&Doc> for DocumentOutput {
    fn from(doc: &Doc) -> Self {
        let vocab = doc.vocab();
        let entities = doc
            .ents()
            .into_iter()
            .map(|ent| EntityOutput {
                text: ent.text(doc).to_string(),
                label: ent.label_text(doc),
                start: ent.start_char,
                end: ent.end_char,
                original_labels: ent
                    .original_labels(doc)
                    .into_iter()
                    .map(|label| label.and_then(|id| vocab.resolve(id)))
                    .collect(),
            })
            .collect();
        Self {
            tokens: doc.len(),
            entities,
        }
    }
}

#[instrument(skip(settings))]
pub fn run(args: Args, settings: Settings) -> Result<()> {
    let settings = args.pipeline.apply(settings);
    let nlp = super::build_pipeline(&settings)?;
    let text = read_text(&args)?;
    let doc = nlp.process(&text).context("running pipeline")?;
    let output = DocumentOutput::from(&doc);
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{rendered}");
    Ok(())
}

fn read_text(args: &Args) -> Result<String> {
    if let Some(text) = &args.text {
        return Ok(text.clone());
    }
    if let Some(path) = &args.input {
        return fs::read_to_string(path).with_context(|| format!("reading {}", path.display()));
    }
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("reading stdin")?;
    Ok(text)
}
