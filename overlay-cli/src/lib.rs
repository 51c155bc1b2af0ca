//! # Overlay CLI
//!
//! Command-line front end for overlay documents.
//!
//! ## Commands
//!
//! - `overlay export <doc.json> -o <out.html>` - render a standalone, keyboard
//!   triggered HTML artifact
//! - `overlay plan <doc.json> [--phase enter|exit]` - print the resolved
//!   animation intents as JSON
//! - `overlay sample -o <doc.json>` - write a small animated lower-third
//!   document to start from
//!
//! Export options fall back to `OVERLAY_TITLE` and `OVERLAY_TRANSPARENT`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use overlay_core::animation::{self, AnimationIntent};
use overlay_core::{
    AnimationConfig, AnimationType, ArtifactExporter, EditorStore, ElementPatch, ExportConfig,
    GraphicDocument, Phase,
};
use serde::Serialize;

/// Command-line arguments for overlay.
#[derive(Debug, Clone, Parser)]
#[command(name = "overlay")]
#[command(about = "Export and inspect animated graphic overlays")]
#[command(version)]
pub struct CliArgs {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Render a document to a standalone HTML page
    Export(ExportArgs),

    /// Print the animation plan of a document
    Plan {
        /// Document JSON file
        document: PathBuf,

        /// Only this phase (enter or exit)
        #[arg(long)]
        phase: Option<Phase>,
    },

    /// Write a sample document
    Sample {
        /// Output JSON file
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Arguments of `overlay export`.
#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    /// Document JSON file
    pub document: PathBuf,

    /// Output HTML file
    #[arg(short, long)]
    pub output: PathBuf,

    /// Page title (defaults to the document name)
    #[arg(long, env = "OVERLAY_TITLE")]
    pub title: Option<String>,

    /// Transparent page background, for keying over video
    #[arg(long, env = "OVERLAY_TRANSPARENT")]
    pub transparent: bool,

    /// Key that triggers the enter phase
    #[arg(long, default_value = "1")]
    pub enter_key: char,

    /// Key that triggers the exit phase
    #[arg(long, default_value = "2")]
    pub exit_key: char,
}

impl From<&ExportArgs> for ExportConfig {
    fn from(args: &ExportArgs) -> Self {
        Self {
            title: args.title.clone(),
            transparent_background: args.transparent,
            enter_key: args.enter_key,
            exit_key: args.exit_key,
        }
    }
}

/// One phase of `overlay plan` output.
#[derive(Debug, Serialize)]
struct PhasePlan {
    phase: Phase,
    intents: Vec<AnimationIntent>,
}

/// Run a parsed command. Human-facing output goes to `out`.
///
/// # Errors
///
/// Returns an error if a file cannot be read, parsed or written.
pub fn run<W: Write>(args: CliArgs, out: &mut W) -> anyhow::Result<()> {
    match args.command {
        Command::Export(export) => {
            let document = load_document(&export.document)?;
            let html = ArtifactExporter::new(ExportConfig::from(&export))
                .export_html(&document)
                .context("Failed to render artifact")?;
            fs::write(&export.output, html)
                .with_context(|| format!("Failed to write {}", export.output.display()))?;
            writeln!(out, "Exported {}", export.output.display())?;
        }
        Command::Plan { document, phase } => {
            let document = load_document(&document)?;
            let phases = match phase {
                Some(phase) => vec![phase],
                None => vec![Phase::Enter, Phase::Exit],
            };
            let plans: Vec<PhasePlan> = phases
                .into_iter()
                .map(|phase| PhasePlan {
                    phase,
                    intents: animation::plan_document(&document, phase),
                })
                .collect();
            serde_json::to_writer_pretty(&mut *out, &plans)?;
            writeln!(out)?;
        }
        Command::Sample { output } => {
            let json = sample_document().to_json_pretty()?;
            fs::write(&output, json)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            tracing::info!("Wrote sample document to {}", output.display());
            writeln!(out, "Wrote {}", output.display())?;
        }
    }
    Ok(())
}

fn load_document(path: &Path) -> anyhow::Result<GraphicDocument> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let document = GraphicDocument::from_json(&json)
        .with_context(|| format!("Invalid document {}", path.display()))?;
    tracing::debug!(
        "Loaded '{}' with {} element(s)",
        document.name,
        document.len()
    );
    Ok(document)
}

/// A lower third: bar fades in, title slides in over it, badge pops in last.
#[must_use]
pub fn sample_document() -> GraphicDocument {
    let mut store = EditorStore::new();

    if let Some(bar) = store.add_rectangle() {
        store.update_element(
            bar,
            &ElementPatch {
                name: Some("Bar".to_string()),
                x: Some(80.0),
                y: Some(860.0),
                width: Some(900.0),
                height: Some(120.0),
                opacity: Some(0.9),
                corner_radius: Some(12.0),
                in_animation: Some(AnimationConfig::new(AnimationType::FadeIn, 0.6, 0.0)),
                out_animation: Some(AnimationConfig::new(AnimationType::FadeIn, 0.4, 0.3)),
                ..ElementPatch::default()
            },
        );
    }

    if let Some(title) = store.add_text() {
        store.update_element(
            title,
            &ElementPatch {
                name: Some("Title".to_string()),
                text: Some("Breaking News".to_string()),
                x: Some(120.0),
                y: Some(890.0),
                width: Some(820.0),
                height: Some(60.0),
                font_size: Some(48.0),
                in_animation: Some(AnimationConfig::new(AnimationType::SlideRight, 0.8, 0.3)),
                out_animation: Some(AnimationConfig::new(AnimationType::SlideLeft, 0.4, 0.0)),
                ..ElementPatch::default()
            },
        );
    }

    if let Some(badge) = store.add_circle() {
        store.update_element(
            badge,
            &ElementPatch {
                name: Some("Badge".to_string()),
                x: Some(1000.0),
                y: Some(870.0),
                radius: Some(50.0),
                in_animation: Some(AnimationConfig::new(AnimationType::ScaleUp, 0.5, 0.9)),
                out_animation: Some(AnimationConfig::new(AnimationType::ScaleUp, 0.3, 0.0)),
                ..ElementPatch::default()
            },
        );
    }

    store.document().clone()
}
