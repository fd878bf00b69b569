//! CLI argument parsing with clap.

use clap::{Args, Parser, Subcommand};

use crate::prompt::{ART_STYLES, NO_STYLE};

/// Generate framed anatomy poster mockups from AI image generation.
#[derive(Parser, Debug)]
#[command(name = "anatomy-poster", version, about)]
pub struct Cli {
    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate one framed mockup, as the form does.
    Mockup(MockupArgs),
    /// Generate posters for many subjects and log them to CSV.
    Batch(BatchArgs),
    /// Serve the mockup form over HTTP.
    Serve(ServeArgs),
    /// List the available art styles and batch subjects.
    Styles,
}

/// Arguments for `mockup`.
#[derive(Args, Debug)]
pub struct MockupArgs {
    /// Anatomy term, e.g. "Heart".
    pub subject: String,

    /// Your `OpenAI` API key.
    #[arg(short = 'k', long, env = "OPENAI_API_KEY", hide_env_values = true, default_value = "")]
    pub api_key: String,

    /// Art style.
    #[arg(short, long, default_value = NO_STYLE, value_parser = clap::builder::PossibleValuesParser::new(ART_STYLES.iter().copied()))]
    pub style: String,

    /// Watermark text; pass an empty string for none (defaults to the configured one).
    #[arg(short, long)]
    pub watermark: Option<String>,

    /// Frame template override.
    #[arg(short, long)]
    pub template: Option<String>,
}

/// Arguments for `batch`.
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Subjects to generate; all catalogue subjects when empty.
    pub subjects: Vec<String>,

    /// Art style applied to every subject.
    #[arg(short, long, default_value = NO_STYLE, value_parser = clap::builder::PossibleValuesParser::new(ART_STYLES.iter().copied()))]
    pub style: String,

    /// Watermark text (defaults to the configured one).
    #[arg(short, long)]
    pub watermark: Option<String>,

    /// Output directory override.
    #[arg(short, long)]
    pub output_dir: Option<String>,
}

/// Arguments for `serve`.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Listen address override, e.g. 0.0.0.0:7860.
    #[arg(short, long)]
    pub listen: Option<String>,
}
