//! anatomy-poster - framed anatomy poster mockups from AI image generation.

mod adapters;
mod batch;
mod cassette;
mod cli;
mod compose;
mod config;
mod context;
mod error;
mod form;
mod ports;
mod prompt;
mod requester;
mod server;
mod watermark;

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::batch::{run_batch, BatchJob};
use crate::cli::{BatchArgs, Cli, Command, MockupArgs, ServeArgs};
use crate::compose::MockupComposer;
use crate::config::Config;
use crate::context::{GeneratorMode, ServiceContext};
use crate::error::PosterError;
use crate::form::{FormAdapter, MockupForm, MockupOutcome};
use crate::prompt::{ANATOMY_SUBJECTS, ART_STYLES};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Diagnostics go to stderr; `RUST_LOG` overrides the verbosity flag.
fn setup_logging(verbose: bool) {
    let default = if verbose { "anatomy_poster=debug" } else { "anatomy_poster=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

async fn run(cli: Cli) -> Result<(), PosterError> {
    let config_path = config::discover_config_path(cli.config.as_deref());
    let mut config = Config::load(&config_path).map_err(PosterError::Config)?;
    let mode = GeneratorMode::from_env();

    if cli.verbose {
        eprintln!("Config: {}", config_path.display());
        eprintln!("Mode: {mode:?}");
    }

    match cli.command {
        Command::Mockup(args) => run_mockup(args, &mut config, mode).await,
        Command::Batch(args) => run_batch_command(args, &mut config, &mode).await,
        Command::Serve(args) => run_serve(args, &config, mode).await,
        Command::Styles => {
            println!("Styles:");
            for style in ART_STYLES {
                println!("  {style}");
            }
            println!("Subjects:");
            for subject in ANATOMY_SUBJECTS {
                println!("  {subject}");
            }
            Ok(())
        }
    }
}

async fn run_mockup(args: MockupArgs, config: &mut Config, mode: GeneratorMode) -> Result<(), PosterError> {
    if let Some(template) = args.template {
        config.mockup.template = PathBuf::from(template);
    }
    let form = MockupForm {
        api_key: args.api_key,
        subject: args.subject,
        style: args.style,
        watermark: args.watermark.unwrap_or_else(|| config.mockup.watermark.clone()),
    };

    match FormAdapter::from_config(mode, config).submit(&form).await {
        MockupOutcome::Success(path) => {
            eprintln!("Saved: {}", path.display());
            Ok(())
        }
        MockupOutcome::ServiceError(detail)
        | MockupOutcome::TemplateError(detail)
        | MockupOutcome::ComposeError(detail) => {
            eprintln!("No mockup generated: {detail}");
            process::exit(1);
        }
    }
}

async fn run_batch_command(
    args: BatchArgs,
    config: &mut Config,
    mode: &GeneratorMode,
) -> Result<(), PosterError> {
    if let Some(dir) = args.output_dir {
        config.batch.output_dir = PathBuf::from(dir);
    }
    let api_key = match mode {
        GeneratorMode::Replaying(_) => String::new(),
        _ => config.openai_key().ok_or(PosterError::MissingApiKey {
            provider: "OpenAI".into(),
            env_var: "OPENAI_API_KEY".into(),
        })?,
    };
    let subjects: Vec<String> = if args.subjects.is_empty() {
        ANATOMY_SUBJECTS.iter().map(ToString::to_string).collect()
    } else {
        args.subjects
    };

    let (ctx, session) = ServiceContext::for_credential(mode, &api_key, &config.openai)?;
    let composer = MockupComposer::new(&config.mockup);
    let watermark = args.watermark.unwrap_or_else(|| config.mockup.watermark.clone());
    let job = BatchJob {
        model: &config.openai.model,
        style: Some(args.style.as_str()),
        watermark: &watermark,
        composer: &composer,
        output: &config.batch,
        date: chrono::Local::now().date_naive(),
    };

    let report = run_batch(ctx.generator.as_ref(), &job, &subjects).await;
    drop(ctx);
    if let Some(session) = session {
        match session.finish() {
            Ok(path) => eprintln!("Cassette saved: {}", path.display()),
            Err(e) => eprintln!("Warning: failed to save cassette: {e}"),
        }
    }
    let report = report?;

    for path in &report.generated {
        eprintln!("Saved: {}", path.display());
    }
    eprintln!("Generated {} of {} posters", report.generated.len(), subjects.len());
    if report.generated.is_empty() && !report.failed.is_empty() {
        return Err(PosterError::Batch(format!("all {} subjects failed", report.failed.len())));
    }
    Ok(())
}

async fn run_serve(args: ServeArgs, config: &Config, mode: GeneratorMode) -> Result<(), PosterError> {
    let listen = args.listen.unwrap_or_else(|| config.server.listen.clone());
    let adapter = FormAdapter::from_config(mode, config);
    server::setup_server(&listen, adapter, &config.mockup.watermark).await
}
