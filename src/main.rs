use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use code_summarizer::config::{Config, OutputFormat};
use code_summarizer::sink::{self, JsonLinesSink};
use code_summarizer::{EncoderStatus, SummarizerClient, SummarizerError};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_COMMIT_HASH"),
    ", built ",
    env!("BUILD_TIMESTAMP"),
    ")"
);

#[derive(Parser, Debug)]
#[command(
    name = "code-summarizer",
    version,
    long_version = LONG_VERSION,
    about = "Extract functions from a repository and attach summaries and embeddings"
)]
struct Cli {
    /// Root of the checked-out repository
    path: PathBuf,

    /// Identifier stored on every record (defaults to the path)
    #[arg(long)]
    repo_id: Option<String>,

    /// Where to write the records
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output serialization
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Print the summary only, write nothing
    #[arg(long)]
    no_save: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, env = "CODE_SUMMARIZER_CONFIG")]
    config: Option<PathBuf>,

    /// Files processed concurrently
    #[arg(long)]
    workers: Option<usize>,

    /// Number of records to preview on stdout
    #[arg(long, default_value_t = 5)]
    preview: usize,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Jsonl,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Jsonl => OutputFormat::Jsonl,
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries the preview
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load_or_default().context("Failed to load configuration")?,
    };
    config.apply_env_overrides();

    if let Some(workers) = cli.workers {
        config.indexing.max_workers = workers;
    }
    if let Some(output) = &cli.output {
        config.output.path = output.clone();
    }
    if let Some(format) = cli.format {
        config.output.format = format.into();
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Bad configuration or input path: one-line message, exit status 2
fn exit_if_user_error(err: anyhow::Error) -> anyhow::Error {
    if err
        .downcast_ref::<SummarizerError>()
        .is_some_and(SummarizerError::is_user_error)
    {
        eprintln!("error: {:#}", err);
        std::process::exit(2);
    }
    err
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = load_config(&cli).map_err(exit_if_user_error)?;
    let output = config.output.clone();
    let repo_id = cli
        .repo_id
        .clone()
        .unwrap_or_else(|| cli.path.display().to_string());

    // Model loading may download weights
    let client = tokio::task::spawn_blocking(move || SummarizerClient::with_config(config))
        .await
        .context("Client initialization task failed")?
        .context("Failed to initialize summarizer")?;

    if client.encoder_status() == EncoderStatus::Unavailable {
        tracing::warn!("Embedding model unavailable; records will have no embeddings");
    }

    let result = client
        .process_repository(&cli.path, &repo_id)
        .await
        .with_context(|| format!("Failed to process {}", cli.path.display()))
        .map_err(exit_if_user_error)?;

    println!("{}", result);
    if cli.preview > 0 && !result.is_empty() {
        println!("{}", result.preview(cli.preview));
    }
    if !result.errors.is_empty() {
        tracing::warn!("{} files could not be processed or read", result.errors.len());
    }

    if cli.no_save {
        return Ok(());
    }

    let written = match output.format {
        OutputFormat::Json => sink::write_json_array(&output.path, &result.records)
            .with_context(|| format!("Failed to write {}", output.path.display()))?,
        OutputFormat::Jsonl => {
            let mut jsonl = JsonLinesSink::create(&output.path)
                .with_context(|| format!("Failed to create {}", output.path.display()))?;
            sink::drain_into(&result.records, &mut jsonl)
        }
    };
    println!("Saved {} records to {}", written, output.path.display());

    Ok(())
}
