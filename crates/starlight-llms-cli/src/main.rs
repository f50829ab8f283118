use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::Parser;
use starlight_llms::{Config, DocEntry, LlmsError, PageConverter, SourceFormat};
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Convert a rendered Starlight page to Markdown.
///
/// Examples:
///   starlight-llms dist/guides/install/index.html
///   starlight-llms --minify --config llms.toml page.html
///   cat intro.md | starlight-llms --markdown-source
#[derive(Debug, Parser)]
#[command(name = "starlight-llms")]
#[command(about = "Convert rendered Starlight pages to Markdown", long_about = None)]
struct Cli {
    /// Page to convert; reads stdin when omitted.
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// TOML configuration file with `[minify]` and `[markdown]` tables.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Drop configured asides and sections and collapse whitespace.
    #[arg(long)]
    minify: bool,

    /// Treat the input as a Markdown source and print it unchanged.
    #[arg(long)]
    markdown_source: bool,

    /// Enable DEBUG-level logging.
    #[arg(long)]
    verbose: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: io::Error },

    #[error(transparent)]
    Convert(#[from] LlmsError),
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let markdown = run(&cli)?;
    println!("{markdown}");
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tracing::instrument(skip(cli))]
fn run(cli: &Cli) -> Result<String, CliError> {
    let config = match &cli.config {
        Some(path) => {
            let source = read_file(path)?;
            info!(path = %path.display(), "loaded configuration");
            Config::from_toml_str(&source)?
        }
        None => Config::default(),
    };
    let converter = PageConverter::from_config(&config)?;

    let (id, body) = match &cli.input {
        Some(path) => (path.display().to_string(), read_file(path)?),
        None => ("<stdin>".to_string(), read_stdin()?),
    };

    let format = if cli.markdown_source {
        SourceFormat::Markdown
    } else {
        cli.input
            .as_deref()
            .map_or(SourceFormat::Other, |path| SourceFormat::from_path(path))
    };
    debug!(%id, ?format, bytes = body.len(), "converting input");

    // The input is already rendered, so rendering hands the body back as is.
    let entry = DocEntry::new(id, format, body);
    let rendered = |entry: &DocEntry| -> starlight_llms::Result<String> { Ok(entry.body.clone()) };

    Ok(converter.entry_to_markdown(&entry, &rendered, cli.minify)?)
}

fn read_file(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.display().to_string(),
        source,
    })
}

fn read_stdin() -> Result<String, CliError> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|source| CliError::Read {
            path: "<stdin>".to_string(),
            source,
        })?;
    Ok(buffer)
}
