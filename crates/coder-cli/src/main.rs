use std::fs;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use coder_core::config::Config;
use tracing_subscriber::EnvFilter;

mod headless;
mod ui;

#[derive(Debug, Parser)]
#[command(
    name = "rust-coder",
    version,
    about = "Terminal client for the Rust Coder knowledge base"
)]
struct Cli {
    /// Config file; defaults to <config dir>/rust-coder/config.toml when present.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Backend base URL, overriding the config file and RUST_CODER_BASE_URL.
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    /// Where the interactive UI writes its log.
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive terminal UI (default).
    Tui,
    /// Add a block of text to the knowledge base.
    IngestText {
        #[arg(required_unless_present = "stdin", conflicts_with = "stdin")]
        text: Option<String>,
        /// Read the text from standard input.
        #[arg(long)]
        stdin: bool,
    },
    /// Upload a document to the knowledge base.
    IngestFile { path: PathBuf },
    /// Ask for code and print the extracted answer.
    Ask {
        query: String,
        /// Print the turn as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Rate a generated answer.
    Feedback {
        #[arg(long)]
        query: String,
        #[arg(long)]
        code: String,
        #[command(flatten)]
        vote: Vote,
    },
    /// Check that the backend is reachable.
    Ping,
    /// Ask the backend to shut down its knowledge store.
    Shutdown,
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct Vote {
    #[arg(long)]
    up: bool,
    #[arg(long)]
    down: bool,
}

impl Vote {
    fn upvoted(&self) -> bool {
        self.up && !self.down
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogTarget {
    File,
    Stderr,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = resolve_config(&cli)?;
    if let Some(path) = cli.log_file.clone() {
        config.logging.file = Some(path);
    }

    let command = cli.command.unwrap_or(Command::Tui);
    let target = match command {
        Command::Tui => LogTarget::File,
        _ => LogTarget::Stderr,
    };
    init_logging(&config, target)?;
    tracing::debug!(base_url = %config.backend.base_url, "configuration resolved");

    match command {
        Command::Tui => ui::run(config).await,
        Command::IngestText { text, stdin } => {
            let text = match text {
                Some(text) if !stdin => text,
                _ => headless::read_stdin().await?,
            };
            headless::ingest_text(config, text).await
        }
        Command::IngestFile { path } => headless::ingest_file(config, path).await,
        Command::Ask { query, json } => headless::ask(config, query, json).await,
        Command::Feedback { query, code, vote } => {
            headless::feedback(config, query, code, vote.upvoted()).await
        }
        Command::Ping => headless::ping(config).await,
        Command::Shutdown => headless::shutdown(config).await,
    }
}

/// Defaults, then the config file, then the environment, then flags.
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_env_overrides(|key| std::env::var(key).ok());
    let config = config.with_base_url(cli.base_url.clone()).validate()?;
    Ok(config)
}

fn env_filter(config: &Config) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_logging(config: &Config, target: LogTarget) -> anyhow::Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter(config));
    match target {
        LogTarget::Stderr => {
            builder
                .with_ansi(std::io::stderr().is_terminal())
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|err| anyhow::anyhow!(err))
                .context("failed to install the log subscriber")?;
        }
        // The terminal belongs to the UI, so its log goes to a file.
        LogTarget::File => {
            let path = config.logging.resolved_file();
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            let file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|err| anyhow::anyhow!(err))
                .with_context(|| format!("failed to log to {}", path.display()))?;
        }
    }
    Ok(())
}
