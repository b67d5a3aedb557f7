use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use daybook_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "daybook")]
#[command(author, version, about = "A scroll-synchronized terminal diary viewer")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Diary manifest to open instead of <data_dir>/entries.json
    #[arg(short = 'm', long = "manifest", global = true)]
    manifest: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI
    Run,
    /// List diary entries by month
    List,
    /// Show the configuration file path and effective settings
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Arc::new(AppConfig::load()?);

    // The TUI owns the terminal, so it logs to a file
    let tui = matches!(cli.command, Some(Commands::Run) | None);
    init_logging(&config, tui.then(|| config.log_path()).as_deref())?;

    match cli.command {
        Some(Commands::Run) | None => commands::run::run(config, cli.manifest).await,
        Some(Commands::List) => commands::list::run(&config, cli.manifest.as_deref()),
        Some(Commands::Config) => commands::config::run(&config),
    }
}

fn init_logging(config: &AppConfig, log_file: Option<&Path>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
    );

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(file)
                        .with_target(false)
                        .with_ansi(false),
                )
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(false),
                )
                .init();
        }
    }

    Ok(())
}
