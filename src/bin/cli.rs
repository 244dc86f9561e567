//! msgarchive CLI
//!
//! Offline tooling around the archive: configuration checks, extraction from
//! saved thread pages, and archive inspection. Live traversal needs a browser
//! driver and is run through the library's `Orchestrator`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use msgarchive::{
    error::{AppError, Result},
    models::Config,
    pipeline,
};

/// msgarchive - Message history archiver
#[derive(Parser, Debug)]
#[command(
    name = "msgarchive",
    version,
    about = "Archive private message history to append-only logs"
)]

struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "msgarchive.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the configuration file
    Validate,

    /// Write the default configuration
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Extract messages from a saved thread page
    Extract {
        /// HTML file of a fully expanded thread
        html: PathBuf,

        /// Also append the messages to this archive type
        #[arg(long)]
        archive: Option<String>,
    },

    /// Summarize an archive stream
    Inspect {
        /// Archive type (defaults to the configured one)
        archive_type: Option<String>,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Validate => {
            pipeline::run_validate(&cli.config)?;
        }

        Command::Init { force } => {
            if cli.config.exists() && !force {
                log::warn!(
                    "Config already exists at {}. Use --force to overwrite.",
                    cli.config.display()
                );
                return Ok(());
            }
            std::fs::write(&cli.config, Config::default().to_toml()?)?;
            log::info!("Default configuration written to {}", cli.config.display());
        }

        Command::Extract { html, archive } => {
            let config = Config::load_or_default(&cli.config);
            if !html.exists() {
                return Err(AppError::validation(format!(
                    "Thread page not found at {}",
                    html.display()
                )));
            }

            let outcome = pipeline::run_extract(&config, &html, archive.as_deref()).await?;
            for message in &outcome.messages {
                println!("{}", serde_json::to_string(message)?);
            }
        }

        Command::Inspect { archive_type } => {
            let config = Config::load_or_default(&cli.config);
            let archive_type = archive_type.unwrap_or_else(|| config.archive.archive_type.clone());
            let stats = pipeline::run_inspect(&config, &archive_type).await?;

            log::info!("Conversations: {}", stats.conversations);
            log::info!("Distinct names: {}", stats.distinct_names);
            log::info!("Messages: {}", stats.messages);
            log::info!("Undated: {}", stats.undated);
            if let (Some(earliest), Some(latest)) = (stats.earliest, stats.latest) {
                log::info!("Date span: {} .. {}", earliest, latest);
            }
        }
    }

    Ok(())
}
