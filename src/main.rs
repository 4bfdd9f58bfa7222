use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod core;
mod daemon;
mod sources;

use crate::core::settings::Settings;

#[derive(Parser)]
#[command(name = "request-poller")]
#[command(author, version, about = "Polls status checks while requests are pending or processing")]
struct Cli {
    /// Path to config file (default: ~/.config/request-poller/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Arm the poller and re-arm it whenever the items file changes
    Watch {
        /// Items file (JSON array of {id, status})
        #[arg(long)]
        items: Option<PathBuf>,

        /// Poll interval in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,
    },

    /// Show the current item counts and whether the poller would arm
    Status {
        /// Items file (JSON array of {id, status})
        #[arg(long)]
        items: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_logging(debug: bool, json: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let (plain, structured) = if json {
        (None, Some(tracing_subscriber::fmt::layer().json()))
    } else {
        (Some(tracing_subscriber::fmt::layer()), None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(structured)
        .init();
}

fn load_settings(path: Option<&PathBuf>) -> Result<Settings> {
    let settings = match path {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    settings.validate()?;
    Ok(settings)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Watch { items, interval_ms } => {
            let mut settings = load_settings(cli.config.as_ref())?;
            init_logging(settings.debug, cli.log_json);

            if let Some(interval_ms) = interval_ms {
                settings.poller.interval_ms = interval_ms;
                settings.validate().context("Invalid --interval-ms")?;
            }

            let items_path = settings.resolve_items_path(items)?;
            daemon::run(settings, items_path).await
        }
        Commands::Status { items, json } => {
            let settings = load_settings(cli.config.as_ref())?;
            init_logging(settings.debug, cli.log_json);

            let items_path = settings.resolve_items_path(items)?;
            cli::status::run(&settings, items_path, json)
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}
