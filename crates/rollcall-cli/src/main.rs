//! Rollcall CLI - Attendance kiosk and admin tools
//!
//! Provides commands for:
//! - Running an interactive attendance kiosk
//! - Recording a single attendance action
//! - Viewing the roster and the news board
//! - Inspecting and checking the configured backend
//! - Viewing and validating configuration

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{
    backend::BackendCommand, completions::CompletionsCommand, config::ConfigCommand,
    kiosk::KioskCommand, news::NewsCommand, record::RecordCommand, roster::RosterCommand,
    CliContext,
};
use output::OutputFormat;
use rollcall_core::config::Config;

#[derive(Debug, Parser)]
#[command(name = "rollcall", version, about = "School attendance kiosk")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the interactive attendance kiosk
    Kiosk(KioskCommand),
    /// Record one attendance action
    Record(RecordCommand),
    /// Show the roster
    Roster(RosterCommand),
    /// Show the news board
    News(NewsCommand),
    /// Inspect the configured backend
    #[command(subcommand)]
    Backend(BackendCommand),
    /// View and validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Generate shell completions
    Completions(CompletionsCommand),
}

/// Filter directive from `-v`, falling back to the configured level
fn log_filter(verbose: u8, configured: &str) -> String {
    match verbose {
        0 => configured.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load_or_default(&config_path);

    let filter = log_filter(cli.verbose, &config.logging.level);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let ctx = CliContext {
        config_path,
        config,
        format: if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        },
    };

    match cli.command {
        Commands::Kiosk(cmd) => cmd.execute(&ctx).await,
        Commands::Record(cmd) => cmd.execute(&ctx).await,
        Commands::Roster(cmd) => cmd.execute(&ctx).await,
        Commands::News(cmd) => cmd.execute(&ctx).await,
        Commands::Backend(cmd) => cmd.execute(&ctx).await,
        Commands::Config(cmd) => cmd.execute(&ctx).await,
        Commands::Completions(cmd) => cmd.execute(&ctx).await,
    }
}
