// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Physio Recovery Planner CLI
//!
//! The `physio` binary turns a patient intake into a structured recovery plan
//! by walking an ordered chain of LLM providers.
//!
//! ## Commands
//!
//! - `physio serve` - Run the HTTP API
//! - `physio plan --profile FILE` - Generate one plan and print it as JSON
//! - `physio config show|validate|generate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use physio_orchestrator_core::domain::planner_config::PlannerConfigManifest;

mod commands;

use commands::{ConfigCommand, PlanArgs, ServeArgs};

/// Physio Recovery Planner - Personalised physiotherapy plans from LLM providers
#[derive(Parser)]
#[command(name = "physio")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "PHYSIO_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Defaults to the configured level
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the recovery plan HTTP API
    #[command(name = "serve")]
    Serve {
        #[command(flatten)]
        args: ServeArgs,
    },

    /// Generate a single recovery plan
    #[command(name = "plan")]
    Plan {
        #[command(flatten)]
        args: PlanArgs,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // The global subscriber depends on the config, so loading is logged
    // through a temporary one.
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.log_level.as_deref().unwrap_or("info"))?)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish();
    let loaded = tracing::subscriber::with_default(bootstrap, || {
        PlannerConfigManifest::load_or_default(cli.config.clone())
    });

    let logging = loaded
        .as_ref()
        .map(|config| config.logging())
        .unwrap_or_default();
    let level = cli.log_level.as_deref().unwrap_or(&logging.level);
    init_logging(level, &logging.format)?;

    match cli.command {
        Some(Commands::Serve { args }) => {
            let config = loaded.context("Failed to load configuration")?;
            commands::serve::execute(args, config).await
        }
        Some(Commands::Plan { args }) => {
            let config = loaded.context("Failed to load configuration")?;
            commands::plan::execute(args, config).await
        }
        Some(Commands::Config { command }) => {
            commands::config::handle_command(command, loaded, cli.config).await
        }
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// `RUST_LOG` first, then the given level
fn log_filter(level: &str) -> Result<tracing_subscriber::EnvFilter> {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")
}

/// Initialize tracing subscriber for logging.
///
/// Logs go to stderr so `physio plan` output can be piped.
fn init_logging(level: &str, format: &str) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(log_filter(level)?)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if format.eq_ignore_ascii_case("json") {
        builder.json().init();
    } else {
        builder.compact().init();
    }

    Ok(())
}
