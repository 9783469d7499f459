// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use physio_orchestrator_core::domain::planner_config::PlannerConfigManifest;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./physio-config.yaml)
        #[arg(short, long, default_value = "./physio-config.yaml")]
        output: PathBuf,

        /// Include examples and comments
        #[arg(long)]
        examples: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    loaded: Result<PlannerConfigManifest>,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => {
            show(loaded.context("Failed to load configuration")?, config_override, paths).await
        }
        ConfigCommand::Validate { file: Some(file) } => {
            validate(PlannerConfigManifest::load_or_default(Some(file))).await
        }
        ConfigCommand::Validate { file: None } => validate(loaded).await,
        ConfigCommand::Generate { output, examples } => generate(output, examples).await,
    }
}

async fn show(
    config: PlannerConfigManifest,
    config_override: Option<PathBuf>,
    show_paths: bool,
) -> Result<()> {
    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. PHYSIO_CONFIG_PATH: {}",
            std::env::var("PHYSIO_CONFIG_PATH")
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./physio-config.yaml");
        println!("  4. ~/.physio/config.yaml");
        println!("  5. /etc/physio/config.yaml");
        println!();
    }

    println!("{}", "Current configuration:".bold());
    println!("  Name: {}", config.metadata.name);
    println!();

    println!("{}", "Provider chain (attempted in order):".bold());
    if config.spec.providers.is_empty() {
        println!("  {}", "(none configured)".yellow());
    }
    for (index, provider) in config.spec.providers.iter().enumerate() {
        let state = if !provider.enabled {
            "disabled".dimmed()
        } else if provider.requires_key() && provider.resolve_api_key().is_none() {
            "no key".yellow()
        } else {
            "ready".green()
        };
        println!(
            "  {}. {} ({:?}) [{}]",
            index + 1,
            provider.name.bold(),
            provider.provider_type,
            state
        );
        println!("     Endpoint: {}", provider.endpoint);
        println!("     Model: {}", provider.model);
        println!("     Timeout: {:?}", provider.timeout);
    }
    println!();

    let planning = &config.spec.planning;
    println!("{}", "Planning:".bold());
    println!("  Deadline: {:?}", planning.deadline);
    if let Some(temperature) = planning.temperature {
        println!("  Temperature: {}", temperature);
    }
    if let Some(max_tokens) = planning.max_tokens {
        println!("  Max tokens: {}", max_tokens);
    }
    println!(
        "  Prompt template: {}",
        if planning.prompt_template.is_some() {
            "custom"
        } else {
            "built-in"
        }
    );
    println!();

    println!("{}", "Network:".bold());
    println!(
        "  Listen: {}:{}",
        config.spec.network.bind_address, config.spec.network.port
    );
    println!();

    Ok(())
}

async fn validate(loaded: Result<PlannerConfigManifest>) -> Result<()> {
    println!("Validating configuration...");

    let config = loaded.context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: PathBuf, with_examples: bool) -> Result<()> {
    let sample = if with_examples {
        include_str!("../../templates/config-with-examples.yaml")
    } else {
        include_str!("../../templates/config-minimal.yaml")
    };

    std::fs::write(&output, sample)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}
