// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! HTTP server command

use anyhow::{Context, Result};
use clap::Args;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use physio_orchestrator_core::application::recovery_plan_service::RecoveryPlanService;
use physio_orchestrator_core::domain::planner_config::PlannerConfigManifest;
use physio_orchestrator_core::presentation::api;

#[derive(Args)]
pub struct ServeArgs {
    /// Bind address (default: spec.network.bind_address)
    #[arg(long, env = "PHYSIO_HOST")]
    host: Option<String>,

    /// HTTP port (default: spec.network.port)
    #[arg(long, env = "PHYSIO_PORT")]
    port: Option<u16>,
}

pub async fn execute(args: ServeArgs, config: PlannerConfigManifest) -> Result<()> {
    config
        .validate()
        .context("Configuration validation failed")?;
    if config.enabled_providers().next().is_none() {
        anyhow::bail!("No enabled providers in spec.providers; every plan request would fail");
    }

    info!(
        "Configuration loaded: name={}, providers={}, deadline={:?}",
        config.metadata.name,
        config.enabled_providers().count(),
        config.spec.planning.deadline
    );

    let service = RecoveryPlanService::from_config(&config);
    let app = api::app(service);

    let host = args.host.unwrap_or(config.spec.network.bind_address);
    let port = args.port.unwrap_or(config.spec.network.port);
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Recovery plan API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Server shutting down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
