//! Serve command - starts the API server and the threat monitor.

use anyhow::{Context, Result};
use colored::Colorize;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::warn;

use de_alerts::{AlertDispatcher, AlertMonitor};
use de_api::{ApiServer, ApiServerConfig, AppState};
use de_connectors::Connector;
use de_core::InMemoryUserRepository;
use de_observability::install_prometheus_recorder;

use super::{monitor_config, Services};
use crate::config::AppConfig;

/// Server configuration from CLI arguments.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    /// Port to listen on.
    pub port: u16,
    /// Hostname to bind to.
    pub host: String,
    /// Enable Swagger UI.
    pub enable_swagger: bool,
    /// Run the periodic threat monitor.
    pub enable_monitor: bool,
}

impl ServeConfig {
    /// Server settings from the config file.
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            port: config.server.port,
            host: config.server.host.clone(),
            enable_swagger: config.server.enable_swagger,
            enable_monitor: config.monitor.enabled,
        }
    }
}

/// Runs the API server.
pub async fn run_server(config: ServeConfig, app_config: AppConfig) -> Result<()> {
    println!("{} Starting DefendEarth API Server...", "[server]".cyan());

    let services = Services::from_config(&app_config)?;
    let providers = &app_config.providers;

    println!(
        "  {} Email: {}{}",
        "→".green(),
        services.email.name(),
        demo_suffix(services.email.is_demo())
    );
    println!(
        "  {} SMS: {}{}",
        "→".green(),
        services.sms.name(),
        demo_suffix(services.sms.is_demo())
    );
    println!(
        "  {} NASA: {}",
        "→".green(),
        if app_config.nasa.uses_demo_key() {
            "DEMO_KEY".yellow()
        } else {
            "API key".normal()
        }
    );

    let users = Arc::new(InMemoryUserRepository::new());

    let mut state = AppState::new(
        users.clone(),
        Arc::clone(&services.email),
        Arc::clone(&services.sms),
        Arc::clone(&services.neo),
        Arc::clone(&services.geocoder),
        Arc::clone(&services.elevation),
    )
    .with_gmail(Arc::clone(&services.gmail))
    .with_providers(providers.status())
    .with_nasa_demo_key(app_config.nasa.uses_demo_key())
    .with_default_country_code(app_config.default_country_code.clone());

    match install_prometheus_recorder() {
        Ok(handle) => state = state.with_prometheus_handle(handle),
        Err(e) => warn!(error = %e, "Prometheus recorder unavailable, /metrics disabled"),
    }

    let monitor = if config.enable_monitor {
        let monitor = Arc::new(AlertMonitor::new(
            Arc::clone(&services.neo),
            users,
            AlertDispatcher::new(Arc::clone(&services.email)),
            AlertDispatcher::new(Arc::clone(&services.sms)),
            monitor_config(&app_config.monitor),
        ));
        state = state.with_monitor(Arc::clone(&monitor));
        println!(
            "  {} Threat monitor every {}s",
            "→".green(),
            app_config.monitor.interval_secs
        );
        Some(monitor)
    } else {
        println!("  {} Threat monitor disabled", "→".yellow());
        None
    };

    let bind_address: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid bind address")?;

    let server_config = ApiServerConfig {
        bind_address,
        enable_swagger: config.enable_swagger,
        cors_origins: app_config.server.cors_origins.clone(),
    };

    println!();
    println!("{}", "DefendEarth API Server".bold());
    println!("{}", "═".repeat(40));
    println!("  {} http://{}", "Address:".cyan(), bind_address);

    if config.enable_swagger {
        println!(
            "  {} http://{}/swagger-ui",
            "Swagger UI:".cyan(),
            bind_address
        );
    }

    println!();
    println!("{}", "Endpoints:".bold());
    println!("  GET  /health                     - Health check");
    println!("  POST /api/register-sms-alerts    - Register for impact alerts");
    println!("  GET  /api/register-sms-alerts    - List registrations");
    println!("  POST /api/test-sms               - Send a test SMS");
    println!("  POST /api/test-gmail             - Send a test email");
    println!("  GET  /api/geology                - Elevation and terrain");
    println!("  GET  /api/population             - Population estimate");
    println!("  GET  /api/nasa                   - Near-Earth objects");
    println!("  POST /api/impact                 - Simulate an impact");
    println!("  POST /api/alerts/check           - Run a threat check");
    println!("  GET  /api/debug                  - Provider diagnostics");
    println!("  GET  /metrics                    - Prometheus metrics");
    println!();
    println!("Press {} to stop", "Ctrl+C".yellow());
    println!();

    let monitor_task = monitor.as_ref().map(|m| m.start());

    let server = ApiServer::new(state, server_config);
    let served = server.run().await.context("Server error");

    if let Some(monitor) = &monitor {
        monitor.shutdown();
    }
    if let Some(task) = monitor_task {
        if let Err(e) = task.await {
            warn!(error = %e, "Threat monitor task ended abnormally");
        }
    }

    served?;

    println!();
    println!("{} Server stopped", "[server]".cyan());

    Ok(())
}

fn demo_suffix(demo: bool) -> colored::ColoredString {
    if demo {
        " (demo mode)".yellow()
    } else {
        "".normal()
    }
}
