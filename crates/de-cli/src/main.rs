//! DefendEarth CLI
//!
//! Command-line interface for the DefendEarth impact simulator and alert service.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

mod commands;
mod config;
mod validator;

use commands::{run_check, run_impact, run_server, CheckOptions, ImpactOptions, ServeConfig};
use config::AppConfig;
use de_observability::LoggingConfig;
use validator::ConfigValidator;

#[derive(Parser)]
#[command(name = "defend-earth")]
#[command(author = "DefendEarth Team")]
#[command(version)]
#[command(about = "Asteroid impact simulation and planetary defense alerts", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", env = "DEFEND_EARTH_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid output format: {}", s)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server and the threat monitor
    Serve {
        /// Port to listen on (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Disable Swagger UI
        #[arg(long)]
        no_swagger: bool,

        /// Do not run the periodic threat monitor
        #[arg(long)]
        no_monitor: bool,

        /// Validate configuration and exit
        #[arg(long)]
        validate_only: bool,
    },

    /// Estimate impact effects and risk for an asteroid
    Impact {
        /// Diameter in meters
        #[arg(short, long)]
        diameter: f64,

        /// Velocity in km/s
        #[arg(long, default_value = "20")]
        velocity: f64,

        /// Density in kg/m³
        #[arg(long)]
        density: Option<f64>,

        /// Impact angle from horizontal in degrees
        #[arg(long)]
        angle: Option<f64>,

        /// Impact latitude; looks up terrain and population with --lng
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Impact longitude
        #[arg(long, allow_hyphen_values = true)]
        lng: Option<f64>,

        /// Days between detection and impact
        #[arg(long, default_value = "365")]
        warning_days: f64,
    },

    /// Run one threat check against the NASA feed without sending alerts
    Check {
        /// First day of the feed window (YYYY-MM-DD), default today
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Days after the start to include
        #[arg(long)]
        days: Option<u32>,

        /// Override the random flag chance (0 disables drill alerts)
        #[arg(long)]
        random_chance: Option<f64>,
    },

    /// Validate configuration
    Validate {
        /// Configuration file to validate
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show current configuration
    Config {
        /// Show secrets
        #[arg(long)]
        show_secrets: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);

    let config = match AppConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            if cli.config.is_some() {
                return Err(e);
            }
            if cli.verbose {
                eprintln!("Using default configuration (no config file found)");
            }
            AppConfig::default()
        }
    }
    .with_env_overrides()?;

    let logging = if cli.verbose {
        LoggingConfig::development()
    } else {
        LoggingConfig::default().with_level_name(&config.logging.level)
    };
    de_observability::init_logging_with_config(
        logging.with_json(config.logging.json_format || cli.format == OutputFormat::Json),
    );

    let json = cli.format == OutputFormat::Json;

    match cli.command {
        Commands::Serve {
            port,
            host,
            no_swagger,
            no_monitor,
            validate_only,
        } => {
            let mut serve = ServeConfig::from_app_config(&config);
            if let Some(port) = port {
                serve.port = port;
            }
            if let Some(host) = host {
                serve.host = host;
            }
            serve.enable_swagger &= !no_swagger;
            serve.enable_monitor &= !no_monitor;
            cmd_serve(serve, config, validate_only).await
        }
        Commands::Impact {
            diameter,
            velocity,
            density,
            angle,
            lat,
            lng,
            warning_days,
        } => {
            run_impact(
                ImpactOptions {
                    diameter_m: diameter,
                    velocity_km_s: velocity,
                    density_kg_m3: density,
                    impact_angle_deg: angle,
                    latitude: lat,
                    longitude: lng,
                    warning_time_days: warning_days,
                },
                config,
                json,
            )
            .await
        }
        Commands::Check {
            start,
            days,
            random_chance,
        } => {
            run_check(
                CheckOptions {
                    start,
                    days,
                    random_chance,
                },
                config,
                json,
            )
            .await
        }
        Commands::Validate { config: cfg_path } => cmd_validate(cfg_path.unwrap_or(config_path)),
        Commands::Config { show_secrets } => cmd_config(config, show_secrets, json),
    }
}

fn default_config_path() -> PathBuf {
    PathBuf::from("config/defend-earth.yaml")
}

async fn cmd_serve(
    serve_config: ServeConfig,
    app_config: AppConfig,
    validate_only: bool,
) -> Result<()> {
    println!("{}", "Validating configuration...".cyan());

    let validation_result = ConfigValidator::validate(&app_config);
    validation_result.print();

    if validation_result.has_errors() {
        println!();
        let message = if validate_only {
            "Configuration validation failed. Fix the errors above before starting the server."
        } else {
            "Server startup aborted due to configuration errors. Fix the errors above and try again."
        };
        println!("{}", message.red().bold());
        std::process::exit(1);
    }

    if validate_only {
        println!();
        println!(
            "{}",
            "Configuration is valid. Server can be started."
                .green()
                .bold()
        );
        return Ok(());
    }

    println!();
    run_server(serve_config, app_config).await
}

fn cmd_validate(config_path: PathBuf) -> Result<()> {
    println!(
        "Validating configuration: {}",
        config_path.display().to_string().cyan()
    );

    let config = match AppConfig::load(&config_path).and_then(AppConfig::with_env_overrides) {
        Ok(config) => config,
        Err(e) => {
            println!("{}: {:#}", "Configuration file error".red().bold(), e);
            std::process::exit(1);
        }
    };

    let validation_result = ConfigValidator::validate(&config);
    validation_result.print();

    println!();
    println!("{}", "Configuration Summary".bold());
    println!("─────────────────────");
    println!("  Email provider: {}", config.providers.email_provider);
    println!("  SMS provider: {}", config.providers.sms_provider);
    println!(
        "  NASA key: {}",
        if config.nasa.uses_demo_key() { "DEMO_KEY" } else { "configured" }
    );
    println!(
        "  Threat monitor: {}",
        if config.monitor.enabled {
            format!("every {}s", config.monitor.interval_secs)
        } else {
            "disabled".to_string()
        }
    );

    if validation_result.has_errors() {
        println!();
        println!(
            "{}",
            "Configuration validation failed. Fix the errors above."
                .red()
                .bold()
        );
        std::process::exit(1);
    } else if validation_result.has_warnings() {
        println!();
        println!(
            "{}",
            "Configuration is valid with warnings. Review the warnings above."
                .yellow()
                .bold()
        );
    } else {
        println!();
        println!("{}", "Configuration is valid.".green().bold());
    }

    Ok(())
}

fn cmd_config(config: AppConfig, show_secrets: bool, json: bool) -> Result<()> {
    let display_config = if show_secrets {
        config
    } else {
        config.redact_secrets()
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&display_config)?);
    } else {
        println!("{}", "Current Configuration".bold());
        println!("─────────────────────────");
        print!("{}", serde_yaml::to_string(&display_config)?);
        println!("\nProviders:");
        for status in display_config.providers.status() {
            let state = if status.configured {
                "configured".green()
            } else {
                "demo".yellow()
            };
            let marker = if status.selected { "*" } else { " " };
            println!(
                "  {} {} ({}): {}",
                marker,
                status.name,
                status.channel,
                state
            );
        }
    }

    Ok(())
}
