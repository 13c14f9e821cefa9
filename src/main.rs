//! Main entry point for the Mergington activities service
//!
//! Loads configuration, initializes logging, builds the activity registry and
//! serves the HTTP API until SIGINT or SIGTERM.

use anyhow::Result;
use clap::Parser;
use mergington_activities::config::AppConfig;
use mergington_activities::service::{AppState, HealthCheck, HealthStatus};
use mergington_activities::web::HttpServer;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

/// Mergington High School extracurricular activities service
#[derive(Parser)]
#[command(
    name = "mergington-activities",
    version,
    about = "Lists extracurricular activities and signs students up for them",
    long_about = "Mergington Activities serves the school's activity catalog over HTTP. \
                 Students sign up with their school email address; duplicate signups and \
                 signups beyond an activity's capacity are rejected."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Perform health check and exit
    #[arg(long, help = "Perform a health check and exit with status code")]
    health_check: bool,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Bind host override
    #[arg(long, value_name = "HOST", help = "Override HTTP bind host")]
    host: Option<String>,

    /// HTTP port override
    #[arg(short, long, value_name = "PORT", help = "Override HTTP server port")]
    port: Option<u16>,

    /// Static directory override
    #[arg(long, value_name = "DIR", help = "Override front-end asset directory")]
    static_dir: Option<PathBuf>,

    /// Disable the front-end mount
    #[arg(long, help = "Do not serve the front-end under /static")]
    no_static: bool,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(
        long,
        help = "Validate configuration and catalog, then exit without serving"
    )]
    dry_run: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Build the service, run a health check and exit with its result
async fn perform_health_check(config: AppConfig) -> Result<()> {
    info!("Performing health check...");

    let app_state = Arc::new(AppState::new(config).await?);
    app_state.start().await;

    match HealthCheck::check(app_state).await {
        Ok(health) => {
            println!("Health Check: {}", health.status);
            println!("  Activities: {}", health.stats.activities);
            println!(
                "  Participants: {}/{}",
                health.stats.total_participants, health.stats.total_capacity
            );

            if health.status == HealthStatus::Healthy {
                std::process::exit(0);
            } else {
                std::process::exit(1);
            }
        }
        Err(e) => {
            error!("Health check failed: {}", e);
            std::process::exit(1);
        }
    }
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C) signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

/// Display startup banner with service information
fn display_startup_banner(config: &AppConfig) {
    info!("🚀 Mergington Activities Service");
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!("   Listening on: {}", config.bind_address());
    info!(
        "   Required email domain: @{}",
        config.registry.required_email_domain
    );
    if config.web.serve_static {
        info!("   Front-end: {}", config.web.static_dir.display());
    } else {
        info!("   Front-end: disabled");
    }
    info!("   Metrics: {}", config.web.enable_metrics);
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

/// Load and merge configuration from file/environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(host) = &args.host {
        config.web.host = host.clone();
    }

    if let Some(port) = args.port {
        config.web.port = port;
    }

    if let Some(static_dir) = &args.static_dir {
        config.web.static_dir = static_dir.clone();
    }

    if args.no_static {
        config.web.serve_static = false;
    }

    mergington_activities::config::validate_config(&config)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {:#}", e);
        std::process::exit(1);
    });

    // Initialize logging early (before any other operations)
    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if args.health_check {
        return perform_health_check(config).await;
    }

    display_startup_banner(&config);

    info!("Initializing service components...");
    let app_state = match AppState::new(config.clone()).await {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    if args.dry_run {
        info!("Configuration and catalog validation successful");
        info!("Dry run completed - exiting without starting service");
        return Ok(());
    }

    app_state.start().await;

    let server = Arc::new(HttpServer::new(app_state.clone()));
    let mut server_task = {
        let server = server.clone();
        tokio::spawn(async move { server.start().await })
    };

    info!("✅ Mergington Activities Service is running");
    info!("Press Ctrl+C to shutdown gracefully...");

    // None means a shutdown signal arrived while the server was still running
    let early_exit = tokio::select! {
        _ = wait_for_shutdown_signal() => None,
        result = &mut server_task => Some(result),
    };

    match early_exit {
        None => {
            info!("🛑 Shutdown signal received, beginning graceful shutdown...");
            server.stop();

            match tokio::time::timeout(config.shutdown_timeout(), &mut server_task).await {
                Ok(Ok(Ok(()))) => info!("✅ Graceful shutdown completed successfully"),
                Ok(Ok(Err(e))) => error!("HTTP server failed during shutdown: {:#}", e),
                Ok(Err(e)) => error!("HTTP server task panicked: {}", e),
                Err(_) => {
                    warn!("⚠️  Shutdown timeout exceeded, forcing exit");
                    server_task.abort();
                }
            }
        }
        Some(Ok(Ok(()))) => info!("HTTP server exited"),
        Some(Ok(Err(e))) => {
            error!("HTTP server failed: {:#}", e);
            app_state.shutdown().await;
            std::process::exit(1);
        }
        Some(Err(e)) => {
            error!("HTTP server task panicked: {}", e);
            app_state.shutdown().await;
            std::process::exit(1);
        }
    }

    app_state.shutdown().await;
    info!("🛑 Mergington Activities Service stopped");
    Ok(())
}
