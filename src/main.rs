//! CoastlineVibe server: community platform API and background workers.
//!
//! Main entry point that wires all crates together.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use coastline_api::{AppState, build_app};
use coastline_core::config::AppConfig;
use coastline_core::error::{AppError, ErrorKind};
use coastline_core::result::AppResult;
use coastline_database::{Database, DatabasePool};
use coastline_storage::StorageManager;
use coastline_worker::BackgroundWorkers;

/// CoastlineVibe community platform
#[derive(Debug, Parser)]
#[command(name = "coastline-server", version, about, long_about = None)]
struct Cli {
    /// Environment name; loads `config/{env}.toml` over `config/default.toml`
    #[arg(short, long, env = "COASTLINE_ENV", default_value = "development")]
    env: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the HTTP server and background workers (default)
    Serve(ServeArgs),
    /// Apply database migrations and exit
    Migrate,
    /// Load and validate configuration, then print a summary
    CheckConfig,
}

#[derive(Debug, Default, Args)]
struct ServeArgs {
    /// Override the server port
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the server host
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %cli.env, "Configuration loaded");

    let result = match cli.command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Serve(args) => serve(config, args).await,
        Command::Migrate => migrate(&config).await,
        Command::CheckConfig => check_config(&config),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Exiting with error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn serve(mut config: AppConfig, args: ServeArgs) -> AppResult<()> {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }
    config.validate()?;

    tracing::info!("Starting CoastlineVibe v{}", env!("CARGO_PKG_VERSION"));

    let db = Database::connect(&config.database).await?;
    let storage = StorageManager::from_config(&config.storage).await?;
    let state = AppState::new(config.clone(), db.clone(), storage)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let workers = BackgroundWorkers::start(
        &config.worker,
        &config.notifications,
        &db,
        Arc::clone(&state.notifications),
        shutdown_rx,
    )
    .await?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Invalid server.host/server.port", e)
        })?;
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        AppError::with_source(ErrorKind::Internal, format!("Failed to bind {addr}"), e)
    })?;
    tracing::info!(%addr, database = db.provider(), "Listening");

    axum::serve(listener, build_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "Server error", e))?;

    tracing::info!("HTTP server stopped, shutting down workers");
    let _ = shutdown_tx.send(true);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    if tokio::time::timeout(grace, workers.shutdown()).await.is_err() {
        tracing::warn!(grace_seconds = grace.as_secs(), "Workers did not stop in time");
    }
    db.close().await;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn migrate(config: &AppConfig) -> AppResult<()> {
    if config.database.provider != "postgres" {
        return Err(AppError::configuration(
            "Migrations only apply to the postgres provider",
        ));
    }
    let pool = DatabasePool::connect(&config.database).await?;
    coastline_database::migration::run_migrations(pool.pool()).await?;
    pool.close().await;
    tracing::info!("Migrations applied");
    Ok(())
}

fn check_config(config: &AppConfig) -> AppResult<()> {
    config.validate()?;
    println!("Configuration OK");
    println!("  server:      {}:{}", config.server.host, config.server.port);
    println!("  database:    {}", config.database.provider);
    println!("  storage:     {}", config.storage.provider);
    println!("  workers:     {}", if config.worker.enabled { "enabled" } else { "disabled" });
    println!(
        "  translation: {}",
        if config.translation.is_configured() { "configured" } else { "not configured" }
    );
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
