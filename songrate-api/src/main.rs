//! songrate-api - song rating REST service
//!
//! Startup order: tracing, build identification, configuration, database,
//! optional catalog client, then the HTTP server with graceful shutdown.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use songrate_common::api::TokenSigner;
use songrate_common::config::{load_toml_config, ConfigOverrides, ServerConfig, DEFAULT_LOG_LEVEL};
use songrate_common::human_time::format_duration;
use songrate_api::services::ItunesCatalog;
use songrate_api::{build_router, db, AppState};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for songrate-api
#[derive(Parser, Debug)]
#[command(name = "songrate-api")]
#[command(about = "Song rating REST service")]
#[command(version)]
struct Args {
    /// Port to listen on [default: 8000]
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Address to bind [default: 0.0.0.0]
    #[arg(long, env = "SONGRATE_HOST")]
    host: Option<String>,

    /// Secret used to sign access tokens (required)
    #[arg(long = "jwt-secret", env = "JWT_PRIVATE_KEY", hide_env_values = true)]
    jwt_secret: Option<String>,

    /// Access token lifetime, e.g. 900, 15m, 1h, 7d [default: 1h]
    #[arg(long, env = "JWT_EXPIRY")]
    jwt_expiry: Option<String>,

    /// SQLite database URL [default: sqlite://songrate.db?mode=rwc]
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Song catalog search URL; enables metadata enrichment
    #[arg(long, env = "SONGRATE_CATALOG_URL")]
    catalog_url: Option<String>,

    /// TOML config file [default: ./songrate.toml, then <config dir>/songrate/config.toml]
    #[arg(short, long, env = "SONGRATE_CONFIG")]
    config: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            jwt_private_key: self.jwt_secret.clone(),
            jwt_expiry: self.jwt_expiry.clone(),
            database_url: self.database_url.clone(),
            catalog_url: self.catalog_url.clone(),
            log_level: None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // The config file may name the log level, so read it before tracing starts
    let file = load_toml_config(args.config.as_deref());
    let level = file
        .as_ref()
        .ok()
        .and_then(|f| f.log_level.clone())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

    // Initialize tracing; RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("songrate_api={level},songrate_common={level},tower_http={level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting SongRate API (songrate-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let file = file.context("Failed to load config file")?;

    let config = match ServerConfig::resolve(args.overrides(), file) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!(
        "Configuration: bind {}, token expiry {}, database {}",
        config.bind_address(),
        format_duration(config.jwt_expiry),
        config.database_url
    );

    let pool = db::init_database(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    info!("✓ Database ready");

    let mut state = AppState::new(
        pool.clone(),
        TokenSigner::new(&config.jwt_secret, config.jwt_expiry),
    );

    match &config.catalog_url {
        Some(url) => match ItunesCatalog::new(url.clone()) {
            Ok(catalog) => {
                info!("Song catalog enrichment enabled: {}", url);
                state = state.with_catalog(Arc::new(catalog));
            }
            Err(e) => warn!("Song catalog disabled, client setup failed: {}", e),
        },
        None => info!("Song catalog enrichment disabled (no catalog URL configured)"),
    }

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address()))?;
    info!("songrate-api listening on http://{}", config.bind_address());
    info!("Health check: http://{}/health", config.bind_address());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
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
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
