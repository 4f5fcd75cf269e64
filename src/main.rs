use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use geosearch::api;
use geosearch::config::{resolve_db_path, Config};
use geosearch::geoip::{GeoLookup, MaxMindDatabase};
use geosearch::search::BatchSearcher;

/// Offline IP-to-country lookup service
#[derive(Parser)]
#[command(name = "geosearch", version, about, long_about = None)]
struct Cli {
    /// Bind host (overrides API_HOST)
    #[arg(long)]
    host: Option<String>,
    /// Bind port (overrides API_PORT)
    #[arg(long)]
    port: Option<u16>,
    /// Path to the country .mmdb database (overrides GEOIP_DB_PATH)
    #[arg(long)]
    db_path: Option<PathBuf>,
    /// Language tag for country names (overrides INFO_LANG)
    #[arg(long)]
    lang: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::from_env()?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(db_path) = cli.db_path {
        config.geoip.db_path = resolve_db_path(db_path)?;
    }
    if let Some(lang) = cli.lang {
        config.search.lang = lang;
    }
    info!("Loaded configuration");

    // Open the GeoIP database once; it is shared by every request
    let database =
        MaxMindDatabase::open(&config.geoip.db_path).context("Failed to load GeoIP database")?;
    let db_info = database.info();
    info!(
        "🌍 GeoIP database loaded: {} ({}, build epoch {}, {} nodes)",
        database.path().display(),
        db_info.database_type,
        db_info.build_epoch,
        db_info.node_count
    );

    let db: Arc<dyn GeoLookup> = Arc::new(database);
    let searcher = Arc::new(BatchSearcher::new(db, &config.search));
    info!(
        "🔎 Country names in '{}', up to {} concurrent lookups across all requests",
        searcher.lang(),
        config.search.max_concurrent_lookups
    );

    let router = api::create_api_router(searcher);

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("🚀 Search server listening on http://{}", addr);
    info!("   - GET  http://{}/search?ip=1.2.3.4,5.6.7.8", addr);
    info!("   - POST http://{}/search {{\"ip\": [\"1.2.3.4\"]}}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
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

    info!("Shutdown signal received");
}
