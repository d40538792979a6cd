//! entity-gateway: HTTP front for a simulated external name service.
//!
//! This is the application entry point. It initializes tracing, loads configuration
//! from a TOML file, builds the lookup service and metrics sink, sets up the Axum
//! router, and starts the HTTP server.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use entity_gateway::build_app;
use entity_gateway::config::{AppConfig, DEFAULT_CONFIG_PATH, DEFAULT_LOG_FILTER};
use entity_gateway::http::start_server;

/// entity-gateway: HTTP front for a simulated external name service
#[derive(Parser, Debug)]
#[command(name = "entity-gateway", version, about)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Log level filter (e.g., "entity_gateway=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Configuration first so logging.format is known before the subscriber is installed
    let config = AppConfig::load(&args.config)?;

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(&log_filter));
    if config.logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(
        path = %args.config,
        host = %config.http.host,
        port = config.http.port,
        "Loaded configuration"
    );

    let app = build_app(config.clone())?;
    start_server(app, &config).await?;

    Ok(())
}
