//! Leaflet Web Server
//!
//! HTTP API for AI-assisted project documentation.

use clap::Parser;
use leaflet_core::{init_logging, LeafletConfig, LogFormat};
use leaflet_web::{LeafletServerBuilder, WebConfig};
use std::path::PathBuf;
use tracing::{info, warn};

/// Leaflet Web Server - analyze projects and serve their documentation
#[derive(Parser)]
#[command(name = "leaflet-web")]
#[command(about = "HTTP API for Leaflet")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Server port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory for stored, temporary and hosted output
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace); overrides [logging].level
    #[arg(long)]
    log_level: Option<String>,

    /// Log output format (json, pretty, compact); overrides [logging].format
    #[arg(long)]
    log_format: Option<LogFormat>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    dotenvy::dotenv().ok();

    let leaflet_config = LeafletConfig::load(args.config.as_deref())?;
    leaflet_config.validate()?;

    let mut logging = leaflet_config.logging.clone();
    if let Some(level) = &args.log_level {
        logging.level = level.clone();
    }
    if let Some(format) = args.log_format {
        logging.format = format;
    }
    if logging.filter_directives.is_empty() {
        logging.filter_directives.push("tower_http=debug".to_string());
    }
    init_logging(&logging).map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    let mut config = WebConfig::from(&leaflet_config);
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(data_dir) = args.data_dir {
        config = config.with_data_dir(data_dir);
    }

    if !config.ai.has_api_key() {
        warn!("⚠️  GEMINI_API_KEY is not set; requests must pass apiKey");
    }

    info!("🏗️  Building server...");
    LeafletServerBuilder::from_config(config).build().start().await?;
    Ok(())
}
