use anyhow::Result;
use clap::{Arg, Command};
use std::path::PathBuf;
use tracing::{info, warn};

use tubescribe::api::{start_http_server, AppState};
use tubescribe::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // .env first so the filter and config see it
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tubescribe=info,tower_http=warn".into()),
        )
        .init();

    let matches = Command::new("tubescribe")
        .version(env!("CARGO_PKG_VERSION"))
        .about("YouTube subtitle generation and translation service")
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Port for the HTTP API"),
        )
        .arg(
            Arg::new("temp-dir")
                .short('t')
                .long("temp-dir")
                .value_name("DIR")
                .help("Directory for downloaded media and subtitle files"),
        )
        .get_matches();

    // Load configuration
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {}", e);
        Config::default()
    });

    if let Some(port) = matches.get_one::<String>("port") {
        config.server.port = port.parse()?;
    }
    if let Some(dir) = matches.get_one::<String>("temp-dir") {
        config.storage.temp_dir = PathBuf::from(dir);
    }

    config.validate()?;

    info!("🚀 TubeScribe starting...");
    info!(
        "🔑 ASSEMBLYAI_API_KEY: {}",
        if config.transcription.api_key.is_some() {
            "loaded"
        } else {
            "not found"
        }
    );
    info!("{}", config.summary());

    let port = config.server.port;
    let state = AppState::new(config)?;
    start_http_server(state, port).await
}
