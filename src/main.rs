use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use media_catalog::config::{BackendPreference, Config};
use media_catalog::db::DatabaseType;
use media_catalog::routes::build_router;
use media_catalog::AppState;

#[derive(Parser, Debug)]
#[command(name = "media-catalog")]
#[command(about = "Media upload and catalog API server")]
struct Args {
    /// Record store backend: auto, mongodb or local (overrides DATABASE_BACKEND)
    #[arg(long)]
    backend: Option<BackendPreference>,

    /// Address to listen on (overrides SERVER_ADDRESS)
    #[arg(long)]
    address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = Config::from_env()?;
    if let Some(backend) = args.backend {
        config.database_backend = backend;
    }
    if let Some(address) = args.address {
        config.server_address = address;
    }

    let state = Arc::new(AppState::from_config(config).await?);
    let database_type = state.media_service.database_type();
    info!("📊 Database Status: {}", database_type.to_string().to_uppercase());
    if database_type == DatabaseType::Local {
        info!("💾 Local database file: {}", state.config.local_db_path);
    }

    let address = state.config.server_address.clone();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("🚀 Server running on http://{}", address);
    info!("📚 API Documentation available at http://{}/api-docs", address);

    axum::serve(listener, app).await?;
    Ok(())
}
