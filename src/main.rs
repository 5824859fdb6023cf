//! Quire - REST backend for users, categories and blogs

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use quire::{
    config::{Args, LogFormat},
    db::MongoClient,
    repository::{MemoryRepository, MongoRepository, Repository},
    server::{self, AppState},
};

fn init_tracing(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_directive()));
    let json = args.log_format == LogFormat::Json;

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(fmt::layer))
        .init();
}

/// Pick the storage backend: MongoDB unless told otherwise or (dev mode only) unreachable
async fn open_repository(args: &Args) -> anyhow::Result<Arc<dyn Repository>> {
    if args.memory_store {
        warn!("Using in-memory store; nothing will be persisted");
        return Ok(Arc::new(MemoryRepository::new()));
    }

    let connected = match MongoClient::new(&args.mongodb_url, &args.mongodb_db).await {
        Ok(client) => MongoRepository::new(client).await,
        Err(e) => Err(e),
    };

    match connected {
        Ok(repo) => {
            info!("MongoDB connected successfully");
            Ok(Arc::new(repo))
        }
        Err(e) if args.dev_mode => {
            warn!("MongoDB connection failed (dev mode, using in-memory store): {}", e);
            Ok(Arc::new(MemoryRepository::new()))
        }
        Err(e) => Err(anyhow::anyhow!("MongoDB connection failed: {}", e)),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    init_tracing(&args);

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Quire - users, categories and blogs");
    info!("======================================");
    info!("Node ID: {}", args.node_id);
    info!("Listen: {}", args.listen);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("MongoDB: {} (db: {})", args.mongodb_url, args.mongodb_db);
    info!(
        "Page size: {} (max {})",
        args.default_page_size, args.max_page_size
    );
    info!("======================================");

    let repo = match open_repository(&args).await {
        Ok(repo) => repo,
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    };

    let state = Arc::new(AppState::new(args, repo));

    if let Err(e) = server::run(state).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
