//! Configuration for quire
//!
//! CLI arguments and environment variable handling using clap.

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use uuid::Uuid;

/// quire - CRUD REST backend for users, categories and blogs
#[derive(Parser, Debug, Clone)]
#[command(name = "quire")]
#[command(about = "REST backend for users, categories and blogs backed by MongoDB")]
pub struct Args {
    /// Unique node identifier for this instance
    #[arg(long, env = "NODE_ID", default_value_t = Uuid::new_v4())]
    pub node_id: Uuid,

    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:3000")]
    pub listen: SocketAddr,

    /// MongoDB connection string
    #[arg(long, env = "MONGODB_URL", default_value = "mongodb://localhost:27017")]
    pub mongodb_url: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "rest-apis")]
    pub mongodb_db: String,

    /// Log level (trace, debug, info, warn, error), used when RUST_LOG is unset
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Development mode: fall back to the in-memory store if MongoDB is unreachable
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Always use the in-memory store (nothing is persisted)
    #[arg(long, env = "MEMORY_STORE", default_value = "false")]
    pub memory_store: bool,

    /// Page size used by list endpoints when `limit` is absent
    #[arg(long, env = "DEFAULT_PAGE_SIZE", default_value = "10")]
    pub default_page_size: u32,

    /// Upper bound for the `limit` query parameter
    #[arg(long, env = "MAX_PAGE_SIZE", default_value = "100")]
    pub max_page_size: u32,
}

/// Log line format
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl Args {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.default_page_size == 0 || self.max_page_size == 0 {
            return Err("Page sizes must be greater than zero".to_string());
        }

        if self.default_page_size > self.max_page_size {
            return Err(
                "DEFAULT_PAGE_SIZE must be less than or equal to MAX_PAGE_SIZE".to_string(),
            );
        }

        Ok(())
    }

    /// Default filter directive for the tracing subscriber
    pub fn log_directive(&self) -> String {
        format!("quire={},info", self.log_level)
    }

    /// Args for tests and embedded use: in-memory store, defaults everywhere else
    pub fn in_memory() -> Self {
        Self::parse_from(["quire", "--memory-store"])
    }
}
