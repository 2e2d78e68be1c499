//! Palaver HTTP API server
//!
//! Thin boundary over the chat core: JSON commands in, SSE events out.

use anyhow::Result;
use palaver_core::config::Config;
use palaver_core::core_users::InMemoryUserDirectory;
use palaver_core::core_workspace::ChatStore;
use palaver_core::logging::{init_logging_with_config, LogConfig};
use palaver_core::ChatService;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

mod auth;
mod error;
mod handlers;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Config file from PALAVER_CONFIG or the first argument; both are
    // optional, env overrides always apply
    let config_path = std::env::var("PALAVER_CONFIG")
        .ok()
        .map(PathBuf::from)
        .or_else(|| std::env::args().nth(1).map(PathBuf::from));
    let config = Config::load(config_path.as_deref())?;

    let log_config = LogConfig::new(config.logging.level.parse()?)
        .json_format(config.logging.json_format);
    init_logging_with_config(log_config)?;

    let store = if config.store.in_memory {
        ChatStore::memory()?
    } else {
        ChatStore::open(&config.store.db_path)?
    };

    let users = Arc::new(InMemoryUserDirectory::new());
    let service = Arc::new(ChatService::new(Arc::new(store), users.clone(), &config));
    let app_state = Arc::new(AppState::new(service, users));

    let router = handlers::build_router(app_state);

    let listener = TcpListener::bind(config.server.bind_address).await?;
    info!("palaver api listening on {}", config.server.bind_address);

    axum::serve(listener, router).await?;

    Ok(())
}
