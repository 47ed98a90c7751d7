//! Roster backend: config loading, store and session init, HTTP server.

pub mod api;
mod config;
mod server;
pub mod state;

use roster_core::session::EditSession;
use roster_core::storage::local::LocalStore;
use roster_core::storage::StorageError;
use thiserror::Error;

use crate::state::AppState;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to open store: {0}")]
    Store(#[from] StorageError),
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

pub async fn run() -> Result<(), StartupError> {
    init_logging();

    let config_path = config::default_config_path();
    let config = config::load_config(&config_path);
    let data_path = config.data_path();

    let store = LocalStore::open(&data_path)?;
    log::info!("Opened store at {}", store.path().display());

    let mut session = EditSession::new();
    if let Err(e) = session.load(&store) {
        // An empty board is still usable; the user can reload later.
        log::error!("Initial project load failed: {}", e);
    }

    let state = AppState::new(store, session, config.port, config.bind_address.clone());
    server::serve(state).await?;
    Ok(())
}
