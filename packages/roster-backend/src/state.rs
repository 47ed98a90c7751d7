//! Shared application state passed to axum handlers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use roster_core::session::{BusyFlag, EditSession};
use roster_core::storage::local::LocalStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<LocalStore>,
    pub session: Arc<Mutex<EditSession>>,
    /// Same flag the session raises; readable without the session lock
    pub busy: BusyFlag,
    pub port: u16,
    pub bind_address: String,
}

impl AppState {
    pub fn new(store: LocalStore, session: EditSession, port: u16, bind_address: String) -> Self {
        let busy = session.busy_flag().clone();
        Self {
            store: Arc::new(store),
            session: Arc::new(Mutex::new(session)),
            busy,
            port,
            bind_address,
        }
    }

    pub fn session(&self) -> MutexGuard<'_, EditSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
