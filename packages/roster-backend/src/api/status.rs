use std::sync::TryLockError;

use axum::{extract::State, response::Json};

use crate::state::AppState;

/// Health check. Never waits on the session lock: while a save holds it the
/// mode is reported as null and `busy` tells the client why.
///
/// `contentHash` changes whenever the store file is rewritten, so clients can
/// poll it to notice changes made by another session.
pub async fn status(State(state): State<AppState>) -> Json<serde_json::Value> {
    let busy = state.busy.is_busy();
    let snapshot = match state.session.try_lock() {
        Ok(session) => Some((session.mode(), session.is_dirty())),
        Err(TryLockError::Poisoned(poisoned)) => {
            let session = poisoned.into_inner();
            Some((session.mode(), session.is_dirty()))
        }
        Err(TryLockError::WouldBlock) => None,
    };

    Json(serde_json::json!({
        "status": "running",
        "port": state.port,
        "bind_address": state.bind_address,
        "mode": snapshot.map(|(mode, _)| mode),
        "dirty": snapshot.map(|(_, dirty)| dirty).unwrap_or(false),
        "busy": busy,
        "contentHash": state.store.content_hash(),
    }))
}
