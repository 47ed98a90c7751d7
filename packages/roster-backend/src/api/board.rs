use std::collections::BTreeMap;

use axum::{extract::State, response::Json};
use roster_core::board::BoardCommand;
use roster_core::drag::{DragEvent, DragPhase};
use roster_core::members::Member;
use roster_core::session::EditSession;
use roster_core::storage::MemberStore;
use roster_core::types::{EntityRef, Position};
use serde::Deserialize;

use super::{session_failure, ApiError};
use crate::state::AppState;

/// Drag notification as reported by the drag framework: raw ids whose prefix
/// names the entity kind. Ids that can't be classified count as "nothing".
#[derive(Deserialize)]
pub struct DragBody {
    #[serde(default)]
    active: Option<String>,
    #[serde(default)]
    over: Option<String>,
}

impl DragBody {
    fn into_event(self) -> DragEvent {
        DragEvent {
            active: self.active.as_deref().and_then(EntityRef::from_prefixed_id),
            over: self.over.as_deref().and_then(EntityRef::from_prefixed_id),
        }
    }
}

/// Roster used to resolve member names. A failed fetch renders names empty
/// rather than failing the whole board.
fn load_roster(state: &AppState) -> Vec<Member> {
    state.store.fetch_all_members().unwrap_or_else(|e| {
        log::warn!(target: "roster.api.board", "Failed to fetch members: {}", e);
        Vec::new()
    })
}

fn board_view(session: &EditSession, roster: &[Member]) -> serde_json::Value {
    let board = session.board();
    let members: BTreeMap<&str, serde_json::Value> = board
        .projects
        .iter()
        .flat_map(|p| p.items.iter())
        .map(|item| {
            let member = roster.iter().find(|m| m.id == item.member_id);
            (
                item.member_id.as_str(),
                serde_json::json!({
                    "name": member.map(|m| m.name.as_str()).unwrap_or(""),
                    "isDeleted": member.map(|m| m.is_deleted).unwrap_or(false),
                }),
            )
        })
        .collect();

    serde_json::json!({
        "mode": session.mode(),
        "dirty": session.is_dirty(),
        "projects": board,
        "members": members,
    })
}

/// GET /positions -- the fixed role catalog assignments pick from.
pub async fn list_positions() -> Json<Vec<Position>> {
    Json(Position::catalog())
}

pub async fn get_projects(State(state): State<AppState>) -> Json<serde_json::Value> {
    let roster = load_roster(&state);
    let session = state.session();
    Json(board_view(&session, &roster))
}

/// POST /projects/reload -- re-fetch the snapshot (viewing mode only).
pub async fn reload_projects(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let roster = load_roster(&state);
    let mut session = state.session();
    session
        .load(&*state.store)
        .map_err(|e| session_failure("roster.api.reload", e))?;
    Ok(Json(board_view(&session, &roster)))
}

pub async fn begin_edit(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let roster = load_roster(&state);
    let mut session = state.session();
    session
        .begin_edit()
        .map_err(|e| session_failure("roster.api.begin_edit", e))?;
    Ok(Json(board_view(&session, &roster)))
}

pub async fn apply_command(
    State(state): State<AppState>,
    Json(command): Json<BoardCommand>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let roster = load_roster(&state);
    let mut session = state.session();
    session
        .dispatch(command)
        .map_err(|e| session_failure("roster.api.apply_command", e))?;
    Ok(Json(board_view(&session, &roster)))
}

fn apply_drag(
    state: &AppState,
    phase: DragPhase,
    body: DragBody,
) -> Result<Json<serde_json::Value>, ApiError> {
    let roster = load_roster(state);
    let mut session = state.session();
    session
        .drag(phase, body.into_event())
        .map_err(|e| session_failure("roster.api.drag", e))?;
    Ok(Json(board_view(&session, &roster)))
}

pub async fn drag_move(
    State(state): State<AppState>,
    Json(body): Json<DragBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    apply_drag(&state, DragPhase::Move, body)
}

pub async fn drag_end(
    State(state): State<AppState>,
    Json(body): Json<DragBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    apply_drag(&state, DragPhase::End, body)
}

/// POST /edit/save -- duplicate check, reconcile against the store, refresh.
pub async fn save(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let roster = load_roster(&state);
    let mut session = state.session();
    let outcome = session
        .save(&*state.store)
        .map_err(|e| session_failure("roster.api.save", e))?;
    log::info!(target: "roster.api.save", "Saved project board: {:?}", outcome.summary);

    let mut view = board_view(&session, &roster);
    view["saved"] = serde_json::json!(outcome.summary);
    Ok(Json(view))
}

pub async fn cancel(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let roster = load_roster(&state);
    let mut session = state.session();
    session
        .cancel()
        .map_err(|e| session_failure("roster.api.cancel", e))?;
    Ok(Json(board_view(&session, &roster)))
}
