use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use roster_core::members::{self, Member, MemberFilter};
use roster_core::storage::MemberStore;
use serde::Deserialize;

use super::{log_api_issue, storage_failure, ApiError, ErrorResponse};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct MemberQuery {
    #[serde(default)]
    deleted: Option<bool>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    belong_to: String,
}

impl MemberQuery {
    fn filter(&self) -> MemberFilter {
        MemberFilter {
            name: self.name.clone(),
            email: self.email.clone(),
            belong_to: self.belong_to.clone(),
        }
    }
}

#[derive(Deserialize)]
pub struct CandidateQuery {
    #[serde(default)]
    keep: Option<String>,
}

fn invalid_member(target: &'static str, member: &Member) -> Result<(), ApiError> {
    member.validate().map_err(|e| {
        let error = e.to_string();
        log_api_issue(StatusCode::BAD_REQUEST, target, &error);
        (StatusCode::BAD_REQUEST, Json(ErrorResponse { error }))
    })
}

/// GET /members -- members matching the optional name/email/belong_to
/// substrings. `deleted` narrows to deleted or active members; absent lists
/// everyone.
pub async fn list_members(
    State(state): State<AppState>,
    Query(query): Query<MemberQuery>,
) -> Result<Json<Vec<Member>>, ApiError> {
    let roster = match query.deleted {
        Some(deleted) => state.store.fetch_members(deleted),
        None => state.store.fetch_all_members(),
    }
    .map_err(|e| storage_failure("roster.api.list_members", e))?;
    let filter = query.filter();
    let matched = members::filter_members(&roster, &filter)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(matched))
}

/// GET /projects/{project_id}/candidates -- members selectable for a new or
/// edited assignment on the current board.
pub async fn list_candidates(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(query): Query<CandidateQuery>,
) -> Result<Json<Vec<Member>>, ApiError> {
    let roster = state
        .store
        .fetch_all_members()
        .map_err(|e| storage_failure("roster.api.list_candidates", e))?;
    let session = state.session();
    let project = session.board().project(&project_id);
    if project.is_none() {
        log::debug!(
            target: "roster.api.list_candidates",
            "Unknown project {}, offering the full active roster",
            project_id
        );
    }
    let candidates = members::assignable_members(&roster, project, query.keep.as_deref())
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(candidates))
}

pub async fn add_member(
    State(state): State<AppState>,
    Json(member): Json<Member>,
) -> Result<(StatusCode, Json<Member>), ApiError> {
    invalid_member("roster.api.add_member", &member)?;
    let created = state
        .store
        .add_member(member)
        .map_err(|e| storage_failure("roster.api.add_member", e))?;
    log::info!(target: "roster.api.add_member", "Added member {}", created.id);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_member(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
    Json(mut member): Json<Member>,
) -> Result<Json<Member>, ApiError> {
    member.id = member_id;
    invalid_member("roster.api.update_member", &member)?;
    state
        .store
        .update_member(&member)
        .map_err(|e| storage_failure("roster.api.update_member", e))?;
    Ok(Json(member))
}

/// DELETE /members/{member_id} -- logical delete; assignments keep pointing
/// at the member, who then renders as deleted.
pub async fn delete_member(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .delete_member(&member_id)
        .map_err(|e| storage_failure("roster.api.delete_member", e))?;
    log::info!(target: "roster.api.delete_member", "Deleted member {}", member_id);
    Ok(StatusCode::NO_CONTENT)
}
