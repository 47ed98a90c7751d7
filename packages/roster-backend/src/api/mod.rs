use axum::{
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use roster_core::session::SessionError;
use roster_core::storage::StorageError;
use serde::Serialize;

mod board;
mod members;
mod status;

use crate::state::AppState;

/// Axum REST API routes.
///
///   GET    /projects                         -> board (working copy while editing)
///   POST   /projects/reload                  -> re-fetch the snapshot from the store
///   GET    /projects/:projectId/candidates   -> members assignable to a project
///   POST   /edit                             -> enter edit mode
///   POST   /edit/commands                    -> apply a board command
///   POST   /edit/drag/move                   -> drag-move notification
///   POST   /edit/drag/end                    -> drag-end notification
///   POST   /edit/save                        -> validate + persist, leave edit mode
///   POST   /edit/cancel                      -> discard changes, leave edit mode
///   GET    /members?deleted=&name=&email=&belong_to= -> member list
///   POST   /members                          -> add member
///   PUT    /members/:memberId                -> update member
///   DELETE /members/:memberId                -> logical delete
///   GET    /positions                        -> role catalog for assignments
///   GET    /status                           -> health check (+ mode, busy, content hash)
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/projects", get(board::get_projects))
        .route("/projects/reload", post(board::reload_projects))
        .route(
            "/projects/{project_id}/candidates",
            get(members::list_candidates),
        )
        .route("/edit", post(board::begin_edit))
        .route("/edit/commands", post(board::apply_command))
        .route("/edit/drag/move", post(board::drag_move))
        .route("/edit/drag/end", post(board::drag_end))
        .route("/edit/save", post(board::save))
        .route("/edit/cancel", post(board::cancel))
        .route(
            "/members",
            get(members::list_members).post(members::add_member),
        )
        .route(
            "/members/{member_id}",
            axum::routing::put(members::update_member).delete(members::delete_member),
        )
        .route("/positions", get(board::list_positions))
        .route("/status", get(status::status))
}

// ── Shared types and helpers used across sub-modules ────────────────────

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn log_api_issue(status: StatusCode, target: &'static str, message: impl AsRef<str>) {
    let message = message.as_ref();
    if status.is_server_error() {
        log::error!(target: target, "{}", message);
    } else {
        log::warn!(target: target, "{}", message);
    }
}

fn storage_status(e: &StorageError) -> StatusCode {
    match e {
        StorageError::ProjectNotFound(_) | StorageError::MemberNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        StorageError::Rejected(_) => StatusCode::CONFLICT,
        StorageError::Io(_) | StorageError::Serialization(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn storage_failure(target: &'static str, e: StorageError) -> ApiError {
    let status = storage_status(&e);
    let error = e.to_string();
    log_api_issue(status, target, &error);
    (status, Json(ErrorResponse { error }))
}

fn session_failure(target: &'static str, e: SessionError) -> ApiError {
    let status = match &e {
        SessionError::NotEditing | SessionError::AlreadyEditing => StatusCode::CONFLICT,
        SessionError::DuplicateMember { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        SessionError::Invalid(_) => StatusCode::BAD_REQUEST,
        SessionError::Storage(inner) => storage_status(inner),
    };
    let error = e.to_string();
    log_api_issue(status, target, &error);
    (status, Json(ErrorResponse { error }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::validate::FieldError;

    #[test]
    fn test_session_error_status_codes() {
        let (status, body) = session_failure(
            "roster.api.test",
            SessionError::DuplicateMember {
                project_name: "Alpha".to_string(),
            },
        );
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.0.error.contains("Alpha"));

        let (status, _) = session_failure("roster.api.test", SessionError::NotEditing);
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = session_failure(
            "roster.api.test",
            SessionError::Invalid(FieldError {
                field: "name",
                message: "Project name is required".to_string(),
            }),
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = session_failure(
            "roster.api.test",
            SessionError::Storage(StorageError::Rejected("offline".to_string())),
        );
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[test]
    fn test_storage_not_found_maps_to_404() {
        let (status, _) = storage_failure(
            "roster.api.test",
            StorageError::MemberNotFound("m1".to_string()),
        );
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
