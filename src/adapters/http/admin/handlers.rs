//! HTTP handlers for administrative endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::{ApiError, ErrorResponse};
use crate::application::InterviewOrchestrator;
use crate::domain::foundation::SessionId;

use super::dto::{DeleteSessionResponse, FlagSessionRequest, ModerationResponse};

#[derive(Clone)]
pub struct AdminHandlers {
    orchestrator: Arc<InterviewOrchestrator>,
}

impl AdminHandlers {
    pub fn new(orchestrator: Arc<InterviewOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

fn parse_session_id(raw: &str) -> Result<SessionId, Response> {
    raw.parse::<SessionId>().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Invalid session ID")),
        )
            .into_response()
    })
}

/// POST /api/admin/sessions/:id/flag
pub async fn flag_session(
    State(handlers): State<AdminHandlers>,
    Path(session_id): Path<String>,
    Json(req): Json<FlagSessionRequest>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.orchestrator.flag_session(session_id, req.reason).await {
        Ok(session) => Json(ModerationResponse::from(&session)).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

/// DELETE /api/admin/sessions/:id/flag
pub async fn clear_flag(
    State(handlers): State<AdminHandlers>,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.orchestrator.clear_flag(session_id).await {
        Ok(session) => Json(ModerationResponse::from(&session)).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

/// DELETE /api/admin/sessions/:id
pub async fn delete_session(
    State(handlers): State<AdminHandlers>,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.orchestrator.delete_session(session_id).await {
        Ok(messages_removed) => Json(DeleteSessionResponse {
            session_id: session_id.to_string(),
            messages_removed,
        })
        .into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}
