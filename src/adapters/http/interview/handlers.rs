//! HTTP handlers for the respondent-facing interview endpoints.
//!
//! The session token in the path is the respondent's only credential.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::adapters::http::error::ApiError;
use crate::application::InterviewOrchestrator;

use super::dto::{
    SendTurnRequest, SessionResponse, StartSessionRequest, StartSessionResponse,
    TranscriptResponse, TurnsResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct InterviewHandlers {
    orchestrator: Arc<InterviewOrchestrator>,
}

impl InterviewHandlers {
    pub fn new(orchestrator: Arc<InterviewOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/interviews/:token/start
pub async fn start_session(
    State(handlers): State<InterviewHandlers>,
    Path(token): Path<String>,
    Json(req): Json<StartSessionRequest>,
) -> Result<Json<StartSessionResponse>, ApiError> {
    let result = handlers
        .orchestrator
        .start_session(token, req.relationship, req.respondent_name)
        .await?;
    Ok(Json(result.into()))
}

/// POST /api/interviews/:token/turns
pub async fn send_turn(
    State(handlers): State<InterviewHandlers>,
    Path(token): Path<String>,
    Json(req): Json<SendTurnRequest>,
) -> Result<(StatusCode, Json<TurnsResponse>), ApiError> {
    let result = handlers
        .orchestrator
        .send_turn(token, req.content, req.rating)
        .await?;
    Ok((StatusCode::CREATED, Json(result.into())))
}

/// POST /api/interviews/:token/retry
pub async fn retry_turn(
    State(handlers): State<InterviewHandlers>,
    Path(token): Path<String>,
) -> Result<(StatusCode, Json<TurnsResponse>), ApiError> {
    let message = handlers.orchestrator.retry_turn(token).await?;
    Ok((StatusCode::CREATED, Json(message.into())))
}

/// POST /api/interviews/:token/complete
pub async fn complete_session(
    State(handlers): State<InterviewHandlers>,
    Path(token): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = handlers.orchestrator.complete_session(token).await?;
    Ok(Json(SessionResponse::from(&session)))
}

/// GET /api/interviews/:token
pub async fn get_transcript(
    State(handlers): State<InterviewHandlers>,
    Path(token): Path<String>,
) -> Result<Json<TranscriptResponse>, ApiError> {
    let view = handlers.orchestrator.get_transcript(token).await?;
    Ok(Json(view.into()))
}
