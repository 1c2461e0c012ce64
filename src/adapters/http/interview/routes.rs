//! HTTP routes for interview endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    complete_session, get_transcript, retry_turn, send_turn, start_session, InterviewHandlers,
};

/// Creates the interview router, to be nested under `/api/interviews`.
pub fn interview_routes(handlers: InterviewHandlers) -> Router {
    Router::new()
        .route("/:token", get(get_transcript))
        .route("/:token/start", post(start_session))
        .route("/:token/turns", post(send_turn))
        .route("/:token/retry", post(retry_turn))
        .route("/:token/complete", post(complete_session))
        .with_state(handlers)
}
