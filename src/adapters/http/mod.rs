//! HTTP adapters - REST API implementations.
//!
//! - `interview` - Respondent-facing endpoints addressed by session token
//! - `admin` - Moderation and deletion by session id
//! - `error` - Shared error body and status mapping

pub mod admin;
pub mod error;
pub mod interview;

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::application::InterviewOrchestrator;

pub use admin::{admin_routes, AdminHandlers};
pub use error::{ApiError, ErrorResponse};
pub use interview::{interview_routes, InterviewHandlers};

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Builds the full API router.
pub fn api_router(orchestrator: Arc<InterviewOrchestrator>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest(
            "/api/interviews",
            interview_routes(InterviewHandlers::new(orchestrator.clone())),
        )
        .nest("/api/admin", admin_routes(AdminHandlers::new(orchestrator)))
}
