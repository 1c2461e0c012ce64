//! HTTP routes for administrative endpoints.

use axum::{
    routing::{delete, post},
    Router,
};

use super::handlers::{clear_flag, delete_session, flag_session, AdminHandlers};

/// Creates the admin router, to be nested under `/api/admin`.
pub fn admin_routes(handlers: AdminHandlers) -> Router {
    Router::new()
        .route("/sessions/:id", delete(delete_session))
        .route("/sessions/:id/flag", post(flag_session).delete(clear_flag))
        .with_state(handlers)
}
