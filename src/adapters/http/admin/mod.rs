//! HTTP adapter for administrative endpoints.
//!
//! Authentication for these routes is expected from the deployment's
//! gateway; the router itself does not check credentials.

mod dto;
mod handlers;
mod routes;

pub use dto::{DeleteSessionResponse, FlagSessionRequest, ModerationResponse};
pub use handlers::AdminHandlers;
pub use routes::admin_routes;
