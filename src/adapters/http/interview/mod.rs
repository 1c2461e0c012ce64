//! HTTP adapter for respondent-facing interview endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    MessageResponse, ProgressResponse, SendTurnRequest, SessionResponse, StartSessionRequest,
    StartSessionResponse, TranscriptResponse, TurnsResponse,
};
pub use handlers::InterviewHandlers;
pub use routes::interview_routes;
