//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers (write) and query handlers (read) are kept separate; the
//! [`InterviewOrchestrator`] wires them together behind one façade.

mod errors;
pub mod handlers;
mod orchestrator;
mod single_flight;
mod turn_pipeline;

pub use errors::InterviewError;
pub use handlers::{
    ClearFlagCommand, CompleteSessionCommand, DeleteSessionCommand, FlagSessionCommand,
    GetTranscriptQuery, RetryTurnCommand, SendTurnCommand, SendTurnResult, StartSessionCommand,
    StartSessionResult, TranscriptView,
};
pub use orchestrator::{InterviewOrchestrator, OrchestratorDeps};
pub use single_flight::{FlightPermit, SingleFlight};
pub use turn_pipeline::{PipelineSettings, TurnPipeline, OPENING_SEED};
