//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod admin;
pub mod interview;

pub use admin::{
    ClearFlagCommand, ClearFlagHandler, DeleteSessionCommand, DeleteSessionHandler,
    FlagSessionCommand, FlagSessionHandler,
};
pub use interview::{
    CompleteSessionCommand, CompleteSessionHandler, GetTranscriptHandler, GetTranscriptQuery,
    RetryTurnCommand, RetryTurnHandler, SendTurnCommand, SendTurnHandler, SendTurnResult,
    StartSessionCommand, StartSessionHandler, StartSessionResult, TranscriptView,
};
