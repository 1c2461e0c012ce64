//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `SessionRepository` - Session aggregate persistence
//! - `MessageLog` - Append-only, ordered turn log per session
//! - `TemplateReader` - Read-only template access
//!
//! ## Service Ports
//!
//! - `TurnGenerator` - External interviewer model
//! - `RateLimiter` - Sliding-window admission control
//! - `SummaryScheduler` - Post-completion summary hand-off

mod message_log;
mod rate_limiter;
mod session_repository;
mod summary_scheduler;
mod template_reader;
mod turn_generator;

pub use message_log::MessageLog;
pub use rate_limiter::{
    retry_after_secs, RateLimitBucket, RateLimitDenied, RateLimitError, RateLimitKey,
    RateLimitPolicy, RateLimitResult, RateLimitStatus, RateLimiter,
};
pub use session_repository::SessionRepository;
pub use summary_scheduler::SummaryScheduler;
pub use template_reader::TemplateReader;
pub use turn_generator::{
    GeneratedTurn, GeneratorInfo, TranscriptTurn, TurnGenerationError, TurnGenerator,
    TurnInput, TurnRequest,
};
