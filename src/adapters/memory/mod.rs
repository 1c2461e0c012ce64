//! In-memory storage adapters.
//!
//! Used by tests and when no database URL is configured.

mod message_log;
mod session_repository;
mod template_reader;

pub use message_log::InMemoryMessageLog;
pub use session_repository::InMemorySessionRepository;
pub use template_reader::InMemoryTemplateReader;
