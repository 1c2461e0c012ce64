//! Message log port.
//!
//! An append-only, strictly ordered log of turns per session.
//!
//! # Ordering
//!
//! `append` assigns the next sequence (`max + 1`, or 1 for an empty log).
//! Implementations must make that assignment atomic with the insert, or at
//! least refuse duplicates: a second writer racing for the same sequence
//! gets `SequenceConflict`, never a duplicate row.

use crate::domain::foundation::{DomainError, SessionId};
use crate::domain::interview::{Message, NewMessage};
use async_trait::async_trait;

/// Port for the per-session message log.
#[async_trait]
pub trait MessageLog: Send + Sync {
    /// Append a turn, assigning its sequence.
    ///
    /// # Errors
    ///
    /// - `SequenceConflict` if another writer took the same sequence
    /// - `DatabaseError` on persistence failure
    async fn append(&self, message: NewMessage) -> Result<Message, DomainError>;

    /// All messages of a session, ascending by sequence.
    async fn list_by_session(&self, session_id: &SessionId) -> Result<Vec<Message>, DomainError>;

    /// Delete every message of a session. Returns the number removed.
    async fn delete_by_session(&self, session_id: &SessionId) -> Result<u64, DomainError>;
}
