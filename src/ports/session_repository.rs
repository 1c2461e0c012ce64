//! Session repository port.
//!
//! Defines the contract for persisting and retrieving Session aggregates.
//! Sessions are reached by respondents through their shareable token and
//! by administrators through the internal id.

use crate::domain::foundation::{DomainError, SessionId, SessionToken};
use crate::domain::session::Session;
use async_trait::async_trait;

/// Repository port for Session aggregate persistence.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Save a new session.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure or duplicate token
    async fn insert(&self, session: &Session) -> Result<(), DomainError>;

    /// Update an existing session.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` if session doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update(&self, session: &Session) -> Result<(), DomainError>;

    /// Find a session by its internal ID.
    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, DomainError>;

    /// Find a session by its shareable token.
    async fn find_by_token(&self, token: &SessionToken) -> Result<Option<Session>, DomainError>;

    /// Delete a session record.
    ///
    /// Implementations must never leave messages behind for a deleted
    /// session: either remove them in the same transaction or rely on the
    /// caller having removed them first.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` if session doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn delete(&self, id: &SessionId) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn SessionRepository) {}
    }
}
