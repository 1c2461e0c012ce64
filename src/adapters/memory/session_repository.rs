//! In-memory session repository.
//!
//! Useful for tests, local development, and single-process deployments
//! without a database.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, SessionId, SessionToken};
use crate::domain::session::Session;
use crate::ports::SessionRepository;

/// In-memory storage for sessions, indexed by id and by token.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionRepository {
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn insert(&self, session: &Session) -> Result<(), DomainError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(session.id()) {
            return Err(DomainError::database("Session id already exists")
                .with_detail("session_id", session.id().to_string()));
        }
        if sessions.values().any(|s| s.token() == session.token()) {
            return Err(DomainError::database("Session token already exists"));
        }
        sessions.insert(*session.id(), session.clone());
        Ok(())
    }

    async fn update(&self, session: &Session) -> Result<(), DomainError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(session.id()) {
            Some(stored) => {
                *stored = session.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::SessionNotFound,
                format!("Session not found: {}", session.id()),
            )),
        }
    }

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, DomainError> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn find_by_token(&self, token: &SessionToken) -> Result<Option<Session>, DomainError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.values().find(|s| s.token() == token).cloned())
    }

    async fn delete(&self, id: &SessionId) -> Result<(), DomainError> {
        match self.sessions.write().await.remove(id) {
            Some(_) => Ok(()),
            None => Err(DomainError::new(
                ErrorCode::SessionNotFound,
                format!("Session not found: {}", id),
            )),
        }
    }
}
