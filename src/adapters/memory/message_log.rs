//! In-memory message log.
//!
//! Sequence assignment happens under the write lock, so concurrent appends
//! to one session can never observe the same "next" sequence.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, SessionId};
use crate::domain::interview::{Message, NewMessage, Sequence};
use crate::ports::MessageLog;

/// In-memory storage for per-session turn logs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMessageLog {
    logs: Arc<RwLock<HashMap<SessionId, Vec<Message>>>>,
}

impl InMemoryMessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored messages across sessions.
    pub async fn total_messages(&self) -> usize {
        self.logs.read().await.values().map(Vec::len).sum()
    }
}

#[async_trait]
impl MessageLog for InMemoryMessageLog {
    async fn append(&self, message: NewMessage) -> Result<Message, DomainError> {
        let mut logs = self.logs.write().await;
        let log = logs.entry(message.session_id).or_default();
        let sequence = Sequence::after(log.last().map(Message::sequence));
        let stored = message.into_message(sequence);
        log.push(stored.clone());

        tracing::debug!(
            session_id = %stored.session_id(),
            sequence = sequence.value(),
            role = stored.role().as_str(),
            "Appended message"
        );
        Ok(stored)
    }

    async fn list_by_session(&self, session_id: &SessionId) -> Result<Vec<Message>, DomainError> {
        Ok(self
            .logs
            .read()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn delete_by_session(&self, session_id: &SessionId) -> Result<u64, DomainError> {
        let removed = self.logs.write().await.remove(session_id);
        Ok(removed.map(|log| log.len() as u64).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::interview::Role;
    use proptest::prelude::*;

    #[tokio::test]
    async fn first_append_gets_sequence_one() {
        let log = InMemoryMessageLog::new();
        let session_id = SessionId::new();
        let msg = log
            .append(NewMessage::interviewer(session_id, "Hello").unwrap())
            .await
            .unwrap();
        assert_eq!(msg.sequence(), Sequence::FIRST);
    }

    #[tokio::test]
    async fn sessions_have_independent_sequences() {
        let log = InMemoryMessageLog::new();
        let a = SessionId::new();
        let b = SessionId::new();
        log.append(NewMessage::interviewer(a, "A1").unwrap()).await.unwrap();
        log.append(NewMessage::interviewer(a, "A2").unwrap()).await.unwrap();
        let first_b = log.append(NewMessage::interviewer(b, "B1").unwrap()).await.unwrap();
        assert_eq!(first_b.sequence(), Sequence::FIRST);
    }

    #[tokio::test]
    async fn delete_by_session_removes_all_messages() {
        let log = InMemoryMessageLog::new();
        let id = SessionId::new();
        for text in ["a", "b", "c"] {
            log.append(NewMessage::respondent(id, text).unwrap()).await.unwrap();
        }
        assert_eq!(log.delete_by_session(&id).await.unwrap(), 3);
        assert!(log.list_by_session(&id).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_never_duplicate_sequences() {
        let log = InMemoryMessageLog::new();
        let id = SessionId::new();

        let mut handles = Vec::new();
        for i in 0..50 {
            let log = log.clone();
            handles.push(tokio::spawn(async move {
                log.append(NewMessage::respondent(id, format!("turn {}", i)).unwrap())
                    .await
                    .unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let seqs: Vec<u32> = log
            .list_by_session(&id)
            .await
            .unwrap()
            .iter()
            .map(|m| m.sequence().value())
            .collect();
        assert_eq!(seqs, (1..=50).collect::<Vec<_>>());
    }

    proptest! {
        #[test]
        fn read_back_is_strictly_increasing(roles in prop::collection::vec(any::<bool>(), 1..40)) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let seqs: Vec<u32> = rt.block_on(async {
                let log = InMemoryMessageLog::new();
                let id = SessionId::new();
                for (i, interviewer) in roles.iter().enumerate() {
                    let role = if *interviewer { Role::Interviewer } else { Role::Respondent };
                    log.append(NewMessage::new(id, role, format!("t{}", i)).unwrap())
                        .await
                        .unwrap();
                }
                log.list_by_session(&id)
                    .await
                    .unwrap()
                    .iter()
                    .map(|m| m.sequence().value())
                    .collect()
            });
            prop_assert_eq!(seqs.len(), roles.len());
            prop_assert!(seqs.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
