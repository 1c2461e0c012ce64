//! Per-session single-flight guard.
//!
//! At most one turn pipeline may run per session in this process. A second
//! caller is rejected immediately rather than queued. The permit is released
//! on drop, so it can be moved into a spawned task that outlives the request.
//!
//! This guard is process-local; across processes the message log's unique
//! `(session_id, sequence)` constraint rejects the losing writer.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::foundation::SessionId;

/// Registry of sessions with a pipeline in flight.
#[derive(Debug, Clone, Default)]
pub struct SingleFlight {
    in_flight: Arc<Mutex<HashSet<SessionId>>>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the session, or returns `None` if it is already claimed.
    pub fn try_acquire(&self, session_id: SessionId) -> Option<FlightPermit> {
        if !lock(&self.in_flight).insert(session_id) {
            return None;
        }
        Some(FlightPermit {
            session_id,
            registry: Arc::clone(&self.in_flight),
        })
    }

    pub fn is_in_flight(&self, session_id: &SessionId) -> bool {
        lock(&self.in_flight).contains(session_id)
    }

    pub fn in_flight_count(&self) -> usize {
        lock(&self.in_flight).len()
    }
}

/// Exclusive claim on one session; released on drop.
#[derive(Debug)]
pub struct FlightPermit {
    session_id: SessionId,
    registry: Arc<Mutex<HashSet<SessionId>>>,
}

impl FlightPermit {
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }
}

impl Drop for FlightPermit {
    fn drop(&mut self) {
        lock(&self.registry).remove(&self.session_id);
    }
}

fn lock(set: &Mutex<HashSet<SessionId>>) -> MutexGuard<'_, HashSet<SessionId>> {
    set.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_is_rejected_until_drop() {
        let guard = SingleFlight::new();
        let id = SessionId::new();

        let permit = guard.try_acquire(id).unwrap();
        assert!(guard.try_acquire(id).is_none());
        assert!(guard.is_in_flight(&id));

        drop(permit);
        assert!(!guard.is_in_flight(&id));
        assert!(guard.try_acquire(id).is_some());
    }

    #[test]
    fn sessions_are_independent() {
        let guard = SingleFlight::new();
        let _a = guard.try_acquire(SessionId::new()).unwrap();
        let _b = guard.try_acquire(SessionId::new()).unwrap();
        assert_eq!(guard.in_flight_count(), 2);
    }

    #[tokio::test]
    async fn permit_moved_into_task_holds_until_task_ends() {
        let guard = SingleFlight::new();
        let id = SessionId::new();
        let permit = guard.try_acquire(id).unwrap();

        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let _permit = permit;
            let _ = rx.await;
        });

        assert!(guard.try_acquire(id).is_none());
        tx.send(()).unwrap();
        task.await.unwrap();
        assert!(guard.try_acquire(id).is_some());
    }

    #[tokio::test]
    async fn concurrent_claims_admit_exactly_one() {
        let guard = SingleFlight::new();
        let id = SessionId::new();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let guard = guard.clone();
                tokio::spawn(async move { guard.try_acquire(id) })
            })
            .collect();

        let mut permits = Vec::new();
        for handle in handles {
            if let Some(permit) = handle.await.unwrap() {
                permits.push(permit);
            }
        }
        assert_eq!(permits.len(), 1);
    }
}
