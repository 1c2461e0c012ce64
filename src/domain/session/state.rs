//! SessionState enum for tracking the lifecycle of an interview session.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Lifecycle state of an interview session.
///
/// Sessions only ever move forward: `NotStarted -> InProgress -> Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl SessionState {
    /// Returns true if turns may be appended in this state.
    pub fn accepts_turns(&self) -> bool {
        matches!(self, SessionState::InProgress)
    }

    /// Stable storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::NotStarted => "not_started",
            SessionState::InProgress => "in_progress",
            SessionState::Completed => "completed",
        }
    }

    /// Parses the storage representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "not_started" => Some(SessionState::NotStarted),
            "in_progress" => Some(SessionState::InProgress),
            "completed" => Some(SessionState::Completed),
            _ => None,
        }
    }
}

impl StateMachine for SessionState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SessionState::*;
        matches!((self, target), (NotStarted, InProgress) | (InProgress, Completed))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SessionState::*;
        match self {
            NotStarted => vec![InProgress],
            InProgress => vec![Completed],
            Completed => vec![],
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::NotStarted => "NotStarted",
            SessionState::InProgress => "InProgress",
            SessionState::Completed => "Completed",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [SessionState; 3] = [
        SessionState::NotStarted,
        SessionState::InProgress,
        SessionState::Completed,
    ];

    #[test]
    fn default_is_not_started() {
        assert_eq!(SessionState::default(), SessionState::NotStarted);
    }

    #[test]
    fn only_forward_transitions_are_valid() {
        use SessionState::*;
        for from in ALL {
            for to in ALL {
                let expected = matches!((from, to), (NotStarted, InProgress) | (InProgress, Completed));
                assert_eq!(from.can_transition_to(&to), expected, "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn completed_is_terminal() {
        assert!(SessionState::Completed.is_terminal());
        assert!(!SessionState::InProgress.is_terminal());
    }

    #[test]
    fn completed_cannot_be_reopened() {
        assert!(SessionState::Completed
            .transition_to(SessionState::InProgress)
            .is_err());
    }

    #[test]
    fn only_in_progress_accepts_turns() {
        assert!(!SessionState::NotStarted.accepts_turns());
        assert!(SessionState::InProgress.accepts_turns());
        assert!(!SessionState::Completed.accepts_turns());
    }

    #[test]
    fn storage_representation_parses_back() {
        for state in ALL {
            assert_eq!(SessionState::parse(state.as_str()), Some(state));
        }
        assert_eq!(SessionState::parse("archived"), None);
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&SessionState::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }
}
