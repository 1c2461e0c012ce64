//! Interview progress reconstructed from the message log.
//!
//! The log is the single source of truth: a client revisiting an
//! in-progress session gets its state from here, never from client-held
//! data.

use serde::Serialize;

use crate::domain::foundation::QuestionId;

use super::{Message, QuestionLink, Role, Sequence, Template};

/// Conversational state derived from a session's log.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct InterviewProgress {
    /// Question asked by the latest interviewer turn that named one.
    pub current_question: Option<QuestionLink>,
    /// Questions linked by any turn, in first-seen order.
    pub touched_questions: Vec<QuestionId>,
    /// True when the log ends with a respondent turn, or is empty while an
    /// opening greeting is expected; the interviewer owes the next turn.
    pub awaiting_interviewer: bool,
    pub interviewer_turns: usize,
    pub respondent_turns: usize,
    pub last_sequence: Option<Sequence>,
}

impl InterviewProgress {
    /// Replays the log in sequence order, expecting an opening greeting.
    pub fn from_log(messages: &[Message]) -> Self {
        Self::replay(messages, true)
    }

    /// Replays the log in sequence order. `opening_turn` says whether an
    /// empty log still owes the interviewer's greeting.
    pub fn replay(messages: &[Message], opening_turn: bool) -> Self {
        let mut progress = InterviewProgress::default();

        for message in messages {
            match message.role() {
                Role::Interviewer => {
                    progress.interviewer_turns += 1;
                    if let Some(link) = message.question() {
                        progress.current_question = Some(link.clone());
                    }
                }
                Role::Respondent => progress.respondent_turns += 1,
            }
            if let Some(link) = message.question() {
                if !progress.touched_questions.contains(&link.question_id) {
                    progress.touched_questions.push(link.question_id.clone());
                }
            }
            progress.last_sequence = Some(message.sequence());
        }

        progress.awaiting_interviewer = messages
            .last()
            .map(|m| m.role() == Role::Respondent)
            .unwrap_or(opening_turn);
        progress
    }

    /// Template questions no turn has linked yet, in template order.
    pub fn untouched_questions<'a>(&self, template: &'a Template) -> Vec<&'a QuestionId> {
        template
            .questions()
            .iter()
            .map(|q| &q.id)
            .filter(|id| !self.touched_questions.contains(id))
            .collect()
    }
}
