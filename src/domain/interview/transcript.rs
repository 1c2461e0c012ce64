//! Transcript window passed to the turn generator.

use super::{Message, Role};

/// Returns the most recent part of the log that fits in `max_turns`.
///
/// The window preserves order and never splits a respondent turn from the
/// interviewer reply that follows it: it always begins at the start of the
/// log or at a respondent turn. When the last `max_turns` messages contain no
/// respondent turn, the window is widened back to the previous one.
pub fn transcript_window(messages: &[Message], max_turns: usize) -> &[Message] {
    if messages.len() <= max_turns {
        return messages;
    }

    let cut = messages.len() - max_turns;
    let start = messages[cut..]
        .iter()
        .position(|m| m.role() == Role::Respondent)
        .map(|offset| cut + offset)
        .or_else(|| {
            messages[..cut]
                .iter()
                .rposition(|m| m.role() == Role::Respondent)
        })
        .unwrap_or(0);

    tracing::debug!(
        total = messages.len(),
        kept = messages.len() - start,
        max_turns,
        "Truncated transcript window"
    );
    &messages[start..]
}
