//! Session domain module.
//!
//! Handles the interview session lifecycle: invitation, start with the
//! respondent's relationship selection, completion, and out-of-band
//! moderation flags.

mod aggregate;
mod state;

pub use aggregate::{
    ModerationFlag, Session, Subject, MAX_FLAG_REASON_LENGTH, MAX_RESPONDENT_NAME_LENGTH,
};
pub use state::SessionState;
