//! Interview domain module.
//!
//! Turns, templates, and the pure pipeline around the turn generator:
//! context building, transcript windowing, output sanitizing, and progress
//! reconstruction from the log.

mod context;
mod message;
mod methodology;
mod progress;
mod rating;
mod sanitizer;
mod template;
mod transcript;

pub use context::{
    build_context, build_sections, join_sections, render_question_text, ContextError,
    ContextSection, InterviewContext, LEGACY_PLACEHOLDERS, SECTION_DELIMITER,
    SUBJECT_NAME_PLACEHOLDER,
};
pub use message::{Message, NewMessage, QuestionLink, Role, Sequence, MAX_CONTENT_LENGTH};
pub use methodology::{Methodology, INTERVIEW_METHODOLOGY};
pub use progress::InterviewProgress;
pub use rating::RatingValue;
pub use sanitizer::{rules as sanitizer_rules, sanitize, SanitizeRule, ACTION_VERBS};
pub use template::{Question, QuestionKind, RatingScale, RelationshipOption, Template};
pub use transcript::transcript_window;
