//! Turn context builder.
//!
//! Assembles the instructions handed to the turn generator as a list of typed
//! sections joined by a fixed delimiter:
//!
//! 1. methodology (always first)
//! 2. interview context (subject identity, role, respondent relationship)
//! 3. persona (optional, per template)
//! 4. open questions, numbered from 1
//!
//! Building is pure; the same inputs always produce the same text.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::{Methodology, Question, QuestionKind};

/// Separator placed between sections.
pub const SECTION_DELIMITER: &str = "\n\n---\n\n";

/// Placeholder substituted with the subject's name.
pub const SUBJECT_NAME_PLACEHOLDER: &str = "subjectName";

/// Placeholders from older template revisions that are no longer substituted
/// in persona text.
pub const LEGACY_PLACEHOLDERS: &[&str] = &[
    "teamMemberName",
    "employeeName",
    "revieweeName",
    "managerName",
    "personName",
];

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z][A-Za-z0-9_]*)\s*\}\}").expect("placeholder pattern is valid")
});

/// Errors from context building.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("Persona contains deprecated placeholder '{{{{{placeholder}}}}}'")]
    LegacyPlaceholder { placeholder: String },
}

/// Session-specific inputs to the context.
#[derive(Debug, Clone, Copy)]
pub struct InterviewContext<'a> {
    pub subject_name: &'a str,
    pub subject_role: Option<&'a str>,
    pub relationship_label: &'a str,
    pub persona: Option<&'a str>,
    pub questions: &'a [Question],
}

/// One typed section of the generator instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextSection {
    Methodology(String),
    Context(String),
    Persona(String),
    Questions(String),
}

impl ContextSection {
    pub fn body(&self) -> &str {
        match self {
            ContextSection::Methodology(s)
            | ContextSection::Context(s)
            | ContextSection::Persona(s)
            | ContextSection::Questions(s) => s,
        }
    }
}

/// Builds the generator instructions.
///
/// # Errors
///
/// - `LegacyPlaceholder` if the persona still uses a retired placeholder
pub fn build_context(
    methodology: &Methodology,
    context: &InterviewContext<'_>,
) -> Result<String, ContextError> {
    let sections = build_sections(methodology, context)?;
    let text = join_sections(&sections);
    tracing::debug!(
        sections = sections.len(),
        chars = text.len(),
        methodology_version = methodology.version,
        "Built turn context"
    );
    Ok(text)
}

/// Builds the typed sections in their fixed order.
pub fn build_sections(
    methodology: &Methodology,
    context: &InterviewContext<'_>,
) -> Result<Vec<ContextSection>, ContextError> {
    let mut sections = vec![
        ContextSection::Methodology(methodology.text.to_string()),
        ContextSection::Context(render_context(context)),
    ];

    if let Some(persona) = context.persona.filter(|p| !p.trim().is_empty()) {
        sections.push(ContextSection::Persona(render_persona(
            persona,
            context.subject_name,
        )?));
    }

    sections.push(ContextSection::Questions(render_questions(
        context.questions,
        context.subject_name,
    )));
    Ok(sections)
}

/// Joins sections with [`SECTION_DELIMITER`].
pub fn join_sections(sections: &[ContextSection]) -> String {
    sections
        .iter()
        .map(ContextSection::body)
        .collect::<Vec<_>>()
        .join(SECTION_DELIMITER)
}

fn render_context(context: &InterviewContext<'_>) -> String {
    let mut out = String::from("INTERVIEW CONTEXT\n");
    out.push_str(&format!("Subject: {}\n", context.subject_name));
    if let Some(role) = context.subject_role.filter(|r| !r.trim().is_empty()) {
        out.push_str(&format!("Subject role: {}\n", role));
    }
    out.push_str(&format!(
        "Respondent relationship to subject: {}",
        context.relationship_label
    ));
    out
}

fn render_persona(persona: &str, subject_name: &str) -> Result<String, ContextError> {
    for caps in PLACEHOLDER.captures_iter(persona) {
        let name = &caps[1];
        if LEGACY_PLACEHOLDERS.contains(&name) {
            return Err(ContextError::LegacyPlaceholder {
                placeholder: name.to_string(),
            });
        }
    }
    let rendered = substitute(persona.trim(), subject_name, &[SUBJECT_NAME_PLACEHOLDER]);
    Ok(format!("INTERVIEWER PERSONA\n{}", rendered))
}

fn render_questions(questions: &[Question], subject_name: &str) -> String {
    let mut out = String::from("OPEN QUESTIONS");
    for (index, question) in questions.iter().enumerate() {
        out.push_str(&format!(
            "\n{}. [id: {}] {}",
            index + 1,
            question.id,
            render_question_text(question, subject_name)
        ));
        if let QuestionKind::Rating { scale } = question.kind {
            out.push_str(&format!(
                " (Rating question: ask for a number from {} to {}.)",
                scale.min(),
                scale.max()
            ));
        }
        if question.collect_multiple {
            out.push_str(" (Collect 2-3 distinct examples before moving on.)");
        }
    }
    out
}

/// Renders a question's text with every known placeholder replaced by the
/// subject's name.
pub fn render_question_text(question: &Question, subject_name: &str) -> String {
    let mut known = vec![SUBJECT_NAME_PLACEHOLDER];
    known.extend_from_slice(LEGACY_PLACEHOLDERS);
    substitute(question.text.trim(), subject_name, &known)
}

fn substitute(text: &str, value: &str, names: &[&str]) -> String {
    PLACEHOLDER
        .replace_all(text, |caps: &regex::Captures<'_>| {
            if names.contains(&&caps[1]) {
                value.to_string()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}
