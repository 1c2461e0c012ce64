//! Interview template read model.
//!
//! Templates are authored elsewhere; the orchestrator only reads them to
//! validate relationship selections, resolve question links, and build the
//! turn context.

use crate::domain::foundation::{DomainError, QuestionId, RelationshipId, TemplateId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Inclusive numeric scale for a rating question.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingScale {
    min: f64,
    max: f64,
}

impl RatingScale {
    /// Creates a scale, rejecting non-finite or inverted bounds.
    pub fn new(min: f64, max: f64) -> Result<Self, DomainError> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(DomainError::validation(
                "rating_scale",
                format!("Invalid rating scale {}..{}", min, max),
            ));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Returns true if `value` is finite and inside the scale.
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

/// What kind of answer a question expects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    Text,
    Rating { scale: RatingScale },
}

/// One open question of a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub kind: QuestionKind,
    /// Generator should collect several distinct answers before moving on.
    pub collect_multiple: bool,
}

impl Question {
    /// Creates a free-text question.
    pub fn text(id: QuestionId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            kind: QuestionKind::Text,
            collect_multiple: false,
        }
    }

    /// Creates a rating question on the given scale.
    pub fn rating(id: QuestionId, text: impl Into<String>, scale: RatingScale) -> Self {
        Self {
            id,
            text: text.into(),
            kind: QuestionKind::Rating { scale },
            collect_multiple: false,
        }
    }

    /// Marks the question as collecting multiple answers.
    pub fn collecting_multiple(mut self) -> Self {
        self.collect_multiple = true;
        self
    }

    /// Returns the rating scale if this is a rating question.
    pub fn rating_scale(&self) -> Option<&RatingScale> {
        match &self.kind {
            QuestionKind::Rating { scale } => Some(scale),
            QuestionKind::Text => None,
        }
    }
}

/// A relationship category respondents may select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipOption {
    pub id: RelationshipId,
    pub label: String,
}

impl RelationshipOption {
    pub fn new(id: RelationshipId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

/// Interview template.
///
/// # Invariants
///
/// - at least one question and one relationship option
/// - question ids and relationship ids are unique within the template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    id: TemplateId,
    name: String,
    persona: Option<String>,
    relationships: Vec<RelationshipOption>,
    questions: Vec<Question>,
}

impl Template {
    /// Creates a validated template.
    pub fn new(
        id: TemplateId,
        name: impl Into<String>,
        persona: Option<String>,
        relationships: Vec<RelationshipOption>,
        questions: Vec<Question>,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name", "Template name cannot be empty"));
        }
        if questions.is_empty() {
            return Err(DomainError::validation(
                "questions",
                "Template must define at least one question",
            ));
        }
        if relationships.is_empty() {
            return Err(DomainError::validation(
                "relationships",
                "Template must define at least one relationship option",
            ));
        }

        let mut seen = HashSet::new();
        for question in &questions {
            if !seen.insert(question.id.as_str()) {
                return Err(DomainError::validation(
                    "questions",
                    format!("Duplicate question id '{}'", question.id),
                ));
            }
        }
        let mut seen = HashSet::new();
        for option in &relationships {
            if !seen.insert(option.id.as_str()) {
                return Err(DomainError::validation(
                    "relationships",
                    format!("Duplicate relationship id '{}'", option.id),
                ));
            }
        }

        Ok(Self {
            id,
            name,
            persona: persona.filter(|p| !p.trim().is_empty()),
            relationships,
            questions,
        })
    }

    pub fn id(&self) -> &TemplateId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn persona(&self) -> Option<&str> {
        self.persona.as_deref()
    }

    pub fn relationships(&self) -> &[RelationshipOption] {
        &self.relationships
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Looks up a question by id.
    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| &q.id == id)
    }

    /// Looks up a relationship option by id.
    pub fn relationship(&self, id: &RelationshipId) -> Option<&RelationshipOption> {
        self.relationships.iter().find(|r| &r.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qid(s: &str) -> QuestionId {
        QuestionId::new(s).unwrap()
    }

    fn peer() -> RelationshipOption {
        RelationshipOption::new(RelationshipId::new("peer").unwrap(), "Peer")
    }

    #[test]
    fn rating_scale_rejects_inverted_bounds() {
        assert!(RatingScale::new(10.0, 1.0).is_err());
        assert!(RatingScale::new(1.0, f64::NAN).is_err());
    }

    #[test]
    fn rating_scale_contains_is_inclusive() {
        let scale = RatingScale::new(1.0, 10.0).unwrap();
        assert!(scale.contains(1.0));
        assert!(scale.contains(10.0));
        assert!(!scale.contains(10.5));
        assert!(!scale.contains(f64::INFINITY));
    }

    #[test]
    fn template_requires_questions() {
        let result = Template::new(TemplateId::new(), "360", None, vec![peer()], vec![]);
        assert!(result.is_err());
    }

    #[test]
    fn template_rejects_duplicate_question_ids() {
        let questions = vec![
            Question::text(qid("a"), "First?"),
            Question::text(qid("a"), "Second?"),
        ];
        let result = Template::new(TemplateId::new(), "360", None, vec![peer()], questions);
        assert!(result.is_err());
    }

    #[test]
    fn template_drops_blank_persona() {
        let template = Template::new(
            TemplateId::new(),
            "360",
            Some("  ".to_string()),
            vec![peer()],
            vec![Question::text(qid("a"), "First?")],
        )
        .unwrap();
        assert!(template.persona().is_none());
    }

    #[test]
    fn lookups_find_questions_and_relationships() {
        let scale = RatingScale::new(1.0, 10.0).unwrap();
        let template = Template::new(
            TemplateId::new(),
            "360",
            None,
            vec![peer()],
            vec![
                Question::text(qid("strengths"), "Strengths?").collecting_multiple(),
                Question::rating(qid("overall"), "Overall?", scale),
            ],
        )
        .unwrap();

        assert!(template.question(&qid("strengths")).unwrap().collect_multiple);
        assert_eq!(
            template.question(&qid("overall")).unwrap().rating_scale(),
            Some(&scale)
        );
        assert!(template.question(&qid("missing")).is_none());
        assert_eq!(
            template
                .relationship(&RelationshipId::new("peer").unwrap())
                .map(|r| r.label.as_str()),
            Some("Peer")
        );
    }
}
