//! Rating values attached to respondent turns.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Question, RatingScale};

/// A rating that has been checked against its question's scale.
///
/// Only constructed through validation, so a stored value is always
/// finite and within the scale it was given for.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RatingValue(f64);

impl RatingValue {
    /// Validates a raw rating against a scale.
    ///
    /// Non-finite and out-of-range values are discarded rather than clamped.
    pub fn validate(raw: f64, scale: &RatingScale) -> Option<Self> {
        if scale.contains(raw) {
            Some(Self(raw))
        } else {
            None
        }
    }

    /// Validates a raw rating for the question a turn is linked to.
    ///
    /// Returns `None` when there is no rating, no linked question, or the
    /// linked question is not rating-type.
    pub fn for_question(raw: Option<f64>, question: Option<&Question>) -> Option<Self> {
        let raw = raw?;
        let scale = question?.rating_scale()?;
        let validated = Self::validate(raw, scale);
        if validated.is_none() {
            tracing::debug!(
                raw,
                min = scale.min(),
                max = scale.max(),
                "Discarding out-of-scale rating"
            );
        }
        validated
    }

    /// Reconstitutes a stored rating (no validation).
    pub fn from_stored(value: f64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for RatingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::QuestionId;

    fn one_to_ten() -> RatingScale {
        RatingScale::new(1.0, 10.0).unwrap()
    }

    fn rating_question() -> Question {
        Question::rating(QuestionId::new("overall").unwrap(), "Overall?", one_to_ten())
    }

    #[test]
    fn in_range_value_is_kept() {
        assert_eq!(
            RatingValue::validate(7.0, &one_to_ten()).map(|r| r.value()),
            Some(7.0)
        );
    }

    #[test]
    fn huge_value_is_discarded() {
        assert!(RatingValue::validate(9.44e21, &one_to_ten()).is_none());
    }

    #[test]
    fn non_finite_values_are_discarded() {
        assert!(RatingValue::validate(f64::NAN, &one_to_ten()).is_none());
        assert!(RatingValue::validate(f64::NEG_INFINITY, &one_to_ten()).is_none());
    }

    #[test]
    fn text_question_never_carries_rating() {
        let question = Question::text(QuestionId::new("strengths").unwrap(), "Strengths?");
        assert!(RatingValue::for_question(Some(5.0), Some(&question)).is_none());
    }

    #[test]
    fn unlinked_turn_never_carries_rating() {
        assert!(RatingValue::for_question(Some(5.0), None).is_none());
    }

    #[test]
    fn rating_question_validates_value() {
        let question = rating_question();
        assert!(RatingValue::for_question(Some(5.0), Some(&question)).is_some());
        assert!(RatingValue::for_question(Some(11.0), Some(&question)).is_none());
        assert!(RatingValue::for_question(None, Some(&question)).is_none());
    }
}
