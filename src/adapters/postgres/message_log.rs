//! PostgreSQL implementation of MessageLog.
//!
//! Sequence numbers are assigned inside the INSERT so concurrent writers
//! cannot observe the same `MAX(sequence)` and both commit; the losing
//! writer trips the `(session_id, sequence)` unique constraint instead.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::foundation::{
    DomainError, ErrorCode, MessageId, QuestionId, SessionId, Timestamp,
};
use crate::domain::interview::{
    Message, NewMessage, QuestionLink, RatingValue, Role, Sequence,
};
use crate::ports::MessageLog;

use super::{column, db_error};

/// PostgreSQL implementation of MessageLog.
#[derive(Clone)]
pub struct PostgresMessageLog {
    pool: PgPool,
}

impl PostgresMessageLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageLog for PostgresMessageLog {
    async fn append(&self, message: NewMessage) -> Result<Message, DomainError> {
        let id = MessageId::new();
        let created_at = Timestamp::now();

        let row = sqlx::query(
            r#"
            INSERT INTO interview_messages (
                id, session_id, sequence, role, content,
                question_id, question_text, rating_value, created_at
            )
            SELECT $1, $2, COALESCE(MAX(sequence), 0) + 1, $3, $4, $5, $6, $7, $8
            FROM interview_messages
            WHERE session_id = $2
            RETURNING sequence
            "#,
        )
        .bind(id.as_uuid())
        .bind(message.session_id.as_uuid())
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(message.question.as_ref().map(|q| q.question_id.as_str()))
        .bind(message.question.as_ref().map(|q| q.question_text.as_str()))
        .bind(message.rating.map(|r| r.value()))
        .bind(created_at.as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => DomainError::new(
                ErrorCode::SequenceConflict,
                format!(
                    "Concurrent append to session {}; sequence already taken",
                    message.session_id
                ),
            ),
            _ => db_error("append message", e),
        })?;

        let sequence: i32 = column(&row, "sequence")?;

        Ok(Message::reconstitute(
            id,
            message.session_id,
            stored_sequence(sequence)?,
            message.role,
            message.content,
            message.question,
            message.rating,
            created_at,
        ))
    }

    async fn list_by_session(&self, session_id: &SessionId) -> Result<Vec<Message>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, session_id, sequence, role, content,
                   question_id, question_text, rating_value, created_at
            FROM interview_messages
            WHERE session_id = $1
            ORDER BY sequence ASC
            "#,
        )
        .bind(session_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list messages", e))?;

        rows.into_iter().map(row_to_message).collect()
    }

    async fn delete_by_session(&self, session_id: &SessionId) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM interview_messages WHERE session_id = $1")
            .bind(session_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("delete messages", e))?;

        Ok(result.rows_affected())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

fn stored_sequence(value: i32) -> Result<Sequence, DomainError> {
    u32::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .map(Sequence::new)
        .ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid stored sequence: {}", value),
            )
        })
}

fn str_to_role(s: &str) -> Result<Role, DomainError> {
    Role::parse(s).ok_or_else(|| {
        DomainError::new(ErrorCode::DatabaseError, format!("Invalid message role: {}", s))
    })
}

fn row_to_message(row: sqlx::postgres::PgRow) -> Result<Message, DomainError> {
    let id: uuid::Uuid = column(&row, "id")?;
    let session_id: uuid::Uuid = column(&row, "session_id")?;
    let sequence: i32 = column(&row, "sequence")?;
    let role: String = column(&row, "role")?;
    let content: String = column(&row, "content")?;
    let question_id: Option<String> = column(&row, "question_id")?;
    let question_text: Option<String> = column(&row, "question_text")?;
    let rating_value: Option<f64> = column(&row, "rating_value")?;
    let created_at: DateTime<Utc> = column(&row, "created_at")?;

    let question = match question_id {
        Some(qid) => Some(QuestionLink::new(
            QuestionId::new(qid).map_err(|e| DomainError::database(e.to_string()))?,
            question_text.unwrap_or_default(),
        )),
        None => None,
    };

    Ok(Message::reconstitute(
        MessageId::from_uuid(id),
        SessionId::from_uuid(session_id),
        stored_sequence(sequence)?,
        str_to_role(&role)?,
        content,
        question,
        rating_value.map(RatingValue::from_stored),
        Timestamp::from_datetime(created_at),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_conversion_accepts_stored_values() {
        assert_eq!(str_to_role("interviewer").unwrap(), Role::Interviewer);
        assert_eq!(str_to_role("respondent").unwrap(), Role::Respondent);
        assert!(str_to_role("system").is_err());
    }

    #[test]
    fn stored_sequence_must_be_positive() {
        assert_eq!(stored_sequence(3).unwrap().value(), 3);
        assert!(stored_sequence(0).is_err());
        assert!(stored_sequence(-1).is_err());
    }
}
