//! PostgreSQL implementation of SessionRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::foundation::{
    DomainError, ErrorCode, RelationshipId, SessionId, SessionToken, TemplateId, Timestamp,
};
use crate::domain::session::{ModerationFlag, Session, SessionState, Subject};
use crate::ports::SessionRepository;

use super::{column, db_error};

const SELECT_COLUMNS: &str = r#"
    SELECT id, token, template_id, subject_name, subject_role, state,
           respondent_name, relationship, flag_reason, flagged_at,
           started_at, completed_at, created_at, updated_at
    FROM interview_sessions
"#;

/// PostgreSQL implementation of SessionRepository.
#[derive(Clone)]
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn insert(&self, session: &Session) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO interview_sessions (
                id, token, template_id, subject_name, subject_role, state,
                respondent_name, relationship, flag_reason, flagged_at,
                started_at, completed_at, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(session.id().as_uuid())
        .bind(session.token().as_str())
        .bind(session.template_id().as_uuid())
        .bind(&session.subject().name)
        .bind(session.subject().role.as_deref())
        .bind(session.state().as_str())
        .bind(session.respondent_name())
        .bind(session.relationship().map(RelationshipId::as_str))
        .bind(session.moderation().map(|m| m.reason.as_str()))
        .bind(session.moderation().map(|m| *m.flagged_at.as_datetime()))
        .bind(session.started_at().map(|t| *t.as_datetime()))
        .bind(session.completed_at().map(|t| *t.as_datetime()))
        .bind(session.created_at().as_datetime())
        .bind(session.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("insert session", e))?;

        Ok(())
    }

    async fn update(&self, session: &Session) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE interview_sessions SET
                state = $2,
                respondent_name = $3,
                relationship = $4,
                flag_reason = $5,
                flagged_at = $6,
                started_at = $7,
                completed_at = $8,
                updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(session.id().as_uuid())
        .bind(session.state().as_str())
        .bind(session.respondent_name())
        .bind(session.relationship().map(RelationshipId::as_str))
        .bind(session.moderation().map(|m| m.reason.as_str()))
        .bind(session.moderation().map(|m| *m.flagged_at.as_datetime()))
        .bind(session.started_at().map(|t| *t.as_datetime()))
        .bind(session.completed_at().map(|t| *t.as_datetime()))
        .bind(session.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("update session", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::SessionNotFound,
                format!("Session not found: {}", session.id()),
            ));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, DomainError> {
        let row = sqlx::query(&format!("{} WHERE id = $1", SELECT_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("fetch session", e))?;

        row.map(row_to_session).transpose()
    }

    async fn find_by_token(&self, token: &SessionToken) -> Result<Option<Session>, DomainError> {
        let row = sqlx::query(&format!("{} WHERE token = $1", SELECT_COLUMNS))
            .bind(token.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("fetch session by token", e))?;

        row.map(row_to_session).transpose()
    }

    async fn delete(&self, id: &SessionId) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin delete", e))?;

        sqlx::query("DELETE FROM interview_messages WHERE session_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("delete session messages", e))?;

        let result = sqlx::query("DELETE FROM interview_sessions WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("delete session", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::SessionNotFound,
                format!("Session not found: {}", id),
            ));
        }

        tx.commit().await.map_err(|e| db_error("commit delete", e))?;
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

fn str_to_state(s: &str) -> Result<SessionState, DomainError> {
    SessionState::parse(s).ok_or_else(|| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid session state: {}", s),
        )
    })
}

fn row_to_session(row: sqlx::postgres::PgRow) -> Result<Session, DomainError> {
    let id: uuid::Uuid = column(&row, "id")?;
    let token: String = column(&row, "token")?;
    let template_id: uuid::Uuid = column(&row, "template_id")?;
    let subject_name: String = column(&row, "subject_name")?;
    let subject_role: Option<String> = column(&row, "subject_role")?;
    let state: String = column(&row, "state")?;
    let respondent_name: Option<String> = column(&row, "respondent_name")?;
    let relationship: Option<String> = column(&row, "relationship")?;
    let flag_reason: Option<String> = column(&row, "flag_reason")?;
    let flagged_at: Option<DateTime<Utc>> = column(&row, "flagged_at")?;
    let started_at: Option<DateTime<Utc>> = column(&row, "started_at")?;
    let completed_at: Option<DateTime<Utc>> = column(&row, "completed_at")?;
    let created_at: DateTime<Utc> = column(&row, "created_at")?;
    let updated_at: DateTime<Utc> = column(&row, "updated_at")?;

    let corrupt = |field: &str, e: String| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid stored {}: {}", field, e),
        )
    };

    let moderation = match (flag_reason, flagged_at) {
        (Some(reason), Some(at)) => Some(ModerationFlag {
            reason,
            flagged_at: Timestamp::from_datetime(at),
        }),
        _ => None,
    };

    Ok(Session::reconstitute(
        SessionId::from_uuid(id),
        SessionToken::new(token).map_err(|e| corrupt("token", e.to_string()))?,
        TemplateId::from_uuid(template_id),
        Subject {
            name: subject_name,
            role: subject_role,
        },
        str_to_state(&state)?,
        respondent_name,
        relationship
            .map(RelationshipId::new)
            .transpose()
            .map_err(|e| corrupt("relationship", e.to_string()))?,
        moderation,
        started_at.map(Timestamp::from_datetime),
        completed_at.map(Timestamp::from_datetime),
        Timestamp::from_datetime(created_at),
        Timestamp::from_datetime(updated_at),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_conversion_accepts_stored_values() {
        for state in [
            SessionState::NotStarted,
            SessionState::InProgress,
            SessionState::Completed,
        ] {
            assert_eq!(str_to_state(state.as_str()).unwrap(), state);
        }
    }

    #[test]
    fn state_conversion_rejects_unknown_values() {
        let err = str_to_state("archived").unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }
}
