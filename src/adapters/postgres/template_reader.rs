//! PostgreSQL implementation of TemplateReader.
//!
//! Questions and relationship options are stored as JSONB documents and
//! re-validated through `Template::new` on load.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{DomainError, ErrorCode, TemplateId};
use crate::domain::interview::{Question, RelationshipOption, Template};
use crate::ports::TemplateReader;

use super::{column, db_error};

/// PostgreSQL implementation of TemplateReader.
#[derive(Clone)]
pub struct PostgresTemplateReader {
    pool: PgPool,
}

impl PostgresTemplateReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TemplateReader for PostgresTemplateReader {
    async fn find_by_id(&self, id: &TemplateId) -> Result<Option<Template>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, persona,
                   relationships::text AS relationships,
                   questions::text AS questions
            FROM interview_templates
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("fetch template", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let name: String = column(&row, "name")?;
        let persona: Option<String> = column(&row, "persona")?;
        let relationships: String = column(&row, "relationships")?;
        let questions: String = column(&row, "questions")?;

        let template = parse_template(*id, name, persona, &relationships, &questions)?;
        Ok(Some(template))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

fn parse_template(
    id: TemplateId,
    name: String,
    persona: Option<String>,
    relationships_json: &str,
    questions_json: &str,
) -> Result<Template, DomainError> {
    let relationships: Vec<RelationshipOption> = serde_json::from_str(relationships_json)
        .map_err(|e| invalid_template(id, format!("relationships: {}", e)))?;
    let questions: Vec<Question> = serde_json::from_str(questions_json)
        .map_err(|e| invalid_template(id, format!("questions: {}", e)))?;

    Template::new(id, name, persona, relationships, questions)
        .map_err(|e| invalid_template(id, e.message))
}

fn invalid_template(id: TemplateId, reason: String) -> DomainError {
    DomainError::new(
        ErrorCode::InvalidTemplate,
        format!("Stored template {} is invalid: {}", id, reason),
    )
}
