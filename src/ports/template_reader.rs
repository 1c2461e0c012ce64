//! Template reader port (read-only).
//!
//! Templates are authored outside the orchestrator; it only reads them.

use crate::domain::foundation::{DomainError, TemplateId};
use crate::domain::interview::Template;
use async_trait::async_trait;

/// Read-only access to interview templates.
#[async_trait]
pub trait TemplateReader: Send + Sync {
    /// Find a template by ID.
    async fn find_by_id(&self, id: &TemplateId) -> Result<Option<Template>, DomainError>;
}
