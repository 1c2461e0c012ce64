//! In-memory template store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, TemplateId};
use crate::domain::interview::Template;
use crate::ports::TemplateReader;

/// In-memory template storage, seeded by the caller.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTemplateReader {
    templates: Arc<RwLock<HashMap<TemplateId, Template>>>,
}

impl InMemoryTemplateReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a template.
    pub async fn put(&self, template: Template) {
        self.templates.write().await.insert(*template.id(), template);
    }
}

#[async_trait]
impl TemplateReader for InMemoryTemplateReader {
    async fn find_by_id(&self, id: &TemplateId) -> Result<Option<Template>, DomainError> {
        Ok(self.templates.read().await.get(id).cloned())
    }
}
