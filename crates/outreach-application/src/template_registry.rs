//! Template registry service.
//!
//! Owns the template collection: the built-in system set plus the user's
//! own templates. User templates persist through the settings store as a
//! serialized list; system templates are code, never persisted, and every
//! mutating operation on them is rejected.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use outreach_core::template::{builtin_templates, Template, TemplateDraft, TemplatePatch};
use outreach_core::{OutreachError, Result};
use outreach_infrastructure::SettingsStore;

/// Usage floor below which a template is never recommended.
const RECOMMEND_USAGE_FLOOR: u64 = 3;

/// Manages system and user templates with usage/outcome counters.
pub struct TemplateRegistry {
    templates: RwLock<HashMap<String, Template>>,
    store: Option<Arc<SettingsStore>>,
}

impl TemplateRegistry {
    /// Creates a registry seeded with the built-in set and, when a store is
    /// given, the persisted user templates.
    pub fn new(store: Option<Arc<SettingsStore>>) -> Result<Self> {
        let mut templates: HashMap<String, Template> = builtin_templates()
            .into_iter()
            .map(|t| (t.id.clone(), t))
            .collect();
        if let Some(store) = &store {
            for template in store.load_user_templates()? {
                templates.insert(template.id.clone(), template);
            }
        }
        Ok(Self {
            templates: RwLock::new(templates),
            store,
        })
    }

    async fn persist(&self, templates: &HashMap<String, Template>) -> Result<()> {
        if let Some(store) = &self.store {
            let mut user: Vec<Template> = templates
                .values()
                .filter(|t| !t.is_system)
                .cloned()
                .collect();
            user.sort_by(|a, b| a.name.cmp(&b.name));
            store.save_user_templates(&user)?;
        }
        Ok(())
    }

    /// All templates: favorites first, then by usage descending, then name.
    pub async fn list(&self) -> Vec<Template> {
        let templates = self.templates.read().await;
        let mut all: Vec<Template> = templates.values().cloned().collect();
        all.sort_by(|a, b| {
            b.is_favorite
                .cmp(&a.is_favorite)
                .then(b.usage_count.cmp(&a.usage_count))
                .then(a.name.cmp(&b.name))
        });
        all
    }

    pub async fn get(&self, id: &str) -> Option<Template> {
        self.templates.read().await.get(id).cloned()
    }

    /// Creates a user template.
    pub async fn create(&self, draft: TemplateDraft) -> Result<Template> {
        if draft.name.trim().is_empty() {
            return Err(OutreachError::invalid_input(
                "template name must not be empty",
            ));
        }
        let template = draft.into_template();
        let mut templates = self.templates.write().await;
        templates.insert(template.id.clone(), template.clone());
        self.persist(&templates).await?;
        tracing::debug!("template created: {}", template.id);
        Ok(template)
    }

    /// Updates a user template's configuration fields.
    pub async fn update(&self, id: &str, patch: TemplatePatch) -> Result<Template> {
        let mut templates = self.templates.write().await;
        let template = templates
            .get_mut(id)
            .ok_or_else(|| OutreachError::not_found("template", id))?;
        if template.is_system {
            return Err(OutreachError::SystemTemplate { id: id.to_string() });
        }
        patch.apply(template);
        let updated = template.clone();
        self.persist(&templates).await?;
        Ok(updated)
    }

    /// Deletes a user template.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let mut templates = self.templates.write().await;
        match templates.get(id) {
            None => return Err(OutreachError::not_found("template", id)),
            Some(t) if t.is_system => {
                return Err(OutreachError::SystemTemplate { id: id.to_string() })
            }
            Some(_) => {}
        }
        templates.remove(id);
        self.persist(&templates).await?;
        Ok(())
    }

    /// Flips the favorite flag on a user template.
    pub async fn toggle_favorite(&self, id: &str) -> Result<Template> {
        let mut templates = self.templates.write().await;
        let template = templates
            .get_mut(id)
            .ok_or_else(|| OutreachError::not_found("template", id))?;
        if template.is_system {
            return Err(OutreachError::SystemTemplate { id: id.to_string() });
        }
        template.is_favorite = !template.is_favorite;
        let updated = template.clone();
        self.persist(&templates).await?;
        Ok(updated)
    }

    /// Counts one application of the template.
    pub async fn record_usage(&self, id: &str) -> Result<()> {
        let mut templates = self.templates.write().await;
        let template = templates
            .get_mut(id)
            .ok_or_else(|| OutreachError::not_found("template", id))?;
        template.usage_count += 1;
        self.persist(&templates).await?;
        Ok(())
    }

    /// Adds one use's outcome to the running totals.
    pub async fn record_result(
        &self,
        id: &str,
        contacted: u64,
        converted: u64,
        success: bool,
    ) -> Result<()> {
        let mut templates = self.templates.write().await;
        let template = templates
            .get_mut(id)
            .ok_or_else(|| OutreachError::not_found("template", id))?;
        template.total_contacted += contacted;
        template.total_converted += converted;
        if success {
            template.success_count += 1;
        }
        self.persist(&templates).await?;
        Ok(())
    }

    /// Proven templates: usage >= 3, top 5 by success rate descending.
    pub async fn recommended_templates(&self) -> Vec<Template> {
        let templates = self.templates.read().await;
        let mut proven: Vec<Template> = templates
            .values()
            .filter(|t| t.usage_count >= RECOMMEND_USAGE_FLOOR)
            .cloned()
            .collect();
        proven.sort_by(|a, b| {
            b.success_rate()
                .cmp(&a.success_rate())
                .then(b.usage_count.cmp(&a.usage_count))
        });
        proven.truncate(5);
        proven
    }

    /// Case-insensitive substring search over name and description.
    pub async fn search(&self, query: &str) -> Vec<Template> {
        if query.trim().is_empty() {
            return self.list().await;
        }
        self.list()
            .await
            .into_iter()
            .filter(|t| t.matches_query(query))
            .collect()
    }
}
