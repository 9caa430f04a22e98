//! Template domain model.
//!
//! A template is a saved, reusable task configuration with cumulative
//! usage/outcome counters that enable success-rate ranking. System
//! templates ship built in and are immutable; user templates are created,
//! edited and deleted freely.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::stats::percent;
use crate::task::{ExecutionMode, GoalType};

/// A saved, reusable campaign configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub goal_type: GoalType,
    pub execution_mode: ExecutionMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience_source: Option<String>,
    pub intent_score_min: u8,
    #[serde(default)]
    pub roles: Vec<String>,
    /// Times the template was applied. Never decreases.
    #[serde(default)]
    pub usage_count: u64,
    /// Uses the caller judged successful. Never decreases.
    #[serde(default)]
    pub success_count: u64,
    #[serde(default)]
    pub total_contacted: u64,
    #[serde(default)]
    pub total_converted: u64,
    /// Built-in templates are immutable and non-deletable.
    #[serde(default)]
    pub is_system: bool,
    /// Sort-ordering toggle, no other semantic effect.
    #[serde(default)]
    pub is_favorite: bool,
}

impl Template {
    /// Rounded conversion percentage over all recorded uses, 0 when the
    /// template was never applied to any contacts.
    pub fn success_rate(&self) -> u32 {
        percent(self.total_converted, self.total_contacted)
    }

    /// Case-insensitive substring match against name and description.
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}

/// Caller-supplied fields for creating a user template.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub goal_type: GoalType,
    #[serde(default)]
    pub execution_mode: ExecutionMode,
    #[serde(default)]
    pub audience_source: Option<String>,
    #[serde(default = "default_intent_score_min")]
    pub intent_score_min: u8,
    #[serde(default)]
    pub roles: Vec<String>,
}

fn default_intent_score_min() -> u8 {
    70
}

impl TemplateDraft {
    /// Materializes a user template with a fresh id and zeroed counters.
    pub fn into_template(self) -> Template {
        Template {
            id: Uuid::new_v4().to_string(),
            name: self.name,
            description: self.description,
            goal_type: self.goal_type,
            execution_mode: self.execution_mode,
            audience_source: self.audience_source,
            intent_score_min: self.intent_score_min,
            roles: self.roles,
            usage_count: 0,
            success_count: 0,
            total_contacted: 0,
            total_converted: 0,
            is_system: false,
            is_favorite: false,
        }
    }
}

/// A partial update to a user template's configuration fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub goal_type: Option<GoalType>,
    #[serde(default)]
    pub execution_mode: Option<ExecutionMode>,
    #[serde(default)]
    pub audience_source: Option<Option<String>>,
    #[serde(default)]
    pub intent_score_min: Option<u8>,
    #[serde(default)]
    pub roles: Option<Vec<String>>,
}

impl TemplatePatch {
    /// Merges the populated fields into `template`.
    pub fn apply(&self, template: &mut Template) {
        if let Some(name) = &self.name {
            template.name = name.clone();
        }
        if let Some(description) = &self.description {
            template.description = description.clone();
        }
        if let Some(goal_type) = self.goal_type {
            template.goal_type = goal_type;
        }
        if let Some(execution_mode) = self.execution_mode {
            template.execution_mode = execution_mode;
        }
        if let Some(audience_source) = &self.audience_source {
            template.audience_source = audience_source.clone();
        }
        if let Some(intent_score_min) = self.intent_score_min {
            template.intent_score_min = intent_score_min;
        }
        if let Some(roles) = &self.roles {
            template.roles = roles.clone();
        }
    }
}

fn system_template(
    id: &str,
    name: &str,
    description: &str,
    goal_type: GoalType,
    execution_mode: ExecutionMode,
    roles: &[&str],
) -> Template {
    Template {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        goal_type,
        execution_mode,
        audience_source: None,
        intent_score_min: 70,
        roles: roles.iter().map(|r| r.to_string()).collect(),
        usage_count: 0,
        success_count: 0,
        total_contacted: 0,
        total_converted: 0,
        is_system: true,
        is_favorite: false,
    }
}

/// The built-in, non-deletable template set.
pub fn builtin_templates() -> Vec<Template> {
    vec![
        system_template(
            "sys-launch-push",
            "Product launch push",
            "High-intent conversion push for a new product or feature.",
            GoalType::Conversion,
            ExecutionMode::Hybrid,
            &["expert", "closer"],
        ),
        system_template(
            "sys-win-back",
            "Win-back",
            "Re-engage customers who have gone quiet.",
            GoalType::Retention,
            ExecutionMode::Scripted,
            &["advisor", "support"],
        ),
        system_template(
            "sys-community-warmup",
            "Community warm-up",
            "Low-pressure engagement round for a broad audience.",
            GoalType::Engagement,
            ExecutionMode::Scriptless,
            &["host", "storyteller"],
        ),
        system_template(
            "sys-onboarding-checkin",
            "Onboarding check-in",
            "Support follow-up for recently activated accounts.",
            GoalType::Support,
            ExecutionMode::Hybrid,
            &["support", "expert"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate_round_trip() {
        let mut template = builtin_templates().remove(0);
        template.total_contacted = 100;
        template.total_converted = 25;
        assert_eq!(template.success_rate(), 25);
    }

    #[test]
    fn test_success_rate_zero_contacts() {
        let template = builtin_templates().remove(0);
        assert_eq!(template.success_rate(), 0);
    }

    #[test]
    fn test_builtin_templates_are_system() {
        let builtins = builtin_templates();
        assert_eq!(builtins.len(), 4);
        assert!(builtins.iter().all(|t| t.is_system));

        let mut ids: Vec<&str> = builtins.iter().map(|t| t.id.as_str()).collect();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn test_matches_query_case_insensitive() {
        let template = builtin_templates().remove(1);
        assert!(template.matches_query("WIN"));
        assert!(template.matches_query("gone quiet"));
        assert!(!template.matches_query("conversion push"));
    }

    #[test]
    fn test_draft_into_template() {
        let draft = TemplateDraft {
            name: "Q2 push".to_string(),
            description: String::new(),
            goal_type: GoalType::Conversion,
            execution_mode: ExecutionMode::Scriptless,
            audience_source: Some("crm-export".to_string()),
            intent_score_min: 80,
            roles: vec!["expert".to_string()],
        };
        let template = draft.into_template();

        assert!(!template.is_system);
        assert_eq!(template.usage_count, 0);
        assert_eq!(template.intent_score_min, 80);
        assert!(!template.id.is_empty());
    }
}
