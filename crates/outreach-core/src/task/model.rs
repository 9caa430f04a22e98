//! Campaign task domain model.
//!
//! This module contains the core entities representing a marketing campaign
//! ("task") as it moves through the orchestration layer: the task record
//! itself, its embedded outcome statistics, and the value objects used to
//! create and patch records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{OutreachError, Result};

/// The business objective a campaign task is driving toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    /// Turn contacts into customers.
    Conversion,
    /// Keep existing customers engaged with the product.
    Retention,
    /// Grow interaction volume without a direct sales target.
    Engagement,
    /// Reactive help and troubleshooting outreach.
    Support,
}

impl GoalType {
    /// All goal types, in canonical enumeration order.
    pub const ALL: [GoalType; 4] = [
        GoalType::Conversion,
        GoalType::Retention,
        GoalType::Engagement,
        GoalType::Support,
    ];

    /// The wire/display label for this goal.
    pub fn label(&self) -> &'static str {
        match self {
            GoalType::Conversion => "conversion",
            GoalType::Retention => "retention",
            GoalType::Engagement => "engagement",
            GoalType::Support => "support",
        }
    }

    /// Static role suggestions used when history is too thin to mine.
    pub fn default_roles(&self) -> &'static [&'static str] {
        match self {
            GoalType::Conversion => &["expert", "closer", "support"],
            GoalType::Retention => &["advisor", "support", "expert"],
            GoalType::Engagement => &["host", "storyteller", "support"],
            GoalType::Support => &["support", "expert", "advisor"],
        }
    }
}

impl std::fmt::Display for GoalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Default for GoalType {
    fn default() -> Self {
        GoalType::Conversion
    }
}

/// How rigidly a task follows a predefined script.
///
/// Enumeration order doubles as the tie-break order when historical
/// analysis finds two modes with equal conversion rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Fixed message flow, no adaptation.
    Scripted,
    /// Fixed flow with adaptive follow-ups.
    #[default]
    Hybrid,
    /// Fully adaptive conversation.
    Scriptless,
}

impl ExecutionMode {
    /// All execution modes, in tie-break order.
    pub const ALL: [ExecutionMode; 3] = [
        ExecutionMode::Scripted,
        ExecutionMode::Hybrid,
        ExecutionMode::Scriptless,
    ];

    /// The wire/display label for this mode.
    pub fn label(&self) -> &'static str {
        match self {
            ExecutionMode::Scripted => "scripted",
            ExecutionMode::Hybrid => "hybrid",
            ExecutionMode::Scriptless => "scriptless",
        }
    }
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Represents the current lifecycle state of a campaign task.
///
/// Tasks progress through these states as they are scheduled and executed;
/// the legal moves between them live in [`crate::task::lifecycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Created but not yet scheduled or started.
    Draft,
    /// Waiting for its scheduled start to fire.
    Scheduled,
    /// Currently executing against its audience.
    Running,
    /// Execution suspended, resumable.
    Paused,
    /// Finished successfully. Terminal.
    Completed,
    /// Aborted with an error. Terminal.
    Failed,
}

impl TaskStatus {
    /// Returns true for states no transition may ever leave.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    /// Returns true for states counted as "active" in derived views.
    pub fn is_active(&self) -> bool {
        matches!(self, TaskStatus::Running | TaskStatus::Scheduled)
    }

    /// The wire/display label for this status.
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Draft => "draft",
            TaskStatus::Scheduled => "scheduled",
            TaskStatus::Running => "running",
            TaskStatus::Paused => "paused",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Cumulative outcome counters for one task.
///
/// The ordering `contacted <= total_contacts`, `replied <= contacted`,
/// `converted <= replied` is a soft expectation only: upstream data may
/// violate it, and every consumer must stay total over violating values.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total_contacts: u64,
    pub contacted: u64,
    pub replied: u64,
    pub converted: u64,
    pub messages_sent: u64,
    /// Spend in currency units.
    pub ai_cost: f64,
}

impl TaskStats {
    /// Additively merges a validated backend delta into the counters.
    ///
    /// Counters never decrease; callers must run [`StatsDelta::validate`]
    /// before merging.
    pub fn merge_delta(&mut self, delta: &StatsDelta) {
        self.total_contacts += delta.total_contacts.max(0) as u64;
        self.contacted += delta.contacted.max(0) as u64;
        self.replied += delta.replied.max(0) as u64;
        self.converted += delta.converted.max(0) as u64;
        self.messages_sent += delta.messages_sent.max(0) as u64;
        self.ai_cost += delta.ai_cost.max(0.0);
    }
}

/// An incremental stats update as reported by the execution backend.
///
/// Fields are signed on the wire; negative components are rejected at the
/// boundary because stats counters never decrease.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDelta {
    #[serde(default)]
    pub total_contacts: i64,
    #[serde(default)]
    pub contacted: i64,
    #[serde(default)]
    pub replied: i64,
    #[serde(default)]
    pub converted: i64,
    #[serde(default)]
    pub messages_sent: i64,
    #[serde(default)]
    pub ai_cost: f64,
}

impl StatsDelta {
    /// Rejects deltas with any negative component.
    pub fn validate(&self) -> Result<()> {
        let negative = self.total_contacts < 0
            || self.contacted < 0
            || self.replied < 0
            || self.converted < 0
            || self.messages_sent < 0
            || self.ai_cost < 0.0;
        if negative {
            return Err(OutreachError::invalid_input(
                "stats delta components must be non-negative",
            ));
        }
        Ok(())
    }
}

/// The audience filter attached to a task.
///
/// Opaque to the core beyond being carried through; used by callers to
/// estimate audience size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetCriteria {
    /// Minimum intent score (0-100) a contact must have.
    pub intent_score_min: u8,
    /// Tag identifying where the audience list comes from.
    #[serde(default)]
    pub audience_source: Option<String>,
}

impl Default for TargetCriteria {
    fn default() -> Self {
        Self {
            intent_score_min: 70,
            audience_source: None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// A marketing campaign task record.
///
/// Owned exclusively by the task store; `stats` is embedded 1:1 and is only
/// ever mutated through confirmed backend updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignTask {
    /// Opaque unique identifier, immutable after creation.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub goal_type: GoalType,
    pub execution_mode: ExecutionMode,
    pub status: TaskStatus,
    #[serde(default)]
    pub target_criteria: TargetCriteria,
    /// Ordered role identifiers assigned to this task.
    #[serde(default)]
    pub role_config: Vec<String>,
    #[serde(default)]
    pub stats: TaskStats,
    /// False while a local optimistic edit awaits backend confirmation.
    #[serde(default = "default_true")]
    pub confirmed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl CampaignTask {
    /// Creates a new draft task with a fresh id and zeroed stats.
    pub fn new(
        name: impl Into<String>,
        goal_type: GoalType,
        execution_mode: ExecutionMode,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: String::new(),
            goal_type,
            execution_mode,
            status: TaskStatus::Draft,
            target_criteria: TargetCriteria::default(),
            role_config: Vec::new(),
            stats: TaskStats::default(),
            confirmed: true,
            created_at: now,
            started_at: None,
            completed_at: None,
            updated_at: now,
        }
    }

    /// Returns true when the task counts toward the active view.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Creates an unstarted copy with a fresh id and zeroed stats.
    pub fn duplicate(&self) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: format!("{} (copy)", self.name),
            description: self.description.clone(),
            goal_type: self.goal_type,
            execution_mode: self.execution_mode,
            status: TaskStatus::Draft,
            target_criteria: self.target_criteria.clone(),
            role_config: self.role_config.clone(),
            stats: TaskStats::default(),
            confirmed: false,
            created_at: now,
            started_at: None,
            completed_at: None,
            updated_at: now,
        }
    }
}

/// The caller-supplied fields for creating a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub goal_type: GoalType,
    #[serde(default)]
    pub execution_mode: ExecutionMode,
    #[serde(default)]
    pub target_criteria: TargetCriteria,
    #[serde(default)]
    pub role_config: Vec<String>,
    /// When true the task skips `draft` and starts immediately.
    #[serde(default)]
    pub start_immediately: bool,
}

/// A partial update to a task record.
///
/// `status` is deliberately absent: status only moves through the lifecycle
/// controller, never by direct field merge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub goal_type: Option<GoalType>,
    #[serde(default)]
    pub execution_mode: Option<ExecutionMode>,
    #[serde(default)]
    pub target_criteria: Option<TargetCriteria>,
    #[serde(default)]
    pub role_config: Option<Vec<String>>,
}

impl TaskPatch {
    /// Merges the populated fields into `task`, refreshing `updated_at`.
    pub fn apply(&self, task: &mut CampaignTask) {
        if let Some(name) = &self.name {
            task.name = name.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(goal_type) = self.goal_type {
            task.goal_type = goal_type;
        }
        if let Some(execution_mode) = self.execution_mode {
            task.execution_mode = execution_mode;
        }
        if let Some(target_criteria) = &self.target_criteria {
            task.target_criteria = target_criteria.clone();
        }
        if let Some(role_config) = &self.role_config {
            task.role_config = role_config.clone();
        }
        task.updated_at = Utc::now();
    }

    /// Returns true when no field is populated.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.goal_type.is_none()
            && self.execution_mode.is_none()
            && self.target_criteria.is_none()
            && self.role_config.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_defaults() {
        let task = CampaignTask::new("Launch push", GoalType::Conversion, ExecutionMode::Hybrid);

        assert!(!task.id.is_empty());
        assert_eq!(task.status, TaskStatus::Draft);
        assert_eq!(task.stats, TaskStats::default());
        assert!(task.started_at.is_none());
        assert!(task.completed_at.is_none());
        assert!(task.confirmed);
    }

    #[test]
    fn test_duplicate_resets_progress() {
        let mut task = CampaignTask::new("Launch push", GoalType::Conversion, ExecutionMode::Hybrid);
        task.status = TaskStatus::Completed;
        task.stats.contacted = 40;
        task.started_at = Some(Utc::now());
        task.role_config = vec!["expert".to_string()];

        let copy = task.duplicate();

        assert_ne!(copy.id, task.id);
        assert_eq!(copy.name, "Launch push (copy)");
        assert_eq!(copy.status, TaskStatus::Draft);
        assert_eq!(copy.stats, TaskStats::default());
        assert!(copy.started_at.is_none());
        assert_eq!(copy.role_config, task.role_config);
    }

    #[test]
    fn test_stats_delta_rejects_negative() {
        let delta = StatsDelta {
            contacted: -1,
            ..Default::default()
        };
        assert!(delta.validate().unwrap_err().is_invalid_input());

        let ok = StatsDelta {
            contacted: 5,
            converted: 1,
            ..Default::default()
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_merge_delta_accumulates() {
        let mut stats = TaskStats::default();
        let delta = StatsDelta {
            total_contacts: 10,
            contacted: 8,
            replied: 4,
            converted: 2,
            messages_sent: 20,
            ai_cost: 1.5,
        };

        stats.merge_delta(&delta);
        stats.merge_delta(&delta);

        assert_eq!(stats.contacted, 16);
        assert_eq!(stats.converted, 4);
        assert_eq!(stats.messages_sent, 40);
        assert!((stats.ai_cost - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_patch_does_not_touch_status() {
        let mut task = CampaignTask::new("A", GoalType::Retention, ExecutionMode::Scripted);
        task.status = TaskStatus::Running;

        let patch = TaskPatch {
            name: Some("B".to_string()),
            execution_mode: Some(ExecutionMode::Scriptless),
            ..Default::default()
        };
        patch.apply(&mut task);

        assert_eq!(task.name, "B");
        assert_eq!(task.execution_mode, ExecutionMode::Scriptless);
        assert_eq!(task.status, TaskStatus::Running);
    }

    #[test]
    fn test_serde_wire_labels() {
        let task = CampaignTask::new("A", GoalType::Engagement, ExecutionMode::Scriptless);
        let json = serde_json::to_value(&task).unwrap();

        assert_eq!(json["goalType"], "engagement");
        assert_eq!(json["executionMode"], "scriptless");
        assert_eq!(json["status"], "draft");
    }
}
