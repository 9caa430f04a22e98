//! Analysis result models.
//!
//! Everything here is derived, never persisted: the engine re-mines the
//! completed-task history on demand and the application layer caches the
//! result for a bounded window.

use serde::{Deserialize, Serialize};

use crate::task::{ExecutionMode, GoalType};

/// Mined summary for one goal type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalAnalysis {
    pub goal_type: GoalType,
    pub task_count: usize,
    pub contacted: u64,
    pub converted: u64,
    /// Conversion rate in percent (0 when nothing was contacted).
    pub conversion_rate: f64,
    /// The historically best mode for this goal; `hybrid` when the goal has
    /// no completed tasks.
    pub best_execution_mode: ExecutionMode,
    /// Top roles by converting-task count, or the goal's static defaults
    /// when history shows fewer than 3 distinct roles.
    pub best_roles: Vec<String>,
}

/// Success statistics for one hour-of-day bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourStat {
    /// Hour of day, 0-23, from the task's creation time.
    pub hour: u32,
    pub task_count: usize,
    /// Share of tasks in this hour with at least one conversion, 0.0-1.0.
    pub success_rate: f64,
}

/// One (goal, mode, role set) configuration group with enough samples to
/// rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigGroup {
    pub goal_type: GoalType,
    pub execution_mode: ExecutionMode,
    /// Sorted role identifiers forming the group key.
    pub roles: Vec<String>,
    pub task_count: usize,
    pub contacted: u64,
    pub converted: u64,
    pub conversion_rate: f64,
}

/// The full mined summary consumed by recommendation generation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAnalysis {
    /// Number of completed tasks the analysis ran over.
    pub completed_count: usize,
    /// Global conversion rate in percent over all completed tasks.
    pub avg_conversion_rate: f64,
    /// Per-goal breakdown, one entry per goal type in enumeration order.
    pub goals: Vec<GoalAnalysis>,
    /// Top 3 hours of day by success rate, descending.
    pub best_hours: Vec<HourStat>,
    /// Top 5 configuration groups (>= 2 samples each) by conversion rate.
    pub top_configs: Vec<ConfigGroup>,
}

/// Category of a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Goal,
    Mode,
    Roles,
    Audience,
    Timing,
}

/// A ranked, confidence-scored suggestion surfaced to the caller.
///
/// `confidence` is a heuristic ordering hint reflecting historical sample
/// size, not statistical significance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub title: String,
    pub description: String,
    pub reason: String,
    /// 0-100, always clamped.
    pub confidence: u8,
    /// Opaque payload the caller may act on (concrete config to apply).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<serde_json::Value>,
}
