//! Derived statistics view models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::task::{CampaignTask, GoalType};

/// Summed outcome counters over a set of tasks.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub contacted: u64,
    pub converted: u64,
    pub messages_sent: u64,
    pub ai_cost: f64,
}

/// Whole-history summary with the guarded conversion rate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub total_tasks: usize,
    pub active_tasks: usize,
    pub completed_tasks: usize,
    pub contacted: u64,
    pub converted: u64,
    pub messages_sent: u64,
    pub ai_cost: f64,
    /// Rounded integer percentage, 0 when nothing was contacted.
    pub conversion_rate: u32,
}

/// One goal partition, carrying its task list for downstream use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalBucket {
    pub goal_type: GoalType,
    pub tasks: Vec<CampaignTask>,
    pub contacted: u64,
    pub converted: u64,
}

/// One date bucket of the daily series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub date: NaiveDate,
    pub contacted: u64,
    pub converted: u64,
    pub messages_sent: u64,
    pub ai_cost: f64,
}

impl DailyStats {
    /// An all-zero bucket for a date with no tasks.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            contacted: 0,
            converted: 0,
            messages_sent: 0,
            ai_cost: 0.0,
        }
    }
}
