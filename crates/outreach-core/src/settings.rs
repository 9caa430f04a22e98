//! Persisted application settings.
//!
//! Every field carries a serde default so a partially written or missing
//! settings file still deserializes to the documented defaults.

use serde::{Deserialize, Serialize};

use crate::task::ExecutionMode;

fn default_intent_score_min() -> u8 {
    70
}

fn default_max_concurrent_tasks() -> usize {
    5
}

/// User-tunable configuration that survives process restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Whether AI responses are generated on hosted infrastructure.
    #[serde(default)]
    pub ai_hosting_enabled: bool,
    /// Default minimum intent score for new target criteria.
    #[serde(default = "default_intent_score_min")]
    pub intent_score_min: u8,
    /// Upper bound on simultaneously running tasks.
    #[serde(default = "default_max_concurrent_tasks")]
    pub max_concurrent_tasks: usize,
    /// Execution mode preselected for new tasks.
    #[serde(default)]
    pub preferred_mode: ExecutionMode,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            ai_hosting_enabled: false,
            intent_score_min: default_intent_score_min(),
            max_concurrent_tasks: default_max_concurrent_tasks(),
            preferred_mode: ExecutionMode::Hybrid,
        }
    }
}
