//! Campaign task domain: model, lifecycle state machine.

pub mod lifecycle;
pub mod model;

pub use lifecycle::{apply_action, TaskAction};
pub use model::{
    CampaignTask, ExecutionMode, GoalType, StatsDelta, TargetCriteria, TaskDraft, TaskPatch,
    TaskStats, TaskStatus,
};
