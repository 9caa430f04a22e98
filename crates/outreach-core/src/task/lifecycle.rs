//! Task lifecycle state machine.
//!
//! Validates lifecycle moves against the legal transition graph and stamps
//! the lifecycle timestamps. This controller never talks to the execution
//! backend; it only validates and mutates local state, and the store's
//! reconciliation path makes the transition durable.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::model::{CampaignTask, TaskStatus};
use crate::error::{OutreachError, Result};

/// A lifecycle move requested on a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskAction {
    Start,
    Schedule,
    Unschedule,
    Pause,
    Resume,
    Complete,
    Fail,
}

impl TaskAction {
    /// The wire/display label for this action.
    pub fn label(&self) -> &'static str {
        match self {
            TaskAction::Start => "start",
            TaskAction::Schedule => "schedule",
            TaskAction::Unschedule => "unschedule",
            TaskAction::Pause => "pause",
            TaskAction::Resume => "resume",
            TaskAction::Complete => "complete",
            TaskAction::Fail => "fail",
        }
    }
}

impl std::fmt::Display for TaskAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Resolves the target status for a move, or `None` when the move is
/// illegal from the given state.
///
/// `Start` on a paused task acts as resume. Terminal states admit nothing.
fn target_status(from: TaskStatus, action: TaskAction) -> Option<TaskStatus> {
    use TaskAction::*;
    use TaskStatus::*;

    match (from, action) {
        (Draft, Start) => Some(Running),
        (Draft, Schedule) => Some(Scheduled),
        (Scheduled, Start) => Some(Running),
        (Scheduled, Unschedule) => Some(Draft),
        (Running, Pause) => Some(Paused),
        (Running, Complete) => Some(Completed),
        (Running, Fail) => Some(Failed),
        (Paused, Resume) | (Paused, Start) => Some(Running),
        (Paused, Complete) => Some(Completed),
        (Paused, Fail) => Some(Failed),
        _ => None,
    }
}

/// Applies a lifecycle action to a task.
///
/// On success the task's status and timestamps are updated and the new
/// status is returned. An illegal move returns
/// [`OutreachError::InvalidTransition`] and leaves the task untouched.
///
/// Timestamp rules:
/// - `started_at` is set only on the first entry into `running`; a resume
///   never overwrites it.
/// - `completed_at` is set unconditionally on entry into `completed`.
/// - `updated_at` is refreshed on every successful transition.
pub fn apply_action(task: &mut CampaignTask, action: TaskAction) -> Result<TaskStatus> {
    let next = target_status(task.status, action).ok_or(OutreachError::InvalidTransition {
        from: task.status,
        action,
    })?;

    let now = Utc::now();
    if next == TaskStatus::Running && task.started_at.is_none() {
        task.started_at = Some(now);
    }
    if next == TaskStatus::Completed {
        task.completed_at = Some(now);
    }
    task.status = next;
    task.updated_at = now;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::model::{ExecutionMode, GoalType};

    fn task() -> CampaignTask {
        CampaignTask::new("t", GoalType::Conversion, ExecutionMode::Hybrid)
    }

    #[test]
    fn test_full_lifecycle_scenario() {
        let mut t = task();
        assert_eq!(t.status, TaskStatus::Draft);

        apply_action(&mut t, TaskAction::Start).unwrap();
        assert_eq!(t.status, TaskStatus::Running);
        let first_start = t.started_at.expect("started_at set on first start");

        apply_action(&mut t, TaskAction::Pause).unwrap();
        assert_eq!(t.status, TaskStatus::Paused);

        // start on a paused task resumes and must not overwrite started_at
        apply_action(&mut t, TaskAction::Start).unwrap();
        assert_eq!(t.status, TaskStatus::Running);
        assert_eq!(t.started_at, Some(first_start));

        apply_action(&mut t, TaskAction::Complete).unwrap();
        assert_eq!(t.status, TaskStatus::Completed);
        assert!(t.completed_at.is_some());

        // terminal: pause is rejected and status stays completed
        let err = apply_action(&mut t, TaskAction::Pause).unwrap_err();
        assert!(err.is_invalid_transition());
        assert_eq!(t.status, TaskStatus::Completed);
    }

    #[test]
    fn test_schedule_and_unschedule() {
        let mut t = task();

        apply_action(&mut t, TaskAction::Schedule).unwrap();
        assert_eq!(t.status, TaskStatus::Scheduled);
        assert!(t.started_at.is_none());

        apply_action(&mut t, TaskAction::Unschedule).unwrap();
        assert_eq!(t.status, TaskStatus::Draft);

        apply_action(&mut t, TaskAction::Schedule).unwrap();
        apply_action(&mut t, TaskAction::Start).unwrap();
        assert_eq!(t.status, TaskStatus::Running);
        assert!(t.started_at.is_some());
    }

    #[test]
    fn test_illegal_moves_leave_state_unchanged() {
        let mut t = task();

        for action in [
            TaskAction::Pause,
            TaskAction::Resume,
            TaskAction::Complete,
            TaskAction::Fail,
            TaskAction::Unschedule,
        ] {
            let err = apply_action(&mut t, action).unwrap_err();
            assert!(err.is_invalid_transition());
            assert_eq!(t.status, TaskStatus::Draft);
            assert!(t.started_at.is_none());
            assert!(t.completed_at.is_none());
        }
    }

    #[test]
    fn test_failed_is_terminal() {
        let mut t = task();
        apply_action(&mut t, TaskAction::Start).unwrap();
        apply_action(&mut t, TaskAction::Fail).unwrap();
        assert_eq!(t.status, TaskStatus::Failed);

        for action in [
            TaskAction::Start,
            TaskAction::Schedule,
            TaskAction::Resume,
            TaskAction::Complete,
        ] {
            assert!(apply_action(&mut t, action).is_err());
            assert_eq!(t.status, TaskStatus::Failed);
        }
    }

    #[test]
    fn test_pause_resume_from_paused() {
        let mut t = task();
        apply_action(&mut t, TaskAction::Start).unwrap();
        apply_action(&mut t, TaskAction::Pause).unwrap();

        apply_action(&mut t, TaskAction::Resume).unwrap();
        assert_eq!(t.status, TaskStatus::Running);

        apply_action(&mut t, TaskAction::Pause).unwrap();
        apply_action(&mut t, TaskAction::Complete).unwrap();
        assert_eq!(t.status, TaskStatus::Completed);
    }
}
