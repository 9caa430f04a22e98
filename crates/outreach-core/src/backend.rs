//! Wire contract with the external execution backend.
//!
//! The core never talks to a transport directly: it emits
//! [`BackendRequest`] values over an abstract [`BackendChannel`] and
//! consumes [`BackendEvent`] values pushed back by the transport.
//! Fire-and-forget requests carry no correlation id; request/response
//! calls carry a `request_id` that the broker matches against inbound
//! events.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::Result;
use crate::task::{CampaignTask, StatsDelta, TaskPatch};

/// Outbound messages to the execution backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BackendRequest {
    CreateTask {
        task: CampaignTask,
        /// Present when the caller awaits the backend's confirmation
        /// instead of creating optimistically.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
    UpdateTask {
        id: String,
        patch: TaskPatch,
        /// Full record after the optimistic local merge, for transitions
        /// the minimal contract has no dedicated request for.
        task: CampaignTask,
    },
    DeleteTask {
        id: String,
    },
    StartTask {
        id: String,
    },
    PauseTask {
        id: String,
    },
    ResumeTask {
        id: String,
    },
    CompleteTask {
        id: String,
    },
    GetTasks {
        request_id: String,
    },
    GetTaskStats {
        request_id: String,
        id: String,
    },
}

impl BackendRequest {
    /// The wire label of this request.
    pub fn label(&self) -> &'static str {
        match self {
            BackendRequest::CreateTask { .. } => "create-task",
            BackendRequest::UpdateTask { .. } => "update-task",
            BackendRequest::DeleteTask { .. } => "delete-task",
            BackendRequest::StartTask { .. } => "start-task",
            BackendRequest::PauseTask { .. } => "pause-task",
            BackendRequest::ResumeTask { .. } => "resume-task",
            BackendRequest::CompleteTask { .. } => "complete-task",
            BackendRequest::GetTasks { .. } => "get-tasks",
            BackendRequest::GetTaskStats { .. } => "get-task-stats",
        }
    }

    /// The correlation id, present only on request/response calls.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            BackendRequest::GetTasks { request_id }
            | BackendRequest::GetTaskStats { request_id, .. } => Some(request_id),
            BackendRequest::CreateTask { request_id, .. } => request_id.as_deref(),
            _ => None,
        }
    }

    /// Timeout class for request/response calls.
    pub fn class(&self) -> RequestClass {
        match self {
            BackendRequest::CreateTask { .. } => RequestClass::Create,
            _ => RequestClass::Read,
        }
    }
}

/// Timeout classes for request/response calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// Creation-class calls wait longer for the backend.
    Create,
    /// Read-class calls fail fast.
    Read,
}

impl RequestClass {
    /// The bounded wait before a request resolves to a timeout failure.
    pub fn timeout(&self) -> Duration {
        match self {
            RequestClass::Create => Duration::from_secs(10),
            RequestClass::Read => Duration::from_secs(5),
        }
    }
}

/// Inbound events pushed by the execution backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BackendEvent {
    TasksLoaded {
        success: bool,
        tasks: Vec<CampaignTask>,
        #[serde(default)]
        request_id: Option<String>,
    },
    TaskCreated {
        success: bool,
        task: CampaignTask,
        #[serde(default)]
        request_id: Option<String>,
    },
    TaskUpdated {
        success: bool,
        task: CampaignTask,
    },
    TaskStats {
        task_id: String,
        delta: StatsDelta,
        #[serde(default)]
        request_id: Option<String>,
    },
    TaskDeleted {
        success: bool,
        task_id: String,
    },
}

impl BackendEvent {
    /// The correlation id, when the event answers a pending request.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            BackendEvent::TasksLoaded { request_id, .. }
            | BackendEvent::TaskCreated { request_id, .. }
            | BackendEvent::TaskStats { request_id, .. } => request_id.as_deref(),
            _ => None,
        }
    }
}

/// An abstract bidirectional channel to the execution backend.
///
/// `send` is fire-and-forget: delivery failures surface as errors, but no
/// reply is awaited here. Request/response semantics live in the broker,
/// which correlates inbound events by `request_id`.
#[async_trait]
pub trait BackendChannel: Send + Sync {
    /// Dispatches a request to the backend.
    async fn send(&self, request: BackendRequest) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{ExecutionMode, GoalType};

    #[test]
    fn test_request_wire_labels() {
        let req = BackendRequest::StartTask {
            id: "t1".to_string(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["type"], "start-task");
        assert_eq!(req.label(), "start-task");
        assert!(req.request_id().is_none());
    }

    #[test]
    fn test_request_classes() {
        let create = BackendRequest::CreateTask {
            task: CampaignTask::new("t", GoalType::Conversion, ExecutionMode::Hybrid),
            request_id: Some("r0".to_string()),
        };
        let read = BackendRequest::GetTasks {
            request_id: "r1".to_string(),
        };
        assert_eq!(create.class().timeout(), Duration::from_secs(10));
        assert_eq!(read.class().timeout(), Duration::from_secs(5));
        assert_eq!(create.request_id(), Some("r0"));
        assert_eq!(read.request_id(), Some("r1"));
    }

    #[test]
    fn test_event_round_trip() {
        let event = BackendEvent::TaskStats {
            task_id: "t1".to_string(),
            delta: StatsDelta {
                contacted: 5,
                ..Default::default()
            },
            request_id: None,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"task-stats\""));

        let back: BackendEvent = serde_json::from_str(&json).unwrap();
        match back {
            BackendEvent::TaskStats { task_id, delta, .. } => {
                assert_eq!(task_id, "t1");
                assert_eq!(delta.contacted, 5);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
