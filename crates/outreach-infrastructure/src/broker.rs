//! Correlation-id request/response over the backend channel.
//!
//! Fire-and-forget requests go straight through the channel; calls that
//! expect a single authoritative reply register a pending oneshot keyed by
//! a generated correlation id, await exactly one matching inbound event,
//! and resolve to a timeout failure when none arrives within the request
//! class's bound. The pending entry is removed on every exit path so
//! repeated calls never leak listeners.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;
use uuid::Uuid;

use outreach_core::backend::{BackendChannel, BackendEvent, BackendRequest};
use outreach_core::{OutreachError, Result};

type PendingTable = Arc<Mutex<HashMap<String, oneshot::Sender<BackendEvent>>>>;

/// Matches inbound events to in-flight requests by correlation id.
pub struct RequestBroker {
    channel: Arc<dyn BackendChannel>,
    pending: PendingTable,
}

impl RequestBroker {
    pub fn new(channel: Arc<dyn BackendChannel>) -> Self {
        Self {
            channel,
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of in-flight request/response calls.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().expect("pending table poisoned").len()
    }

    /// Routes an inbound event.
    ///
    /// Events carrying a known correlation id resolve their pending call
    /// and are consumed (returns `None`); everything else is handed back
    /// to the caller for store reconciliation.
    pub fn handle_event(&self, event: BackendEvent) -> Option<BackendEvent> {
        if let Some(request_id) = event.request_id() {
            let sender = self
                .pending
                .lock()
                .expect("pending table poisoned")
                .remove(request_id);
            if let Some(sender) = sender {
                // receiver may have timed out and dropped; nothing to do
                let _ = sender.send(event);
                return None;
            }
        }
        Some(event)
    }

    /// Creates a task and awaits the backend's confirmed record.
    ///
    /// Unlike the store's optimistic path this resolves only once the
    /// backend answers, with the creation-class 10s bound.
    pub async fn create_task(
        &self,
        task: outreach_core::task::CampaignTask,
    ) -> Result<outreach_core::task::CampaignTask> {
        let request_id = Uuid::new_v4().to_string();
        let event = self
            .request(
                BackendRequest::CreateTask {
                    task,
                    request_id: Some(request_id.clone()),
                },
                &request_id,
            )
            .await?;
        match event {
            BackendEvent::TaskCreated { success: true, task, .. } => Ok(task),
            BackendEvent::TaskCreated { success: false, task, .. } => {
                Err(OutreachError::internal(format!(
                    "backend refused create-task for '{}'",
                    task.id
                )))
            }
            other => Err(OutreachError::internal(format!(
                "unexpected reply to create-task: {:?}",
                other
            ))),
        }
    }

    /// Requests the full task list. Resolves to a timeout failure after 5s.
    pub async fn get_tasks(&self) -> Result<Vec<outreach_core::task::CampaignTask>> {
        let request_id = Uuid::new_v4().to_string();
        let event = self
            .request(
                BackendRequest::GetTasks {
                    request_id: request_id.clone(),
                },
                &request_id,
            )
            .await?;
        match event {
            BackendEvent::TasksLoaded { success: true, tasks, .. } => Ok(tasks),
            BackendEvent::TasksLoaded { success: false, .. } => {
                Err(OutreachError::internal("backend refused get-tasks"))
            }
            other => Err(OutreachError::internal(format!(
                "unexpected reply to get-tasks: {:?}",
                other
            ))),
        }
    }

    /// Requests a single task's stats delta. Resolves to a timeout failure
    /// after 5s.
    pub async fn get_task_stats(
        &self,
        task_id: &str,
    ) -> Result<outreach_core::task::StatsDelta> {
        let request_id = Uuid::new_v4().to_string();
        let event = self
            .request(
                BackendRequest::GetTaskStats {
                    request_id: request_id.clone(),
                    id: task_id.to_string(),
                },
                &request_id,
            )
            .await?;
        match event {
            BackendEvent::TaskStats { delta, .. } => Ok(delta),
            other => Err(OutreachError::internal(format!(
                "unexpected reply to get-task-stats: {:?}",
                other
            ))),
        }
    }

    /// Sends a correlated request and awaits its single matching event.
    async fn request(&self, request: BackendRequest, request_id: &str) -> Result<BackendEvent> {
        let class = request.class();
        let label = request.label();
        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .expect("pending table poisoned")
            .insert(request_id.to_string(), tx);

        if let Err(err) = self.channel.send(request).await {
            self.remove_pending(request_id);
            return Err(err);
        }

        match tokio::time::timeout(class.timeout(), rx).await {
            Ok(Ok(event)) => Ok(event),
            Ok(Err(_)) => {
                self.remove_pending(request_id);
                Err(OutreachError::internal("backend channel closed"))
            }
            Err(_) => {
                tracing::warn!("request timed out: {} ({})", label, request_id);
                self.remove_pending(request_id);
                Err(OutreachError::timeout(label))
            }
        }
    }

    fn remove_pending(&self, request_id: &str) {
        self.pending
            .lock()
            .expect("pending table poisoned")
            .remove(request_id);
    }
}
