//! The authoritative in-memory task collection.
//!
//! The store is the sole mutation gate for task records. State-changing
//! operations are optimistic: the local record is updated immediately and
//! tagged unconfirmed, a fire-and-forget request is dispatched to the
//! execution backend, and a later inbound event reconciles the record with
//! the authoritative version. Subscribers observe changes through a watch
//! channel carrying a monotonically increasing snapshot version.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{watch, RwLock};

use outreach_core::backend::{BackendChannel, BackendEvent, BackendRequest};
use outreach_core::task::{
    apply_action, CampaignTask, StatsDelta, TaskAction, TaskDraft, TaskPatch, TaskStatus,
};
use outreach_core::{OutreachError, Result};

/// Operations applicable to a batch of task ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOperation {
    Start,
    Pause,
    Resume,
    Complete,
    Delete,
    Duplicate,
}

/// Per-id result of a batch operation.
#[derive(Debug)]
pub struct BatchOutcome {
    pub id: String,
    pub result: Result<()>,
}

#[derive(Default)]
struct StoreState {
    tasks: HashMap<String, CampaignTask>,
    selection: HashSet<String>,
    /// Stats deltas that arrived for ids not yet known locally, held for
    /// the next full reload instead of being dropped.
    queued_deltas: HashMap<String, Vec<StatsDelta>>,
    version: u64,
}

/// Owns the task collection and mediates every mutation.
pub struct TaskStore {
    state: RwLock<StoreState>,
    backend: Arc<dyn BackendChannel>,
    version_tx: watch::Sender<u64>,
}

impl TaskStore {
    pub fn new(backend: Arc<dyn BackendChannel>) -> Self {
        let (version_tx, _) = watch::channel(0);
        Self {
            state: RwLock::new(StoreState::default()),
            backend,
            version_tx,
        }
    }

    /// Subscribes to snapshot-version bumps.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version_tx.subscribe()
    }

    fn bump(&self, state: &mut StoreState) {
        state.version += 1;
        // send_replace stores the version even with no live subscribers
        self.version_tx.send_replace(state.version);
    }

    async fn dispatch(&self, request: BackendRequest) {
        let label = request.label();
        if let Err(err) = self.backend.send(request).await {
            // fire-and-forget: local state stays optimistic, the next full
            // reload reconciles
            tracing::warn!("backend dispatch failed for {}: {}", label, err);
        }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub async fn get(&self, id: &str) -> Option<CampaignTask> {
        self.state.read().await.tasks.get(id).cloned()
    }

    /// All tasks, newest first.
    pub async fn list(&self) -> Vec<CampaignTask> {
        let state = self.state.read().await;
        let mut tasks: Vec<CampaignTask> = state.tasks.values().cloned().collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        tasks
    }

    /// Tasks with status running or scheduled.
    pub async fn active_tasks(&self) -> Vec<CampaignTask> {
        self.list().await.into_iter().filter(|t| t.is_active()).collect()
    }

    /// Tasks with status completed, the analysis input.
    pub async fn completed_tasks(&self) -> Vec<CampaignTask> {
        self.list()
            .await
            .into_iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.tasks.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.tasks.is_empty()
    }

    // ========================================================================
    // Selection set
    // ========================================================================

    pub async fn select(&self, id: &str) {
        let mut state = self.state.write().await;
        if state.tasks.contains_key(id) {
            state.selection.insert(id.to_string());
        }
    }

    pub async fn deselect(&self, id: &str) {
        self.state.write().await.selection.remove(id);
    }

    pub async fn clear_selection(&self) {
        self.state.write().await.selection.clear();
    }

    pub async fn selected_ids(&self) -> Vec<String> {
        let state = self.state.read().await;
        let mut ids: Vec<String> = state.selection.iter().cloned().collect();
        ids.sort();
        ids
    }

    // ========================================================================
    // Mutations (optimistic, fire-and-forget)
    // ========================================================================

    /// Creates a task from draft fields and dispatches `create-task`.
    ///
    /// The new record is `draft` unless the draft requests an immediate
    /// start, and stays unconfirmed until the backend echoes it back.
    pub async fn create(&self, draft: TaskDraft) -> Result<CampaignTask> {
        if draft.name.trim().is_empty() {
            return Err(OutreachError::invalid_input("task name must not be empty"));
        }

        let mut task = CampaignTask::new(draft.name, draft.goal_type, draft.execution_mode);
        task.description = draft.description;
        task.target_criteria = draft.target_criteria;
        task.role_config = draft.role_config;
        task.confirmed = false;
        if draft.start_immediately {
            apply_action(&mut task, TaskAction::Start)?;
        }

        {
            let mut state = self.state.write().await;
            state.tasks.insert(task.id.clone(), task.clone());
            self.bump(&mut state);
        }
        tracing::debug!("task created locally: {}", task.id);
        self.dispatch(BackendRequest::CreateTask {
            task: task.clone(),
            request_id: None,
        })
            .await;
        Ok(task)
    }

    /// Merges partial fields into a task and dispatches `update-task`.
    ///
    /// Status is never touched here; lifecycle moves go through
    /// [`TaskStore::apply_transition`].
    pub async fn update(&self, id: &str, patch: TaskPatch) -> Result<CampaignTask> {
        let updated = {
            let mut state = self.state.write().await;
            let task = state
                .tasks
                .get_mut(id)
                .ok_or_else(|| OutreachError::not_found("task", id))?;
            patch.apply(task);
            task.confirmed = false;
            let updated = task.clone();
            self.bump(&mut state);
            updated
        };

        self.dispatch(BackendRequest::UpdateTask {
            id: id.to_string(),
            patch,
            task: updated.clone(),
        })
        .await;
        Ok(updated)
    }

    /// Applies a lifecycle action and dispatches the matching request.
    pub async fn apply_transition(&self, id: &str, action: TaskAction) -> Result<CampaignTask> {
        let updated = {
            let mut state = self.state.write().await;
            let task = state
                .tasks
                .get_mut(id)
                .ok_or_else(|| OutreachError::not_found("task", id))?;
            apply_action(task, action)?;
            task.confirmed = false;
            let updated = task.clone();
            self.bump(&mut state);
            updated
        };
        tracing::debug!("task {}: {} -> {}", id, action, updated.status);

        let request = match action {
            TaskAction::Start => BackendRequest::StartTask {
                id: id.to_string(),
            },
            TaskAction::Resume => BackendRequest::ResumeTask {
                id: id.to_string(),
            },
            TaskAction::Pause => BackendRequest::PauseTask {
                id: id.to_string(),
            },
            TaskAction::Complete => BackendRequest::CompleteTask {
                id: id.to_string(),
            },
            // the minimal contract has no dedicated request for these
            TaskAction::Schedule | TaskAction::Unschedule | TaskAction::Fail => {
                BackendRequest::UpdateTask {
                    id: id.to_string(),
                    patch: TaskPatch::default(),
                    task: updated.clone(),
                }
            }
        };
        self.dispatch(request).await;
        Ok(updated)
    }

    /// Additively merges a backend-reported stats delta.
    ///
    /// A delta for an unknown id is queued for the next full reload rather
    /// than dropped; the update may have raced the initial load.
    pub async fn apply_stats_delta(&self, id: &str, delta: StatsDelta) -> Result<()> {
        delta.validate()?;

        let mut state = self.state.write().await;
        match state.tasks.get_mut(id) {
            Some(task) => {
                task.stats.merge_delta(&delta);
                task.updated_at = chrono::Utc::now();
                self.bump(&mut state);
            }
            None => {
                tracing::warn!("stats delta for unknown task {}, queueing", id);
                state
                    .queued_deltas
                    .entry(id.to_string())
                    .or_default()
                    .push(delta);
            }
        }
        Ok(())
    }

    /// Removes a task and clears it from the selection set. Idempotent.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let existed = {
            let mut state = self.state.write().await;
            let existed = state.tasks.remove(id).is_some();
            state.selection.remove(id);
            if existed {
                self.bump(&mut state);
            }
            existed
        };

        if existed {
            self.dispatch(BackendRequest::DeleteTask { id: id.to_string() })
                .await;
        }
        Ok(())
    }

    /// Creates an unstarted copy of a task and dispatches `create-task`.
    pub async fn duplicate(&self, id: &str) -> Result<CampaignTask> {
        let copy = {
            let mut state = self.state.write().await;
            let source = state
                .tasks
                .get(id)
                .ok_or_else(|| OutreachError::not_found("task", id))?;
            let copy = source.duplicate();
            state.tasks.insert(copy.id.clone(), copy.clone());
            self.bump(&mut state);
            copy
        };

        self.dispatch(BackendRequest::CreateTask {
            task: copy.clone(),
            request_id: None,
        })
            .await;
        Ok(copy)
    }

    /// Applies one operation to every id independently.
    ///
    /// Best-effort: a failure on one id never blocks the others, and the
    /// caller receives a per-id outcome instead of a transaction.
    pub async fn batch(&self, ids: &[String], operation: BatchOperation) -> Vec<BatchOutcome> {
        let mut outcomes = Vec::with_capacity(ids.len());
        for id in ids {
            let result = match operation {
                BatchOperation::Start => self
                    .apply_transition(id, TaskAction::Start)
                    .await
                    .map(|_| ()),
                BatchOperation::Pause => self
                    .apply_transition(id, TaskAction::Pause)
                    .await
                    .map(|_| ()),
                BatchOperation::Resume => self
                    .apply_transition(id, TaskAction::Resume)
                    .await
                    .map(|_| ()),
                BatchOperation::Complete => self
                    .apply_transition(id, TaskAction::Complete)
                    .await
                    .map(|_| ()),
                BatchOperation::Delete => self.delete(id).await,
                BatchOperation::Duplicate => self.duplicate(id).await.map(|_| ()),
            };
            if let Err(err) = &result {
                tracing::debug!("batch {:?} failed for {}: {}", operation, id, err);
            }
            outcomes.push(BatchOutcome {
                id: id.clone(),
                result,
            });
        }
        outcomes
    }

    // ========================================================================
    // Reconciliation
    // ========================================================================

    /// Applies an inbound backend event to local state.
    ///
    /// Confirmations overwrite optimistic records wholesale; events for
    /// locally deleted ids are no-ops.
    pub async fn handle_event(&self, event: BackendEvent) {
        match event {
            BackendEvent::TasksLoaded { success, tasks, .. } => {
                if !success {
                    tracing::warn!("backend reported failed task load");
                    return;
                }
                let mut guard = self.state.write().await;
                let state = &mut *guard;
                state.tasks = tasks
                    .into_iter()
                    .map(|mut task| {
                        task.confirmed = true;
                        (task.id.clone(), task)
                    })
                    .collect();
                // drain deltas that raced the load
                let queued = std::mem::take(&mut state.queued_deltas);
                for (id, deltas) in queued {
                    if let Some(task) = state.tasks.get_mut(&id) {
                        for delta in &deltas {
                            task.stats.merge_delta(delta);
                        }
                    }
                }
                let known = &state.tasks;
                state.selection.retain(|id| known.contains_key(id));
                self.bump(state);
            }
            BackendEvent::TaskCreated { success, task, .. }
            | BackendEvent::TaskUpdated { success, task } => {
                if !success {
                    tracing::warn!("backend rejected change for task {}", task.id);
                    return;
                }
                let mut state = self.state.write().await;
                let mut task = task;
                task.confirmed = true;
                state.tasks.insert(task.id.clone(), task);
                self.bump(&mut state);
            }
            BackendEvent::TaskStats { task_id, delta, .. } => {
                // validation failure on backend data is logged, not fatal
                if let Err(err) = self.apply_stats_delta(&task_id, delta).await {
                    tracing::warn!("ignoring malformed stats delta for {}: {}", task_id, err);
                }
            }
            BackendEvent::TaskDeleted { success, task_id } => {
                if !success {
                    return;
                }
                let mut state = self.state.write().await;
                state.tasks.remove(&task_id);
                state.selection.remove(&task_id);
                self.bump(&mut state);
            }
        }
    }
}
