//! In-memory backend channel.
//!
//! A loopback transport: outbound requests are recorded for inspection and
//! inbound events are fanned out over a broadcast channel. The desktop
//! shell swaps this for its real inter-process transport; tests drive it
//! directly by injecting events.

use async_trait::async_trait;
use std::sync::Mutex;
use tokio::sync::broadcast;

use outreach_core::backend::{BackendChannel, BackendEvent, BackendRequest};
use outreach_core::Result;

const EVENT_BUFFER: usize = 64;

/// A loopback [`BackendChannel`] holding sent requests in memory.
pub struct InMemoryChannel {
    requests: Mutex<Vec<BackendRequest>>,
    events_tx: broadcast::Sender<BackendEvent>,
}

impl InMemoryChannel {
    pub fn new() -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            requests: Mutex::new(Vec::new()),
            events_tx,
        }
    }

    /// All requests sent so far, oldest first.
    pub fn sent_requests(&self) -> Vec<BackendRequest> {
        self.requests.lock().expect("request log poisoned").clone()
    }

    /// Wire labels of all requests sent so far.
    pub fn sent_labels(&self) -> Vec<&'static str> {
        self.sent_requests().iter().map(|r| r.label()).collect()
    }

    /// Clears the recorded request log.
    pub fn clear_requests(&self) {
        self.requests.lock().expect("request log poisoned").clear();
    }

    /// Injects an inbound event, as the backend process would.
    pub fn inject_event(&self, event: BackendEvent) {
        // no subscribers is fine; the event is simply dropped
        let _ = self.events_tx.send(event);
    }

    /// Subscribes to inbound events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<BackendEvent> {
        self.events_tx.subscribe()
    }
}

impl Default for InMemoryChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BackendChannel for InMemoryChannel {
    async fn send(&self, request: BackendRequest) -> Result<()> {
        tracing::debug!("channel send: {}", request.label());
        self.requests
            .lock()
            .expect("request log poisoned")
            .push(request);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_sent_requests() {
        let channel = InMemoryChannel::new();
        channel
            .send(BackendRequest::DeleteTask {
                id: "t1".to_string(),
            })
            .await
            .unwrap();
        channel
            .send(BackendRequest::GetTasks {
                request_id: "r1".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(channel.sent_labels(), vec!["delete-task", "get-tasks"]);

        channel.clear_requests();
        assert!(channel.sent_requests().is_empty());
    }

    #[tokio::test]
    async fn test_event_fan_out() {
        let channel = InMemoryChannel::new();
        let mut rx = channel.subscribe_events();

        channel.inject_event(BackendEvent::TaskDeleted {
            success: true,
            task_id: "t1".to_string(),
        });

        match rx.recv().await.unwrap() {
            BackendEvent::TaskDeleted { task_id, .. } => assert_eq!(task_id, "t1"),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
