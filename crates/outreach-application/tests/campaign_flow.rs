//! End-to-end flow over the application services: create campaigns, drive
//! the lifecycle, reconcile backend events, and mine recommendations.

use std::sync::Arc;

use outreach_application::{AnalysisService, BatchOperation, TaskStore, TemplateRegistry};
use outreach_core::analysis::RecommendationKind;
use outreach_core::backend::BackendEvent;
use outreach_core::task::{
    ExecutionMode, GoalType, StatsDelta, TaskAction, TaskDraft, TaskStatus,
};
use outreach_core::template::TemplateDraft;
use outreach_infrastructure::InMemoryChannel;

fn draft(name: &str, goal: GoalType, mode: ExecutionMode) -> TaskDraft {
    TaskDraft {
        name: name.to_string(),
        goal_type: goal,
        execution_mode: mode,
        role_config: vec!["expert".to_string()],
        ..Default::default()
    }
}

async fn run_to_completion(
    store: &TaskStore,
    name: &str,
    goal: GoalType,
    mode: ExecutionMode,
    contacted: i64,
    converted: i64,
) -> String {
    let task = store.create(draft(name, goal, mode)).await.unwrap();
    store
        .apply_transition(&task.id, TaskAction::Start)
        .await
        .unwrap();
    store
        .apply_stats_delta(
            &task.id,
            StatsDelta {
                contacted,
                converted,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    store
        .apply_transition(&task.id, TaskAction::Complete)
        .await
        .unwrap();
    task.id
}

#[tokio::test]
async fn full_campaign_flow_produces_recommendations() {
    let channel = Arc::new(InMemoryChannel::new());
    let store = TaskStore::new(channel.clone());

    // build up history: hybrid conversion clearly outperforms scripted
    run_to_completion(&store, "A", GoalType::Conversion, ExecutionMode::Hybrid, 100, 30).await;
    run_to_completion(&store, "B", GoalType::Conversion, ExecutionMode::Hybrid, 100, 28).await;
    run_to_completion(&store, "C", GoalType::Conversion, ExecutionMode::Scripted, 50, 5).await;
    run_to_completion(&store, "D", GoalType::Retention, ExecutionMode::Scripted, 80, 4).await;

    let completed = store.completed_tasks().await;
    assert_eq!(completed.len(), 4);

    let service = AnalysisService::new();
    let analysis = service.analysis(&completed).await;

    let conversion = analysis
        .goals
        .iter()
        .find(|g| g.goal_type == GoalType::Conversion)
        .unwrap();
    assert_eq!(conversion.task_count, 3);
    assert_eq!(conversion.best_execution_mode, ExecutionMode::Hybrid);

    let recs = service.recommendations(&completed).await;
    assert!(recs.len() >= 2);
    assert!(recs.iter().any(|r| r.kind == RecommendationKind::Timing));
    assert!(recs.iter().all(|r| r.confidence <= 100));
}

#[tokio::test]
async fn reconciliation_overwrites_optimistic_state() {
    let channel = Arc::new(InMemoryChannel::new());
    let store = TaskStore::new(channel.clone());

    let task = store
        .create(draft("A", GoalType::Conversion, ExecutionMode::Hybrid))
        .await
        .unwrap();
    assert!(!store.get(&task.id).await.unwrap().confirmed);

    // the backend confirms with its authoritative copy
    let mut authoritative = task.clone();
    authoritative.stats.total_contacts = 500;
    store
        .handle_event(BackendEvent::TaskCreated {
            success: true,
            task: authoritative,
            request_id: None,
        })
        .await;

    let confirmed = store.get(&task.id).await.unwrap();
    assert!(confirmed.confirmed);
    assert_eq!(confirmed.stats.total_contacts, 500);
}

#[tokio::test]
async fn batch_over_mixed_ids_is_best_effort() {
    let channel = Arc::new(InMemoryChannel::new());
    let store = TaskStore::new(channel.clone());

    let a = store
        .create(draft("A", GoalType::Conversion, ExecutionMode::Hybrid))
        .await
        .unwrap();
    let b = store
        .create(draft("B", GoalType::Retention, ExecutionMode::Scripted))
        .await
        .unwrap();
    store.delete(&b.id).await.unwrap();

    let outcomes = store
        .batch(&[a.id.clone(), b.id.clone()], BatchOperation::Start)
        .await;
    assert!(outcomes[0].result.is_ok());
    assert!(outcomes[1].result.is_err());
    assert_eq!(store.get(&a.id).await.unwrap().status, TaskStatus::Running);
}

#[tokio::test]
async fn templates_feed_campaign_creation() {
    let registry = TemplateRegistry::new(None).unwrap();
    let template = registry
        .create(TemplateDraft {
            name: "Q2 conversion push".to_string(),
            description: "High-intent push".to_string(),
            goal_type: GoalType::Conversion,
            execution_mode: ExecutionMode::Hybrid,
            audience_source: Some("crm-export".to_string()),
            intent_score_min: 80,
            roles: vec!["expert".to_string(), "closer".to_string()],
        })
        .await
        .unwrap();

    let channel = Arc::new(InMemoryChannel::new());
    let store = TaskStore::new(channel);

    let task = store
        .create(TaskDraft {
            name: template.name.clone(),
            goal_type: template.goal_type,
            execution_mode: template.execution_mode,
            role_config: template.roles.clone(),
            ..Default::default()
        })
        .await
        .unwrap();
    registry.record_usage(&template.id).await.unwrap();

    assert_eq!(task.goal_type, GoalType::Conversion);
    assert_eq!(registry.get(&template.id).await.unwrap().usage_count, 1);
}
