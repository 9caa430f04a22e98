//! Cached historical analysis.
//!
//! Re-mining the full task history on every interaction is wasteful, so
//! analysis results are held for a bounded wall-clock window. Any caller
//! inside that window gets the cached result without recomputation;
//! `invalidate` forces a fresh pass, used after bulk reloads.

use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use outreach_core::analysis::{self, Recommendation, TaskAnalysis};
use outreach_core::task::CampaignTask;

/// How long a computed analysis stays fresh.
const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

struct CachedAnalysis {
    computed_at: Instant,
    analysis: TaskAnalysis,
    recommendations: Vec<Recommendation>,
}

/// Serves analysis and recommendations with a time-bounded cache.
pub struct AnalysisService {
    cache: RwLock<Option<CachedAnalysis>>,
    ttl: Duration,
}

impl AnalysisService {
    pub fn new() -> Self {
        Self::with_ttl(CACHE_TTL)
    }

    /// A service with a custom freshness window.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            cache: RwLock::new(None),
            ttl,
        }
    }

    /// The analysis summary over `tasks`, cached for the freshness window.
    pub async fn analysis(&self, tasks: &[CampaignTask]) -> TaskAnalysis {
        self.cached(tasks).await.0
    }

    /// Ranked recommendations over `tasks`, cached alongside the analysis.
    pub async fn recommendations(&self, tasks: &[CampaignTask]) -> Vec<Recommendation> {
        self.cached(tasks).await.1
    }

    /// Drops the cache so the next call recomputes.
    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }

    async fn cached(&self, tasks: &[CampaignTask]) -> (TaskAnalysis, Vec<Recommendation>) {
        {
            let cache = self.cache.read().await;
            if let Some(entry) = cache.as_ref() {
                if entry.computed_at.elapsed() < self.ttl {
                    return (entry.analysis.clone(), entry.recommendations.clone());
                }
            }
        }

        let analysis = analysis::analyze(tasks);
        let recommendations = analysis::recommendations(&analysis);
        tracing::debug!(
            "analysis recomputed over {} completed tasks",
            analysis.completed_count
        );

        let mut cache = self.cache.write().await;
        *cache = Some(CachedAnalysis {
            computed_at: Instant::now(),
            analysis: analysis.clone(),
            recommendations: recommendations.clone(),
        });
        (analysis, recommendations)
    }
}

impl Default for AnalysisService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outreach_core::task::{ExecutionMode, GoalType, TaskStatus};

    fn completed(contacted: u64, converted: u64) -> CampaignTask {
        let mut task = CampaignTask::new("t", GoalType::Conversion, ExecutionMode::Hybrid);
        task.status = TaskStatus::Completed;
        task.stats.contacted = contacted;
        task.stats.converted = converted;
        task
    }

    #[tokio::test]
    async fn test_serves_cached_result_within_window() {
        let service = AnalysisService::new();

        let first = service.analysis(&[completed(10, 1)]).await;
        assert_eq!(first.completed_count, 1);

        // different input, same window: the cached result wins
        let second = service
            .analysis(&[completed(10, 1), completed(10, 2)])
            .await;
        assert_eq!(second.completed_count, 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_recompute() {
        let service = AnalysisService::new();
        let _ = service.analysis(&[completed(10, 1)]).await;

        service.invalidate().await;
        let fresh = service
            .analysis(&[completed(10, 1), completed(10, 2)])
            .await;
        assert_eq!(fresh.completed_count, 2);
    }

    #[tokio::test]
    async fn test_expired_window_recomputes() {
        let service = AnalysisService::with_ttl(Duration::ZERO);
        let _ = service.analysis(&[completed(10, 1)]).await;

        let fresh = service
            .analysis(&[completed(10, 1), completed(10, 2)])
            .await;
        assert_eq!(fresh.completed_count, 2);
    }

    #[tokio::test]
    async fn test_cold_start_recommendation_cached() {
        let service = AnalysisService::new();
        let recs = service.recommendations(&[completed(10, 1)]).await;
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].confidence, 80);
    }
}
