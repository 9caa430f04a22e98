//! Statistics aggregation over a task snapshot.

use chrono::{Days, NaiveDate};

use super::model::{DailyStats, GoalBucket, OverallStats, StatsSummary};
use crate::task::{CampaignTask, GoalType};

/// Rounded integer percentage with a guarded denominator.
///
/// Total over malformed data: `converted > contacted` simply yields a value
/// above 100 before clamping, never a panic.
pub fn percent(converted: u64, contacted: u64) -> u32 {
    if contacted == 0 {
        return 0;
    }
    let rate = (converted as f64 / contacted as f64 * 100.0).round();
    (rate as u32).min(100)
}

fn summarize<'a>(tasks: impl Iterator<Item = &'a CampaignTask>) -> StatsSummary {
    let mut summary = StatsSummary::default();
    for task in tasks {
        summary.contacted += task.stats.contacted;
        summary.converted += task.stats.converted;
        summary.messages_sent += task.stats.messages_sent;
        summary.ai_cost += task.stats.ai_cost;
    }
    summary
}

/// Sums counters over tasks created or started on the caller's current
/// local calendar day.
pub fn today_stats(tasks: &[CampaignTask], today: NaiveDate) -> StatsSummary {
    summarize(tasks.iter().filter(|task| {
        task.created_at.date_naive() == today
            || task
                .started_at
                .map(|started| started.date_naive() == today)
                .unwrap_or(false)
    }))
}

/// Whole-history sums plus the guarded conversion rate.
pub fn overall_stats(tasks: &[CampaignTask]) -> OverallStats {
    let summary = summarize(tasks.iter());
    OverallStats {
        total_tasks: tasks.len(),
        active_tasks: tasks.iter().filter(|t| t.is_active()).count(),
        completed_tasks: tasks
            .iter()
            .filter(|t| t.status == crate::task::TaskStatus::Completed)
            .count(),
        contacted: summary.contacted,
        converted: summary.converted,
        messages_sent: summary.messages_sent,
        ai_cost: summary.ai_cost,
        conversion_rate: percent(summary.converted, summary.contacted),
    }
}

/// Partitions all tasks into the four goal buckets, in enumeration order.
///
/// Every bucket is present even when empty.
pub fn by_goal(tasks: &[CampaignTask]) -> Vec<GoalBucket> {
    GoalType::ALL
        .iter()
        .map(|&goal_type| {
            let bucket: Vec<CampaignTask> = tasks
                .iter()
                .filter(|t| t.goal_type == goal_type)
                .cloned()
                .collect();
            let contacted = bucket.iter().map(|t| t.stats.contacted).sum();
            let converted = bucket.iter().map(|t| t.stats.converted).sum();
            GoalBucket {
                goal_type,
                tasks: bucket,
                contacted,
                converted,
            }
        })
        .collect()
}

/// The last `days` date buckets ending at `today`, oldest first.
///
/// A task lands in the bucket matching its `created_at` date. Dates with no
/// tasks report all zeros; the series always has exactly `days` entries.
pub fn daily_series(tasks: &[CampaignTask], days: usize, today: NaiveDate) -> Vec<DailyStats> {
    (0..days)
        .rev()
        .map(|offset| {
            let date = today
                .checked_sub_days(Days::new(offset as u64))
                .unwrap_or(today);
            let mut bucket = DailyStats::empty(date);
            for task in tasks.iter().filter(|t| t.created_at.date_naive() == date) {
                bucket.contacted += task.stats.contacted;
                bucket.converted += task.stats.converted;
                bucket.messages_sent += task.stats.messages_sent;
                bucket.ai_cost += task.stats.ai_cost;
            }
            bucket
        })
        .collect()
}
