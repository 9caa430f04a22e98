//! Historical analysis over completed tasks.
//!
//! The engine mines the user's own completed-task history only: per-goal
//! conversion breakdowns, best execution mode, role tallies, hour-of-day
//! success buckets and repeated configuration groups. It is a total
//! function over malformed-but-structurally-valid data; every rate guards
//! its denominator.

use std::collections::HashMap;

use chrono::Timelike;
use serde_json::json;

use super::model::{
    ConfigGroup, GoalAnalysis, HourStat, Recommendation, RecommendationKind, TaskAnalysis,
};
use crate::task::{CampaignTask, ExecutionMode, GoalType, TaskStatus};

/// Minimum completed-task history before data-driven recommendations.
const COLD_START_FLOOR: usize = 3;

/// Minimum samples for a configuration group to be ranked.
const CONFIG_SAMPLE_FLOOR: usize = 2;

fn rate_percent(converted: u64, contacted: u64) -> f64 {
    if contacted == 0 {
        0.0
    } else {
        converted as f64 / contacted as f64 * 100.0
    }
}

/// Picks the mode with the strictly highest conversion rate over `tasks`.
///
/// Ties keep the first mode in enumeration order; a goal with no completed
/// tasks defaults to `hybrid`.
fn best_execution_mode(tasks: &[&CampaignTask]) -> ExecutionMode {
    if tasks.is_empty() {
        return ExecutionMode::Hybrid;
    }

    let mut best: Option<(ExecutionMode, f64)> = None;
    for mode in ExecutionMode::ALL {
        let subset: Vec<&&CampaignTask> =
            tasks.iter().filter(|t| t.execution_mode == mode).collect();
        if subset.is_empty() {
            continue;
        }
        let contacted: u64 = subset.iter().map(|t| t.stats.contacted).sum();
        let converted: u64 = subset.iter().map(|t| t.stats.converted).sum();
        let rate = rate_percent(converted, contacted);
        match best {
            Some((_, best_rate)) if rate <= best_rate => {}
            _ => best = Some((mode, rate)),
        }
    }
    best.map(|(mode, _)| mode).unwrap_or_default()
}

/// Top 3 roles by converting-task count, or the goal's static defaults when
/// fewer than 3 distinct roles appear in history.
fn best_roles(goal: GoalType, tasks: &[&CampaignTask]) -> Vec<String> {
    let mut distinct: Vec<&str> = Vec::new();
    let mut converting_count: HashMap<&str, usize> = HashMap::new();

    for task in tasks {
        for role in &task.role_config {
            if !distinct.contains(&role.as_str()) {
                distinct.push(role.as_str());
            }
            if task.stats.converted > 0 {
                *converting_count.entry(role.as_str()).or_default() += 1;
            }
        }
    }

    if distinct.len() < 3 {
        return goal.default_roles().iter().map(|r| r.to_string()).collect();
    }

    let mut ranked: Vec<(&str, usize)> = distinct
        .iter()
        .map(|&role| (role, converting_count.get(role).copied().unwrap_or(0)))
        .collect();
    // count descending, then name ascending for determinism
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(3)
        .map(|(role, _)| role.to_string())
        .collect()
}

fn analyze_goals(completed: &[&CampaignTask]) -> Vec<GoalAnalysis> {
    GoalType::ALL
        .iter()
        .map(|&goal_type| {
            let subset: Vec<&CampaignTask> = completed
                .iter()
                .filter(|t| t.goal_type == goal_type)
                .copied()
                .collect();
            let contacted: u64 = subset.iter().map(|t| t.stats.contacted).sum();
            let converted: u64 = subset.iter().map(|t| t.stats.converted).sum();
            GoalAnalysis {
                goal_type,
                task_count: subset.len(),
                contacted,
                converted,
                conversion_rate: rate_percent(converted, contacted),
                best_execution_mode: best_execution_mode(&subset),
                best_roles: best_roles(goal_type, &subset),
            }
        })
        .collect()
}

/// Top 3 hours of day by success rate over the completed tasks.
///
/// A task is a success when it produced at least one conversion; only hours
/// that actually contain tasks are ranked.
fn best_hours(completed: &[&CampaignTask]) -> Vec<HourStat> {
    let mut buckets: HashMap<u32, (usize, usize)> = HashMap::new();
    for task in completed {
        let hour = task.created_at.hour();
        let entry = buckets.entry(hour).or_default();
        entry.0 += 1;
        if task.stats.converted > 0 {
            entry.1 += 1;
        }
    }

    let mut hours: Vec<HourStat> = buckets
        .into_iter()
        .map(|(hour, (total, successes))| HourStat {
            hour,
            task_count: total,
            success_rate: if total == 0 {
                0.0
            } else {
                successes as f64 / total as f64
            },
        })
        .collect();
    hours.sort_by(|a, b| {
        b.success_rate
            .partial_cmp(&a.success_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.hour.cmp(&b.hour))
    });
    hours.truncate(3);
    hours
}

/// Groups tasks by (goal, mode, sorted role set) and ranks groups with at
/// least two samples by conversion rate.
fn top_configs(completed: &[&CampaignTask]) -> Vec<ConfigGroup> {
    let mut groups: HashMap<(GoalType, ExecutionMode, Vec<String>), Vec<&CampaignTask>> =
        HashMap::new();
    for task in completed {
        let mut roles = task.role_config.clone();
        roles.sort();
        groups
            .entry((task.goal_type, task.execution_mode, roles))
            .or_default()
            .push(task);
    }

    let mut configs: Vec<ConfigGroup> = groups
        .into_iter()
        .filter(|(_, tasks)| tasks.len() >= CONFIG_SAMPLE_FLOOR)
        .map(|((goal_type, execution_mode, roles), tasks)| {
            let contacted: u64 = tasks.iter().map(|t| t.stats.contacted).sum();
            let converted: u64 = tasks.iter().map(|t| t.stats.converted).sum();
            ConfigGroup {
                goal_type,
                execution_mode,
                roles,
                task_count: tasks.len(),
                contacted,
                converted,
                conversion_rate: rate_percent(converted, contacted),
            }
        })
        .collect();
    configs.sort_by(|a, b| {
        b.conversion_rate
            .partial_cmp(&a.conversion_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(b.task_count.cmp(&a.task_count))
    });
    configs.truncate(5);
    configs
}

/// Runs the full historical analysis over a task snapshot.
///
/// Only tasks with `status = completed` participate.
pub fn analyze(tasks: &[CampaignTask]) -> TaskAnalysis {
    let completed: Vec<&CampaignTask> = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Completed)
        .collect();

    let contacted: u64 = completed.iter().map(|t| t.stats.contacted).sum();
    let converted: u64 = completed.iter().map(|t| t.stats.converted).sum();

    TaskAnalysis {
        completed_count: completed.len(),
        avg_conversion_rate: rate_percent(converted, contacted),
        goals: analyze_goals(&completed),
        best_hours: best_hours(&completed),
        top_configs: top_configs(&completed),
    }
}

fn clamp_confidence(value: u32) -> u8 {
    value.min(100) as u8
}

fn cold_start_recommendation() -> Recommendation {
    Recommendation {
        kind: RecommendationKind::Goal,
        title: "Start with a conversion campaign".to_string(),
        description: "Run a conversion-goal campaign in hybrid mode to build up history."
            .to_string(),
        reason: "Fewer than 3 completed campaigns; not enough history to mine.".to_string(),
        confidence: 80,
        action: Some(json!({
            "goalType": GoalType::Conversion.label(),
            "executionMode": ExecutionMode::Hybrid.label(),
        })),
    }
}

/// Generates ranked recommendations from an analysis summary.
///
/// With fewer than 3 completed tasks this emits exactly one generic
/// cold-start suggestion at confidence 80 and nothing else.
pub fn recommendations(analysis: &TaskAnalysis) -> Vec<Recommendation> {
    if analysis.completed_count < COLD_START_FLOOR {
        return vec![cold_start_recommendation()];
    }

    let mut out = Vec::new();

    if let Some(config) = analysis.top_configs.first() {
        let confidence = clamp_confidence((50 + config.task_count as u32 * 10).min(90));
        out.push(Recommendation {
            kind: RecommendationKind::Mode,
            title: "Reuse your best configuration".to_string(),
            description: format!(
                "{} campaigns in {} mode with roles [{}] converted at {:.1}%.",
                config.goal_type,
                config.execution_mode,
                config.roles.join(", "),
                config.conversion_rate
            ),
            reason: format!(
                "Based on {} completed campaigns with this exact configuration.",
                config.task_count
            ),
            confidence,
            action: Some(json!({
                "goalType": config.goal_type.label(),
                "executionMode": config.execution_mode.label(),
                "roles": config.roles,
            })),
        });
    }

    let best_goal = analysis
        .goals
        .iter()
        .filter(|g| g.task_count >= 2)
        .fold(None::<&GoalAnalysis>, |best, goal| match best {
            Some(b) if goal.conversion_rate <= b.conversion_rate => Some(b),
            _ => Some(goal),
        });
    if let Some(goal) = best_goal {
        let confidence = clamp_confidence((40 + goal.task_count as u32 * 5).min(85));
        out.push(Recommendation {
            kind: RecommendationKind::Goal,
            title: format!("Focus on {} campaigns", goal.goal_type),
            description: format!(
                "Your {} campaigns convert at {:.1}%, your best goal so far. {} mode worked best.",
                goal.goal_type, goal.conversion_rate, goal.best_execution_mode
            ),
            reason: format!("Based on {} completed campaigns for this goal.", goal.task_count),
            confidence,
            action: Some(json!({
                "goalType": goal.goal_type.label(),
                "executionMode": goal.best_execution_mode.label(),
                "roles": goal.best_roles,
            })),
        });
    }

    if !analysis.best_hours.is_empty() {
        let hours: Vec<String> = analysis
            .best_hours
            .iter()
            .map(|h| format!("{}:00", h.hour))
            .collect();
        out.push(Recommendation {
            kind: RecommendationKind::Timing,
            title: "Schedule campaigns at your best hours".to_string(),
            description: format!("Campaigns created around {} succeeded most often.", hours.join(", ")),
            reason: "Hour-of-day success rates over your completed campaigns.".to_string(),
            confidence: 70,
            action: Some(json!({
                "hours": analysis.best_hours.iter().map(|h| h.hour).collect::<Vec<_>>(),
            })),
        });
    }

    out
}
