//! Derived statistics over the task collection.
//!
//! Pure, stateless computation: every function here takes a snapshot of the
//! task list and returns a derived view. Nothing in this module mutates or
//! caches; callers memoize keyed on the store's snapshot version.

pub mod aggregator;
pub mod model;

pub use aggregator::{by_goal, daily_series, overall_stats, percent, today_stats};
pub use model::{DailyStats, GoalBucket, OverallStats, StatsSummary};
