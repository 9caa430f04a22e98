//! Historical analysis of completed tasks and recommendation generation.

pub mod engine;
pub mod model;

pub use engine::{analyze, recommendations};
pub use model::{
    ConfigGroup, GoalAnalysis, HourStat, Recommendation, RecommendationKind, TaskAnalysis,
};
