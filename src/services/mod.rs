pub mod goal_progress;
pub mod mood_stats;
pub mod theme;
