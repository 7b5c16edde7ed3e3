use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub attempt_id: Uuid,
    pub quiz_id: String,
    pub quiz_title: String,
    pub user_email: String,
    pub percentage: f64,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Trend {
    pub direction: TrendDirection,
    pub magnitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    Fail,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct StreakSummary {
    pub current_length: usize,
    pub longest_length: usize,
    pub current_outcome: Outcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceSummary {
    pub attempt_count: usize,
    pub average_score: f64,
    pub best_attempt: Option<AttemptRecord>,
    pub consistency_score: f64,
    pub trend: Trend,
    pub streak: StreakSummary,
    pub weak_areas: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizBreakdown {
    pub quiz_id: String,
    pub quiz_title: String,
    pub attempt_count: usize,
    pub average_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub total_items: usize,
    pub items_per_page: usize,
    pub current_page: usize,
    pub total_pages: usize,
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub display_start: usize,
    pub display_end: usize,
}
