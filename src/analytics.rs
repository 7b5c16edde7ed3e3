use std::collections::HashMap;

use log::debug;
use serde::Serialize;
use thiserror::Error;

use crate::models::{
    AttemptRecord, Outcome, PerformanceSummary, StreakSummary, Trend, TrendDirection,
};

pub const DEFAULT_PASS_THRESHOLD: f64 = 70.0;

const TREND_MAX_WINDOW: usize = 5;
const TREND_DEAD_ZONE: f64 = 2.0;
const MAX_WEAK_AREAS: usize = 3;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("invalid attempt record: {0}")]
    InvalidRecord(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Excellent,
    Good,
    NeedsReview,
    Struggling,
}

impl ScoreBand {
    pub fn label(self) -> &'static str {
        match self {
            ScoreBand::Excellent => "excellent",
            ScoreBand::Good => "good",
            ScoreBand::NeedsReview => "needs review",
            ScoreBand::Struggling => "struggling",
        }
    }
}

pub fn classify_score(percentage: f64) -> ScoreBand {
    if percentage >= 90.0 {
        ScoreBand::Excellent
    } else if percentage >= 70.0 {
        ScoreBand::Good
    } else if percentage >= 50.0 {
        ScoreBand::NeedsReview
    } else {
        ScoreBand::Struggling
    }
}

/// Full performance summary over a set of attempts. `resolve_subject` maps a
/// quiz id to its display label for the weak-area list; unresolvable ids are
/// dropped. Empty input yields the defined no-data summary, not an error.
pub fn summarize<F>(
    records: &[AttemptRecord],
    resolve_subject: F,
    pass_threshold: f64,
) -> Result<PerformanceSummary, AnalyticsError>
where
    F: Fn(&str) -> Option<String>,
{
    validate(records, pass_threshold)?;

    if records.is_empty() {
        return Ok(PerformanceSummary {
            attempt_count: 0,
            average_score: 0.0,
            best_attempt: None,
            consistency_score: 0.0,
            trend: Trend {
                direction: TrendDirection::Stable,
                magnitude: 0.0,
            },
            streak: StreakSummary {
                current_length: 0,
                longest_length: 0,
                current_outcome: Outcome::Pass,
            },
            weak_areas: Vec::new(),
        });
    }

    let average_score =
        records.iter().map(|r| r.percentage).sum::<f64>() / records.len() as f64;

    let mut best_attempt = &records[0];
    for record in &records[1..] {
        if record.percentage > best_attempt.percentage {
            best_attempt = record;
        }
    }

    let variance = records
        .iter()
        .map(|r| {
            let delta = r.percentage - average_score;
            delta * delta
        })
        .sum::<f64>()
        / records.len() as f64;
    let consistency_score = (100.0 - variance.sqrt()).max(0.0);

    // Trend and streaks both walk the attempts most-recent-first; sort a
    // copy once and share it.
    let mut by_recency = records.to_vec();
    by_recency.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));

    Ok(PerformanceSummary {
        attempt_count: records.len(),
        average_score,
        best_attempt: Some(best_attempt.clone()),
        consistency_score,
        trend: compute_trend(&by_recency),
        streak: compute_streaks(&by_recency, pass_threshold),
        weak_areas: identify_weak_areas(records, resolve_subject, pass_threshold),
    })
}

fn validate(records: &[AttemptRecord], pass_threshold: f64) -> Result<(), AnalyticsError> {
    if !pass_threshold.is_finite() {
        return Err(AnalyticsError::InvalidRecord(format!(
            "pass threshold must be a finite number, got {pass_threshold}"
        )));
    }
    for record in records {
        if !record.percentage.is_finite() || !(0.0..=100.0).contains(&record.percentage) {
            return Err(AnalyticsError::InvalidRecord(format!(
                "attempt {} has percentage {} outside 0..=100",
                record.attempt_id, record.percentage
            )));
        }
    }
    Ok(())
}

fn mean(records: &[AttemptRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    records.iter().map(|r| r.percentage).sum::<f64>() / records.len() as f64
}

/// Direction of recent performance, comparing the mean of the newest window
/// against the window before it. `by_recency` must be sorted most-recent
/// first. Deltas inside the two-point dead zone read as stable.
pub fn compute_trend(by_recency: &[AttemptRecord]) -> Trend {
    if by_recency.len() < 2 {
        return Trend {
            direction: TrendDirection::Stable,
            magnitude: 0.0,
        };
    }

    let window = (by_recency.len() / 2).min(TREND_MAX_WINDOW);
    debug!(
        "comparing trend windows of {window} over {} attempts",
        by_recency.len()
    );
    let recent = &by_recency[..window];
    let prior = &by_recency[window..window * 2];
    let delta = mean(recent) - mean(prior);

    if delta.abs() < TREND_DEAD_ZONE {
        Trend {
            direction: TrendDirection::Stable,
            magnitude: 0.0,
        }
    } else if delta > 0.0 {
        Trend {
            direction: TrendDirection::Up,
            magnitude: delta,
        }
    } else {
        Trend {
            direction: TrendDirection::Down,
            magnitude: -delta,
        }
    }
}

/// Current and longest pass/fail runs. `by_recency` must be sorted
/// most-recent first; the current run is the leading one.
pub fn compute_streaks(by_recency: &[AttemptRecord], pass_threshold: f64) -> StreakSummary {
    let outcome_of = |record: &AttemptRecord| {
        if record.percentage >= pass_threshold {
            Outcome::Pass
        } else {
            Outcome::Fail
        }
    };

    let Some(first) = by_recency.first() else {
        return StreakSummary {
            current_length: 0,
            longest_length: 0,
            current_outcome: Outcome::Pass,
        };
    };

    let current_outcome = outcome_of(first);
    let current_length = by_recency
        .iter()
        .take_while(|record| outcome_of(record) == current_outcome)
        .count();

    let mut longest_length = 0;
    let mut run_length = 0;
    let mut run_outcome = current_outcome;
    for record in by_recency {
        let outcome = outcome_of(record);
        if outcome == run_outcome {
            run_length += 1;
        } else {
            run_outcome = outcome;
            run_length = 1;
        }
        longest_length = longest_length.max(run_length);
    }

    StreakSummary {
        current_length,
        longest_length,
        current_outcome,
    }
}

/// Quizzes whose mean score falls below the pass threshold, labeled through
/// `resolve_subject` and capped at three. Order is first encounter in the
/// input, not severity.
pub fn identify_weak_areas<F>(
    records: &[AttemptRecord],
    resolve_subject: F,
    pass_threshold: f64,
) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut order: Vec<&str> = Vec::new();
    let mut totals: HashMap<&str, (f64, usize)> = HashMap::new();

    for record in records {
        let entry = totals.entry(record.quiz_id.as_str()).or_insert_with(|| {
            order.push(record.quiz_id.as_str());
            (0.0, 0)
        });
        entry.0 += record.percentage;
        entry.1 += 1;
    }

    order
        .into_iter()
        .filter(|quiz_id| {
            let (total, count) = totals[quiz_id];
            total / (count as f64) < pass_threshold
        })
        .filter_map(|quiz_id| resolve_subject(quiz_id))
        .take(MAX_WEAK_AREAS)
        .collect()
}
