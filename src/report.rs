use std::collections::HashMap;
use std::fmt::Write;

use crate::analytics::{self, AnalyticsError};
use crate::models::{AttemptRecord, Outcome, QuizBreakdown, TrendDirection};

pub fn summarize_by_quiz(records: &[AttemptRecord]) -> Vec<QuizBreakdown> {
    let mut map: HashMap<String, (String, usize, f64)> = HashMap::new();

    for record in records {
        let entry = map
            .entry(record.quiz_id.clone())
            .or_insert_with(|| (record.quiz_title.clone(), 0, 0.0));
        entry.1 += 1;
        entry.2 += record.percentage;
    }

    let mut breakdowns: Vec<QuizBreakdown> = map
        .into_iter()
        .map(|(quiz_id, (quiz_title, count, total))| QuizBreakdown {
            quiz_id,
            quiz_title,
            attempt_count: count,
            average_score: if count == 0 { 0.0 } else { total / count as f64 },
        })
        .collect();

    breakdowns.sort_by(|a, b| b.attempt_count.cmp(&a.attempt_count));
    breakdowns
}

pub fn build_report(
    scope: Option<&str>,
    pass_threshold: f64,
    records: &[AttemptRecord],
) -> Result<String, AnalyticsError> {
    let titles: HashMap<&str, &str> = records
        .iter()
        .map(|r| (r.quiz_id.as_str(), r.quiz_title.as_str()))
        .collect();
    let summary = analytics::summarize(
        records,
        |quiz_id| titles.get(quiz_id).map(|title| title.to_string()),
        pass_threshold,
    )?;
    let breakdowns = summarize_by_quiz(records);

    let mut output = String::new();
    let scope_label = scope.unwrap_or("all attempts");

    let _ = writeln!(output, "# Quiz Performance Report");
    let _ = writeln!(
        output,
        "Generated for {} ({} attempts, pass threshold {:.0}%)",
        scope_label, summary.attempt_count, pass_threshold
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Overview");

    if summary.attempt_count == 0 {
        let _ = writeln!(output, "No attempts recorded for this scope.");
    } else {
        let _ = writeln!(output, "- Average score: {:.1}%", summary.average_score);
        if let Some(best) = &summary.best_attempt {
            let _ = writeln!(
                output,
                "- Best attempt: {:.1}% on {} ({})",
                best.percentage,
                best.quiz_title,
                best.completed_at.format("%Y-%m-%d")
            );
        }
        let _ = writeln!(
            output,
            "- Consistency: {:.1} / 100",
            summary.consistency_score
        );
        let trend_line = match summary.trend.direction {
            TrendDirection::Up => format!("up {:.1} points", summary.trend.magnitude),
            TrendDirection::Down => format!("down {:.1} points", summary.trend.magnitude),
            TrendDirection::Stable => "stable".to_string(),
        };
        let _ = writeln!(output, "- Trend: {trend_line}");
        let outcome_label = match summary.streak.current_outcome {
            Outcome::Pass => "pass",
            Outcome::Fail => "fail",
        };
        let _ = writeln!(
            output,
            "- Streak: {} consecutive {} (longest run {})",
            summary.streak.current_length, outcome_label, summary.streak.longest_length
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Quiz Breakdown");

    if breakdowns.is_empty() {
        let _ = writeln!(output, "No attempts recorded for this scope.");
    } else {
        for breakdown in breakdowns.iter() {
            let _ = writeln!(
                output,
                "- {}: {} attempts, avg {:.1}% ({})",
                breakdown.quiz_title,
                breakdown.attempt_count,
                breakdown.average_score,
                analytics::classify_score(breakdown.average_score).label()
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Weak Areas");

    if summary.weak_areas.is_empty() {
        let _ = writeln!(output, "No quizzes below the pass threshold.");
    } else {
        for area in summary.weak_areas.iter() {
            let _ = writeln!(output, "- {area}");
        }
    }

    let mut recent = records.to_vec();
    recent.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Attempts");

    if recent.is_empty() {
        let _ = writeln!(output, "No attempts recorded for this scope.");
    } else {
        for attempt in recent.iter().take(5) {
            let _ = writeln!(
                output,
                "- {} {}: {:.1}% by {}",
                attempt.completed_at.format("%Y-%m-%d"),
                attempt.quiz_title,
                attempt.percentage,
                attempt.user_email
            );
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn attempt(quiz_id: &str, percentage: f64, day: u32) -> AttemptRecord {
        AttemptRecord {
            attempt_id: Uuid::new_v4(),
            quiz_id: quiz_id.to_string(),
            quiz_title: format!("{quiz_id} title"),
            user_email: "sam@quizlab.test".to_string(),
            percentage,
            completed_at: Utc.with_ymd_and_hms(2024, 2, day, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn breakdown_groups_by_quiz_and_sorts_by_volume() {
        let records = vec![
            attempt("algebra", 80.0, 1),
            attempt("algebra", 60.0, 2),
            attempt("history", 90.0, 3),
        ];
        let breakdowns = summarize_by_quiz(&records);
        assert_eq!(breakdowns.len(), 2);
        assert_eq!(breakdowns[0].quiz_id, "algebra");
        assert_eq!(breakdowns[0].attempt_count, 2);
        assert!((breakdowns[0].average_score - 70.0).abs() < 0.001);
        assert_eq!(breakdowns[1].attempt_count, 1);
    }

    #[test]
    fn report_includes_every_section() {
        let records = vec![
            attempt("algebra", 80.0, 1),
            attempt("history", 40.0, 2),
            attempt("history", 45.0, 3),
        ];
        let report = build_report(Some("sam@quizlab.test"), 70.0, &records).unwrap();
        assert!(report.contains("# Quiz Performance Report"));
        assert!(report.contains("Generated for sam@quizlab.test"));
        assert!(report.contains("## Overview"));
        assert!(report.contains("## Quiz Breakdown"));
        assert!(report.contains("- history title: 2 attempts"));
        assert!(report.contains("## Weak Areas"));
        assert!(report.contains("- history title"));
        assert!(report.contains("## Recent Attempts"));
    }

    #[test]
    fn empty_scope_renders_no_data_lines() {
        let report = build_report(None, 70.0, &[]).unwrap();
        assert!(report.contains("Generated for all attempts (0 attempts"));
        assert!(report.contains("No attempts recorded for this scope."));
        assert!(report.contains("No quizzes below the pass threshold."));
    }
}
