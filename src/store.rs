use std::io::Read;
use std::path::Path;

use anyhow::Context;
use chrono::{TimeZone, Utc};
use log::info;
use uuid::Uuid;

use crate::models::AttemptRecord;

/// Read attempts from a CSV export, keeping only rows matching the optional
/// quiz/user scope. Rows without an attempt id get a fresh one.
pub fn load_attempts(
    path: &Path,
    quiz: Option<&str>,
    user: Option<&str>,
) -> anyhow::Result<Vec<AttemptRecord>> {
    let reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open attempts file {}", path.display()))?;
    let attempts = parse_attempts(reader, quiz, user)?;
    info!("loaded {} attempts from {}", attempts.len(), path.display());
    Ok(attempts)
}

fn parse_attempts<R: Read>(
    mut reader: csv::Reader<R>,
    quiz: Option<&str>,
    user: Option<&str>,
) -> anyhow::Result<Vec<AttemptRecord>> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        attempt_id: Option<Uuid>,
        quiz_id: String,
        quiz_title: String,
        user_email: String,
        percentage: f64,
        completed_at: chrono::DateTime<Utc>,
    }

    let mut attempts = Vec::new();

    for result in reader.deserialize::<CsvRow>() {
        let row = result.context("failed to parse attempt row")?;
        if let Some(value) = quiz {
            if row.quiz_id != value {
                continue;
            }
        }
        if let Some(value) = user {
            if row.user_email != value {
                continue;
            }
        }
        attempts.push(AttemptRecord {
            attempt_id: row.attempt_id.unwrap_or_else(Uuid::new_v4),
            quiz_id: row.quiz_id,
            quiz_title: row.quiz_title,
            user_email: row.user_email,
            percentage: row.percentage,
            completed_at: row.completed_at,
        });
    }

    Ok(attempts)
}

/// Write a realistic sample attempts file so every subcommand can be tried
/// without an export at hand. Returns the number of rows written.
pub fn write_sample_attempts(path: &Path) -> anyhow::Result<usize> {
    let rows = vec![
        ("fractions-basics", "Fractions Basics", "priya@quizlab.io", 62.0, (2026, 1, 5, 16)),
        ("world-capitals", "World Capitals", "priya@quizlab.io", 48.0, (2026, 1, 7, 18)),
        ("fractions-basics", "Fractions Basics", "marco@quizlab.io", 71.0, (2026, 1, 8, 9)),
        ("cell-biology", "Cell Biology", "priya@quizlab.io", 66.0, (2026, 1, 10, 20)),
        ("world-capitals", "World Capitals", "marco@quizlab.io", 55.0, (2026, 1, 12, 11)),
        ("fractions-basics", "Fractions Basics", "priya@quizlab.io", 74.0, (2026, 1, 15, 17)),
        ("cell-biology", "Cell Biology", "marco@quizlab.io", 69.0, (2026, 1, 17, 10)),
        ("world-capitals", "World Capitals", "priya@quizlab.io", 61.0, (2026, 1, 20, 19)),
        ("cell-biology", "Cell Biology", "priya@quizlab.io", 78.0, (2026, 1, 23, 18)),
        ("fractions-basics", "Fractions Basics", "marco@quizlab.io", 83.0, (2026, 1, 26, 12)),
        ("cell-biology", "Cell Biology", "priya@quizlab.io", 88.0, (2026, 1, 29, 17)),
        ("fractions-basics", "Fractions Basics", "priya@quizlab.io", 91.0, (2026, 2, 2, 16)),
    ];

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create sample file {}", path.display()))?;
    let mut written = 0usize;

    for (quiz_id, quiz_title, user_email, percentage, (year, month, day, hour)) in rows {
        let completed_at = Utc
            .with_ymd_and_hms(year, month, day, hour, 0, 0)
            .single()
            .context("invalid sample timestamp")?;
        writer.serialize(AttemptRecord {
            attempt_id: Uuid::new_v4(),
            quiz_id: quiz_id.to_string(),
            quiz_title: quiz_title.to_string(),
            user_email: user_email.to_string(),
            percentage,
            completed_at,
        })?;
        written += 1;
    }

    writer.flush()?;
    Ok(written)
}
