use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgGroup, Parser, Subcommand};

use quizlab_performance_insights::models::{Outcome, PageWindow, TrendDirection};
use quizlab_performance_insights::{analytics, pagination, report, store};

#[derive(Parser)]
#[command(name = "performance-insights")]
#[command(about = "Quiz performance insights and history browser for QuizLab", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a realistic sample attempts file
    Seed {
        #[arg(long, default_value = "attempts.csv")]
        out: PathBuf,
    },
    /// Browse attempts page by page, most recent first
    List {
        #[arg(long, default_value = "attempts.csv")]
        attempts: PathBuf,
        #[arg(long)]
        quiz: Option<String>,
        #[arg(long)]
        user: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 10)]
        page_size: usize,
    },
    /// Summarize performance across attempts
    #[command(group(
        ArgGroup::new("scope")
            .args(["quiz", "user"])
            .multiple(false)
    ))]
    Summary {
        #[arg(long, default_value = "attempts.csv")]
        attempts: PathBuf,
        #[arg(long)]
        quiz: Option<String>,
        #[arg(long)]
        user: Option<String>,
        #[arg(long, default_value_t = analytics::DEFAULT_PASS_THRESHOLD)]
        pass_threshold: f64,
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report
    #[command(group(
        ArgGroup::new("scope")
            .args(["quiz", "user"])
            .multiple(false)
    ))]
    Report {
        #[arg(long, default_value = "attempts.csv")]
        attempts: PathBuf,
        #[arg(long)]
        quiz: Option<String>,
        #[arg(long)]
        user: Option<String>,
        #[arg(long, default_value_t = analytics::DEFAULT_PASS_THRESHOLD)]
        pass_threshold: f64,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Seed { out } => {
            let written = store::write_sample_attempts(&out)?;
            println!("Wrote {written} sample attempts to {}.", out.display());
        }
        Commands::List {
            attempts,
            quiz,
            user,
            page,
            page_size,
        } => {
            let mut records =
                store::load_attempts(&attempts, quiz.as_deref(), user.as_deref())?;
            records.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));

            if records.is_empty() {
                println!("No attempts found.");
                return Ok(());
            }

            let mut pager = pagination::Pager::new(page_size)?;
            pager.set_total_items(records.len());
            pager.go_to_page(page);
            let window = pager.window();

            println!(
                "Showing {} to {} of {} attempts (page {} of {})",
                window.display_start,
                window.display_end,
                window.total_items,
                window.current_page,
                window.total_pages
            );
            for record in pager.slice(&records) {
                println!(
                    "- {} {}: {:.1}% ({}) by {}",
                    record.completed_at.format("%Y-%m-%d"),
                    record.quiz_title,
                    record.percentage,
                    analytics::classify_score(record.percentage).label(),
                    record.user_email
                );
            }
            println!("{}", render_page_strip(&window));
        }
        Commands::Summary {
            attempts,
            quiz,
            user,
            pass_threshold,
            json,
        } => {
            let records =
                store::load_attempts(&attempts, quiz.as_deref(), user.as_deref())?;
            let titles: HashMap<String, String> = records
                .iter()
                .map(|r| (r.quiz_id.clone(), r.quiz_title.clone()))
                .collect();
            let summary = analytics::summarize(
                &records,
                |quiz_id| titles.get(quiz_id).cloned(),
                pass_threshold,
            )?;

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
                return Ok(());
            }

            println!("Attempts analyzed: {}", summary.attempt_count);
            println!("Average score: {:.1}%", summary.average_score);
            match &summary.best_attempt {
                Some(best) => println!(
                    "Best attempt: {:.1}% on {} ({})",
                    best.percentage,
                    best.quiz_title,
                    best.completed_at.format("%Y-%m-%d")
                ),
                None => println!("Best attempt: none yet"),
            }
            println!("Consistency: {:.1} / 100", summary.consistency_score);
            match summary.trend.direction {
                TrendDirection::Up => {
                    println!("Trend: up {:.1} points", summary.trend.magnitude)
                }
                TrendDirection::Down => {
                    println!("Trend: down {:.1} points", summary.trend.magnitude)
                }
                TrendDirection::Stable => println!("Trend: stable"),
            }
            let outcome_label = match summary.streak.current_outcome {
                Outcome::Pass => "pass",
                Outcome::Fail => "fail",
            };
            println!(
                "Streak: {} consecutive {} (longest run {})",
                summary.streak.current_length, outcome_label, summary.streak.longest_length
            );
            if summary.weak_areas.is_empty() {
                println!("Weak areas: none");
            } else {
                println!("Weak areas:");
                for area in summary.weak_areas.iter() {
                    println!("- {area}");
                }
            }
        }
        Commands::Report {
            attempts,
            quiz,
            user,
            pass_threshold,
            out,
        } => {
            let records =
                store::load_attempts(&attempts, quiz.as_deref(), user.as_deref())?;
            let scope = quiz.as_deref().or(user.as_deref());
            let rendered = report::build_report(scope, pass_threshold, &records)?;
            std::fs::write(&out, rendered)
                .with_context(|| format!("failed to write report to {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

/// Pager strip for the list view. The engine hands back the visible run of
/// page numbers; the gaps toward page 1 and the last page are rendered here.
fn render_page_strip(window: &PageWindow) -> String {
    let numbers = pagination::page_number_window(window.current_page, window.total_pages, 5);
    let mut parts: Vec<String> = Vec::new();

    if let Some(&first) = numbers.first() {
        if first > 1 {
            parts.push("1".to_string());
            if first > 2 {
                parts.push("..".to_string());
            }
        }
    }
    for number in numbers.iter() {
        if *number == window.current_page {
            parts.push(format!("[{number}]"));
        } else {
            parts.push(number.to_string());
        }
    }
    if let Some(&last) = numbers.last() {
        if last < window.total_pages {
            if last + 1 < window.total_pages {
                parts.push("..".to_string());
            }
            parts.push(window.total_pages.to_string());
        }
    }

    format!("Pages: {}", parts.join(" "))
}
