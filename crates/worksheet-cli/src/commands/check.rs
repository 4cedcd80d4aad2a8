//! The `worksheet check` command: grade a file of answers in one go.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use serde::Deserialize;

use worksheet_coach::config::{load_config_from, resolve_coach};
use worksheet_core::model::{Exercise, ItemId};
use worksheet_core::report::{ExerciseReport, WorksheetReport};
use worksheet_core::session::{CoachState, ExerciseSession};
use worksheet_core::traits::FeedbackCoach;
use worksheet_report::html::write_html_report;

pub struct CheckArgs {
    pub exercise: Option<String>,
    pub all: bool,
    pub answers: PathBuf,
    pub coach: Option<String>,
    pub format: String,
    pub output: PathBuf,
    pub dataset: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

/// Answers file: `[answers.<exercise-id>]` tables mapping item ids to answers.
#[derive(Debug, Deserialize)]
struct AnswersFile {
    #[serde(default)]
    answers: BTreeMap<String, BTreeMap<String, toml::Value>>,
}

fn load_answers(path: &Path) -> Result<AnswersFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answers file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("failed to parse answers file: {}", path.display()))
}

/// Raw text for one answer value, as a learner would have typed it.
fn raw_answer(value: &toml::Value) -> Result<String> {
    match value {
        toml::Value::String(s) => Ok(s.clone()),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        toml::Value::Integer(i) => Ok(i.to_string()),
        other => anyhow::bail!("unsupported answer of type {}", other.type_str()),
    }
}

/// Fill a fresh session from one exercise's answers table.
fn fill_session(
    exercise: Exercise,
    answers: Option<&BTreeMap<String, toml::Value>>,
) -> Result<ExerciseSession> {
    let id = exercise.id.clone();
    let mut session = ExerciseSession::new(exercise);
    for (key, value) in answers.into_iter().flatten() {
        let item: ItemId = key
            .parse()
            .with_context(|| format!("answers.{id}: '{key}' is not an item number"))?;
        let raw = raw_answer(value).with_context(|| format!("answers.{id}.{key}"))?;
        session
            .answer(item, &raw)
            .with_context(|| format!("answers.{id}"))?;
    }
    Ok(session)
}

pub async fn execute(args: CheckArgs) -> Result<()> {
    let config = load_config_from(args.config.as_deref())?;
    let dataset = args.dataset.or_else(|| config.datasets.clone());
    let exercises = super::load_catalog(dataset.as_deref())?;
    let answers = load_answers(&args.answers)?;

    let selected: Vec<Exercise> = if args.all {
        exercises
    } else {
        let id = args
            .exercise
            .as_deref()
            .context("name an exercise or pass --all")?;
        vec![super::find_exercise(&exercises, id)?]
    };

    for id in answers.answers.keys() {
        if !selected.iter().any(|e| &e.id == id) {
            tracing::warn!("answers for '{id}' ignored: exercise not selected");
        }
    }

    let coach = args
        .coach
        .as_deref()
        .map(|name| resolve_coach(&config, Some(name)).map_err(|e| format!("{e:#}")));

    let mut reports = Vec::new();
    for exercise in selected {
        let table = answers.answers.get(&exercise.id);
        let mut session = fill_session(exercise, table)?;
        reports.push(grade_session(&mut session, coach.as_ref()).await);
    }

    let report = WorksheetReport::new(reports);
    print_report(&report);
    save_outputs(&report, &args.format, &args.output)
}

/// Check one session and, when a coach was requested, ask it for feedback.
///
/// Coach failures end up in the report, never in the exit status.
async fn grade_session(
    session: &mut ExerciseSession,
    coach: Option<&Result<Box<dyn FeedbackCoach>, String>>,
) -> ExerciseReport {
    let pass = session.check();

    if let Some(coach) = coach {
        if let Some((ticket, request)) = session.begin_feedback() {
            let result = match coach {
                Ok(coach) => coach.coach(&request).await.map_err(|e| format!("{e:#}")),
                Err(cause) => Err(cause.clone()),
            };
            session.finish_feedback(ticket, result);
        }
    }

    let exercise = session.exercise();
    let mut report =
        ExerciseReport::from_pass(exercise, session.selections(), &pass.outcome, pass.mistakes);

    match session.coach_state() {
        CoachState::Ready(feedback) => report.feedback = Some(feedback.clone()),
        CoachState::Failed { message, cause } => {
            tracing::warn!(exercise = %exercise.id, "coach request failed: {cause}");
            report.feedback_error = Some(message.clone());
        }
        CoachState::Idle | CoachState::Loading => {}
    }
    report
}

fn print_report(report: &WorksheetReport) {
    for ex in &report.exercises {
        println!("{}  {}/{}", ex.title, ex.correct, ex.total);
        for item in &ex.items {
            if item.correct {
                println!("  [✓] {}. {}", item.id, item.question);
            } else {
                println!(
                    "  [✗] {}. {}\n        your answer: {} | correct: {}",
                    item.id, item.question, item.user_answer, item.correct_answer
                );
            }
        }
        if let Some(feedback) = &ex.feedback {
            println!(
                "  Coach: {} {} +{} XP. {}",
                feedback.badge_emoji,
                feedback.badge_name,
                feedback.xp_earned,
                feedback.feedback_title
            );
            println!("         {}", feedback.feedback_message);
            if !feedback.key_tip.is_empty() {
                println!("         Tip: {}", feedback.key_tip);
            }
        } else if let Some(error) = &ex.feedback_error {
            println!("  Coach: {error}");
        }
        println!();
    }

    let mut table = Table::new();
    table.set_header(vec!["Exercise", "Score", "Mistakes"]);
    for ex in &report.exercises {
        table.add_row(vec![
            Cell::new(&ex.title),
            Cell::new(format!("{}/{}", ex.correct, ex.total)),
            Cell::new(ex.mistakes.len()),
        ]);
    }
    let (correct, total) = report.totals();
    table.add_row(vec![
        Cell::new("Total"),
        Cell::new(format!("{correct}/{total}")),
        Cell::new(total - correct),
    ]);
    println!("{table}");
}

fn save_outputs(report: &WorksheetReport, format: &str, output: &Path) -> Result<()> {
    let formats: Vec<&str> = if format == "all" {
        vec!["json", "html"]
    } else {
        format.split(',').map(str::trim).collect()
    };

    let timestamp = report.created_at.format("%Y-%m-%dT%H%M%S");
    for fmt in &formats {
        match *fmt {
            "text" => {}
            "json" => {
                let path = output.join(format!("report-{timestamp}.json"));
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("report-{timestamp}.html"));
                write_html_report(report, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            _ => {
                eprintln!("Unknown format: {fmt}");
            }
        }
    }
    Ok(())
}
