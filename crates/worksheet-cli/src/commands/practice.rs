//! The `worksheet practice` command: an interactive session for one exercise.
//!
//! Answers are held in the session until the learner types `check`. Coach
//! requests run on a spawned task and report back over a channel, so the
//! learner can keep editing while the coach is thinking; a reply for an
//! outdated check is dropped by the session.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use worksheet_coach::config::{load_config_from, resolve_coach};
use worksheet_core::model::ItemId;
use worksheet_core::session::{CoachState, CoachTicket, ExerciseSession};
use worksheet_core::traits::{FeedbackCoach, FeedbackResponse};

use super::show::{print_exercise, print_items};

type CoachResult = (CoachTicket, Result<FeedbackResponse, String>);

/// One line of learner input.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Answer(ItemId, String),
    Clear(ItemId),
    Check,
    Reset,
    Coach,
    Show,
    Help,
    Quit,
}

impl Command {
    /// Returns `Ok(None)` for a blank line.
    fn parse(line: &str) -> Result<Option<Command>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };

        if let Ok(id) = head.parse::<ItemId>() {
            return Ok(Some(Command::Answer(id, rest.to_string())));
        }

        let command = match head.to_lowercase().as_str() {
            "clear" => {
                let id = rest
                    .parse::<ItemId>()
                    .map_err(|_| format!("usage: clear <item>, got '{rest}'"))?;
                Command::Clear(id)
            }
            "check" => Command::Check,
            "reset" => Command::Reset,
            "coach" => Command::Coach,
            "show" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(format!("unknown command '{other}', type 'help'")),
        };
        Ok(Some(command))
    }
}

const HELP: &str = "\
Commands:
  <item> <answer>   answer an item, e.g. `1 t`, `2 B`, `3 I didn't go to school.`
  clear <item>      remove an answer
  check             grade your answers
  coach             ask the AI coach about your last check
  show              print the exercise again
  reset             start over
  help              show this help
  quit              leave";

pub async fn execute(
    exercise_id: String,
    dataset: Option<PathBuf>,
    coach_name: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let dataset = dataset.or_else(|| config.datasets.clone());
    let exercises = super::load_catalog(dataset.as_deref())?;
    let exercise = super::find_exercise(&exercises, &exercise_id)?;

    // A missing coach only matters once the learner asks for feedback.
    let coach: Result<Arc<dyn FeedbackCoach>, String> =
        match resolve_coach(&config, coach_name.as_deref()) {
            Ok(coach) => Ok(Arc::from(coach)),
            Err(e) => Err(format!("{e:#}")),
        };

    let mut session = ExerciseSession::new(exercise);
    print_exercise(session.exercise());
    print_items(&session);
    println!("\nType `help` for commands.");

    let (tx, mut rx) = mpsc::channel::<CoachResult>(4);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        prompt();
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match Command::parse(&line) {
                    Ok(None) => {}
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => apply(&mut session, command, &coach, &tx),
                    Err(message) => println!("{message}"),
                }
            }
            Some((ticket, result)) = rx.recv() => {
                if session.finish_feedback(ticket, result) {
                    print_coach(&session);
                }
            }
        }
    }

    // Let an in-flight coach reply land before leaving.
    drop(tx);
    while matches!(session.coach_state(), CoachState::Loading) {
        match rx.recv().await {
            Some((ticket, result)) => {
                if session.finish_feedback(ticket, result) {
                    print_coach(&session);
                }
            }
            None => break,
        }
    }

    Ok(())
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

fn apply(
    session: &mut ExerciseSession,
    command: Command,
    coach: &Result<Arc<dyn FeedbackCoach>, String>,
    tx: &mpsc::Sender<CoachResult>,
) {
    match command {
        Command::Answer(id, raw) => {
            let was_checked = session.is_checked();
            match session.answer(id, &raw) {
                Ok(()) if was_checked && !session.is_checked() => {
                    println!("Answers changed. Type `check` to grade again.");
                }
                Ok(()) => {}
                Err(e) => println!("{e}"),
            }
        }
        Command::Clear(id) => {
            if let Err(e) = session.clear(id) {
                println!("{e}");
            }
        }
        Command::Check => {
            let pass = session.check();
            print_items(session);
            if pass.outcome.is_perfect() {
                println!("\nScore: {}/{} Perfect score!", pass.outcome.correct, pass.outcome.total());
            } else {
                println!(
                    "\nScore: {}/{} ({} to review). Type `coach` for tips.",
                    pass.outcome.correct,
                    pass.outcome.total(),
                    pass.mistakes.len()
                );
            }
        }
        Command::Reset => {
            session.reset();
            println!("Cleared all answers.");
        }
        Command::Coach => request_feedback(session, coach, tx),
        Command::Show => {
            print_exercise(session.exercise());
            print_items(session);
        }
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
}

fn request_feedback(
    session: &mut ExerciseSession,
    coach: &Result<Arc<dyn FeedbackCoach>, String>,
    tx: &mpsc::Sender<CoachResult>,
) {
    let Some((ticket, request)) = session.begin_feedback() else {
        println!("Check your answers first.");
        return;
    };

    match coach {
        Ok(coach) => {
            println!("Asking the {} coach...", coach.name());
            let coach = Arc::clone(coach);
            let tx = tx.clone();
            tokio::spawn(async move {
                let result = coach.coach(&request).await.map_err(|e| format!("{e:#}"));
                let _ = tx.send((ticket, result)).await;
            });
        }
        Err(cause) => {
            session.finish_feedback(ticket, Err(cause.clone()));
            print_coach(session);
        }
    }
}

fn print_coach(session: &ExerciseSession) {
    match session.coach_state() {
        CoachState::Ready(feedback) => {
            println!(
                "\n{} {}  +{} XP",
                feedback.badge_emoji, feedback.badge_name, feedback.xp_earned
            );
            println!("{}", feedback.feedback_title);
            println!("{}", feedback.feedback_message);
            if !feedback.key_tip.is_empty() {
                println!("Tip: {}", feedback.key_tip);
            }
        }
        CoachState::Failed { message, cause } => {
            tracing::warn!("coach request failed: {cause}");
            println!("\n{message}");
        }
        CoachState::Idle | CoachState::Loading => {}
    }
    prompt();
}
