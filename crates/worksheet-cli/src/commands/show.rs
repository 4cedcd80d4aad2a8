//! The `worksheet show` command and exercise rendering shared with `practice`.

use std::path::PathBuf;

use anyhow::Result;

use worksheet_core::mistakes::render_selection;
use worksheet_core::model::{Choice, Exercise, ExerciseItem, GradingRule};
use worksheet_core::session::{ExerciseSession, ItemState};

pub fn execute(exercise_id: String, dataset: Option<PathBuf>) -> Result<()> {
    let exercises = super::load_catalog(dataset.as_deref())?;
    let exercise = super::find_exercise(&exercises, &exercise_id)?;
    print_exercise(&exercise);
    for item in &exercise.items {
        println!("{}", format_item(&exercise, item, None, None));
    }
    Ok(())
}

/// Print everything above the items.
pub fn print_exercise(exercise: &Exercise) {
    println!("{} [{}]", exercise.title, exercise.section);
    println!("{}", "=".repeat(exercise.title.chars().count()));

    if let Some(passage) = &exercise.passage {
        println!("\n{passage}");
    }
    if !exercise.instructions.is_empty() {
        println!("\n{}", exercise.instructions);
    }
    if let Some(example) = &exercise.example {
        println!("Example: {example}");
    }
    if exercise.rule == GradingRule::PickList && !exercise.pool.is_empty() {
        let pool: Vec<String> = exercise.pool.iter().map(format_pool_entry).collect();
        println!("\nChoose from: {}", pool.join(" | "));
    }
    println!();
}

fn format_pool_entry(choice: &Choice) -> String {
    if choice.example {
        format!("{} (example)", choice.display())
    } else {
        choice.display()
    }
}

fn mark(state: Option<ItemState>) -> &'static str {
    match state {
        None | Some(ItemState::Unanswered) => "[ ]",
        Some(ItemState::Answered) => "[*]",
        Some(ItemState::Correct) => "[✓]",
        Some(ItemState::Incorrect) => "[✗]",
    }
}

/// One item, with its options and the learner's current answer if any.
pub fn format_item(
    exercise: &Exercise,
    item: &ExerciseItem,
    state: Option<ItemState>,
    session: Option<&ExerciseSession>,
) -> String {
    let mut line = format!("{} {}. {}", mark(state), item.id, item.question());

    if exercise.rule == GradingRule::SingleChoice {
        for option in exercise.choices_for(item) {
            line.push_str(&format!("\n       {}) {}", option.id, option.label));
        }
    }

    if let Some(selection) = session.and_then(|s| s.selections().get(&item.id)) {
        line.push_str(&format!(
            "\n       your answer: {}",
            render_selection(exercise, item, Some(selection))
        ));
    }
    line
}

/// Print every item of a session with its current state.
pub fn print_items(session: &ExerciseSession) {
    let exercise = session.exercise();
    for item in &exercise.items {
        println!(
            "{}",
            format_item(exercise, item, session.item_state(item.id), Some(session))
        );
    }
}
