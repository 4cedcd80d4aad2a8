//! The `worksheet validate` command.

use std::path::{Path, PathBuf};

use anyhow::Result;

use worksheet_core::catalog;
use worksheet_core::model::Exercise;
use worksheet_core::parser::{collect_exercise_files, parse_exercise, validate_exercise};

pub fn execute(dataset: Option<PathBuf>) -> Result<()> {
    let mut invalid = 0;
    let exercises = match &dataset {
        None => {
            let mut exercises = Vec::new();
            for exercise in catalog::all() {
                match exercise.validate() {
                    Ok(()) => exercises.push(exercise),
                    Err(e) => {
                        println!("{}: ERROR: {e}", exercise.id);
                        invalid += 1;
                    }
                }
            }
            exercises
        }
        Some(path) => load_reporting_errors(path, &mut invalid)?,
    };

    let mut total_warnings = 0;

    for exercise in &exercises {
        println!(
            "Exercise: {} ({} items, {})",
            exercise.title,
            exercise.len(),
            exercise.rule
        );

        let warnings = validate_exercise(exercise);
        for w in &warnings {
            let prefix = w
                .item_id
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if invalid > 0 {
        anyhow::bail!("{invalid} invalid exercise dataset(s)");
    }

    if total_warnings == 0 {
        println!("All exercises valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}

/// Parse every dataset file, printing the ones that fail instead of skipping them.
fn load_reporting_errors(path: &Path, invalid: &mut usize) -> Result<Vec<Exercise>> {
    if !path.is_dir() {
        return Ok(vec![parse_exercise(path)?]);
    }

    let mut exercises = Vec::new();
    for file in collect_exercise_files(path)? {
        match parse_exercise(&file) {
            Ok(exercise) => exercises.push(exercise),
            Err(e) => {
                println!("{}: ERROR: {e:#}", file.display());
                *invalid += 1;
            }
        }
    }
    Ok(exercises)
}
