pub mod check;
pub mod init;
pub mod list;
pub mod practice;
pub mod show;
pub mod validate;

use std::path::Path;

use anyhow::Result;

use worksheet_core::catalog;
use worksheet_core::model::Exercise;
use worksheet_core::parser::load_exercises;

/// Built-in exercises, followed by any loaded from `dataset`.
///
/// An external exercise replaces a built-in one with the same id.
pub fn load_catalog(dataset: Option<&Path>) -> Result<Vec<Exercise>> {
    let mut exercises = catalog::all();
    if let Some(path) = dataset {
        for external in load_exercises(path)? {
            match exercises.iter_mut().find(|e| e.id == external.id) {
                Some(existing) => {
                    tracing::info!("dataset overrides built-in exercise '{}'", external.id);
                    *existing = external;
                }
                None => exercises.push(external),
            }
        }
    }
    Ok(exercises)
}

/// Look up one exercise by id.
pub fn find_exercise(exercises: &[Exercise], id: &str) -> Result<Exercise> {
    exercises
        .iter()
        .find(|e| e.id == id)
        .cloned()
        .ok_or_else(|| {
            let ids: Vec<&str> = exercises.iter().map(|e| e.id.as_str()).collect();
            anyhow::anyhow!("unknown exercise '{id}'. Available: {}", ids.join(", "))
        })
}
