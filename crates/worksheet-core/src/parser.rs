//! TOML exercise parser.
//!
//! Loads exercise datasets from TOML files and directories. Parsing rejects
//! any dataset that breaks the answer-space invariant; softer issues are
//! reported by [`validate_exercise`].

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{AnswerKey, Choice, Exercise, ExerciseItem, GradingRule, ItemId};
use crate::normalize::normalize;

/// Intermediate TOML structure for parsing exercise files.
#[derive(Debug, Deserialize)]
struct TomlExerciseFile {
    exercise: TomlExerciseHeader,
    #[serde(default)]
    pool: Vec<Choice>,
    #[serde(default)]
    items: Vec<TomlItem>,
}

#[derive(Debug, Deserialize)]
struct TomlExerciseHeader {
    id: String,
    title: String,
    #[serde(default)]
    section: String,
    #[serde(default)]
    instructions: String,
    #[serde(default)]
    context: String,
    #[serde(default)]
    passage: Option<String>,
    #[serde(default)]
    example: Option<String>,
    rule: GradingRule,
}

#[derive(Debug, Deserialize)]
struct TomlItem {
    id: ItemId,
    prompt: String,
    #[serde(default)]
    hint: Option<String>,
    #[serde(default)]
    options: Vec<Choice>,
    answer: toml::Value,
}

fn answer_key(rule: GradingRule, item: ItemId, value: toml::Value) -> Result<AnswerKey> {
    let key = match (rule, value) {
        (_, toml::Value::Boolean(b)) => AnswerKey::Bool(b),
        (GradingRule::FreeText { .. }, toml::Value::String(s)) => AnswerKey::Text(s),
        (_, toml::Value::String(s)) => AnswerKey::Choice(s),
        (_, toml::Value::Integer(i)) => AnswerKey::Choice(i.to_string()),
        (_, other) => anyhow::bail!(
            "item {item}: unsupported answer value of type {}",
            other.type_str()
        ),
    };
    Ok(key)
}

/// Parse a single TOML file into an `Exercise`.
pub fn parse_exercise(path: &Path) -> Result<Exercise> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read exercise file: {}", path.display()))?;

    parse_exercise_str(&content, path)
}

/// Parse a TOML string into an `Exercise` (useful for testing).
pub fn parse_exercise_str(content: &str, source_path: &Path) -> Result<Exercise> {
    let parsed: TomlExerciseFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let rule = parsed.exercise.rule;
    let items = parsed
        .items
        .into_iter()
        .map(|i| {
            Ok(ExerciseItem {
                id: i.id,
                prompt: i.prompt,
                hint: i.hint,
                options: i.options,
                answer: answer_key(rule, i.id, i.answer)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let exercise = Exercise {
        id: parsed.exercise.id,
        title: parsed.exercise.title,
        section: parsed.exercise.section,
        instructions: parsed.exercise.instructions,
        context: parsed.exercise.context,
        passage: parsed.exercise.passage,
        example: parsed.exercise.example,
        rule,
        pool: parsed.pool,
        items,
    };

    exercise
        .validate()
        .with_context(|| format!("invalid exercise in {}", source_path.display()))?;

    Ok(exercise)
}

/// Recursively collect `.toml` files under a directory, sorted by path.
pub fn collect_exercise_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();

    let mut files = Vec::new();
    for path in entries {
        if path.is_dir() {
            files.extend(collect_exercise_files(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            files.push(path);
        }
    }
    Ok(files)
}

/// Recursively load all `.toml` exercise files from a directory.
///
/// Files that fail to parse or validate are skipped with a warning.
pub fn load_exercise_directory(dir: &Path) -> Result<Vec<Exercise>> {
    let mut exercises = Vec::new();

    for path in collect_exercise_files(dir)? {
        match parse_exercise(&path) {
            Ok(exercise) => exercises.push(exercise),
            Err(e) => {
                tracing::warn!("skipping {}: {e:#}", path.display());
            }
        }
    }

    Ok(exercises)
}

/// Load a file or a directory of exercise files.
pub fn load_exercises(path: &Path) -> Result<Vec<Exercise>> {
    if path.is_dir() {
        load_exercise_directory(path)
    } else {
        Ok(vec![parse_exercise(path)?])
    }
}

/// A non-fatal issue found in an exercise.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The item id (if applicable).
    pub item_id: Option<ItemId>,
    /// Warning message.
    pub message: String,
}

/// Check an exercise for authoring issues that do not break grading.
pub fn validate_exercise(exercise: &Exercise) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if exercise.context.trim().is_empty() {
        warnings.push(ValidationWarning {
            item_id: None,
            message: "context is empty; mistake records will carry no topic".into(),
        });
    }

    for item in &exercise.items {
        if item.prompt.trim().is_empty() {
            warnings.push(ValidationWarning {
                item_id: Some(item.id),
                message: "prompt is empty".into(),
            });
        }
    }

    match exercise.rule {
        GradingRule::PickList => {
            let answers: HashSet<&str> = exercise
                .items
                .iter()
                .filter_map(|i| match &i.answer {
                    AnswerKey::Choice(id) => Some(id.as_str()),
                    _ => None,
                })
                .collect();
            for choice in exercise.pool.iter().filter(|c| !c.example) {
                if !answers.contains(choice.id.as_str()) {
                    warnings.push(ValidationWarning {
                        item_id: None,
                        message: format!("pool entry '{}' is never the answer", choice.id),
                    });
                }
            }
            for item in exercise.items.iter().filter(|i| !i.options.is_empty()) {
                warnings.push(ValidationWarning {
                    item_id: Some(item.id),
                    message: "inline options are ignored for pick-list exercises".into(),
                });
            }
        }
        GradingRule::FreeText { .. } => {
            for item in &exercise.items {
                if let AnswerKey::Text(text) = &item.answer {
                    if normalize(text).ends_with(' ') {
                        warnings.push(ValidationWarning {
                            item_id: Some(item.id),
                            message: "answer ends with a space before its punctuation".into(),
                        });
                    }
                }
            }
        }
        GradingRule::TrueFalse | GradingRule::SingleChoice => {
            if !exercise.pool.is_empty() {
                warnings.push(ValidationWarning {
                    item_id: None,
                    message: format!("pool is ignored for {} exercises", exercise.rule),
                });
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_TOML: &str = r#"
[exercise]
id = "irregular-verbs"
title = "Irregular verbs"
section = "Grammar"
instructions = "Write the past simple form."
context = "Topic: Irregular past simple"

[exercise.rule]
kind = "free_text"
expand_contractions = false

[[items]]
id = 1
prompt = "go"
answer = "went"

[[items]]
id = 2
prompt = "see"
answer = "saw"
"#;

    const PICK_TOML: &str = r#"
[exercise]
id = "animals"
title = "Animals"
context = "Topic: Animals"
rule = { kind = "pick_list" }

[[pool]]
id = "a"
label = "cat"

[[pool]]
id = "b"
label = "dog"

[[pool]]
id = "c"
label = "horse"
example = true

[[items]]
id = 1
prompt = "It says meow."
answer = "a"
"#;

    #[test]
    fn parse_valid_toml() {
        let ex = parse_exercise_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(ex.id, "irregular-verbs");
        assert_eq!(ex.items.len(), 2);
        assert_eq!(ex.items[1].answer, AnswerKey::Text("saw".into()));
        assert_eq!(
            ex.rule,
            GradingRule::FreeText {
                expand_contractions: false
            }
        );
    }

    #[test]
    fn parse_pick_list_with_example_entry() {
        let ex = parse_exercise_str(PICK_TOML, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(ex.pool.len(), 3);
        assert!(ex.pool[2].example);
        let warnings = validate_exercise(&ex);
        assert!(warnings.iter().any(|w| w.message.contains("'b' is never the answer")));
        assert!(!warnings.iter().any(|w| w.message.contains("'c'")));
    }

    #[test]
    fn reject_answer_outside_pool() {
        let bad = PICK_TOML.replace("answer = \"a\"", "answer = \"c\"");
        let err = parse_exercise_str(&bad, &PathBuf::from("bad.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("not in the answer space"));
    }

    #[test]
    fn reject_boolean_key_for_free_text() {
        let bad = VALID_TOML.replace("answer = \"went\"", "answer = true");
        let err = parse_exercise_str(&bad, &PathBuf::from("bad.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("does not fit rule 'free_text'"));
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        assert!(parse_exercise_str(bad, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn load_directory_skips_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("verbs.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "not toml {").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let exercises = load_exercise_directory(dir.path()).unwrap();
        assert_eq!(exercises.len(), 1);
        assert_eq!(exercises[0].id, "irregular-verbs");
    }

    #[test]
    fn collect_files_recurses_in_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("unit2")).unwrap();
        std::fs::write(dir.path().join("b.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("unit2").join("a.toml"), PICK_TOML).unwrap();
        std::fs::write(dir.path().join("readme.md"), "ignored").unwrap();

        let files = collect_exercise_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("b.toml"));
        assert!(files[1].ends_with("unit2/a.toml"));
    }

    #[test]
    fn warn_on_missing_context() {
        let toml = VALID_TOML.replace("context = \"Topic: Irregular past simple\"", "");
        let ex = parse_exercise_str(&toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_exercise(&ex);
        assert!(warnings.iter().any(|w| w.message.contains("context is empty")));
    }

    #[test]
    fn builtin_catalog_has_no_warnings() {
        for ex in crate::catalog::all() {
            let warnings = validate_exercise(&ex);
            assert!(warnings.is_empty(), "{}: {:?}", ex.id, warnings);
        }
    }
}
