//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A `worksheet` command isolated from the developer's config and keys.
fn worksheet(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("worksheet").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("API_KEY")
        .env_remove("WORKSHEET_GEMINI_KEY")
        .env_remove("WORKSHEET_ANTHROPIC_KEY")
        .env_remove("WORKSHEET_OPENAI_KEY");
    cmd
}

const PERFECT_GRANNY: &str = r#"
[answers.granny-doris]
1 = true
2 = "f"
3 = "False"
4 = "no"
5 = "T"
"#;

#[test]
fn help_output() {
    let dir = TempDir::new().unwrap();
    worksheet(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("English practice worksheet"));
}

#[test]
fn version_output() {
    let dir = TempDir::new().unwrap();
    worksheet(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("worksheet"));
}

#[test]
fn list_shows_all_exercises() {
    let dir = TempDir::new().unwrap();
    worksheet(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("granny-doris"))
        .stdout(predicate::str::contains("weather-words"))
        .stdout(predicate::str::contains("Task 7: Responses"))
        .stdout(predicate::str::contains("pick_list"));
}

#[test]
fn show_prints_passage_and_options() {
    let dir = TempDir::new().unwrap();
    worksheet(&dir)
        .args(["show", "helicopter"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Last Sunday, I went in a helicopter"))
        .stdout(predicate::str::contains("B) The storm lasted for a while."));
}

#[test]
fn show_unknown_exercise() {
    let dir = TempDir::new().unwrap();
    worksheet(&dir)
        .args(["show", "task-99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown exercise 'task-99'"));
}

#[test]
fn validate_builtin_exercises() {
    let dir = TempDir::new().unwrap();
    worksheet(&dir)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Task 6: Definitions (6 items"))
        .stdout(predicate::str::contains("All exercises valid"));
}

#[test]
fn validate_rejects_answer_outside_pool() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("bad.toml"),
        r#"
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

[[items]]
id = 1
prompt = "It says meow."
answer = "z"
"#,
    )
    .unwrap();

    worksheet(&dir)
        .args(["validate", "--dataset", "bad.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not in the answer space"));
}

#[test]
fn validate_directory_reports_each_bad_file() {
    let dir = TempDir::new().unwrap();
    worksheet(&dir).arg("init").assert().success();
    std::fs::write(dir.path().join("datasets/broken.toml"), "not toml {").unwrap();

    worksheet(&dir)
        .args(["validate", "--dataset", "datasets"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("broken.toml: ERROR"))
        .stdout(predicate::str::contains("Extra: Irregular Past Simple"))
        .stderr(predicate::str::contains("1 invalid exercise dataset(s)"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    worksheet(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created worksheet.toml"))
        .stdout(predicate::str::contains("Created datasets/example.toml"));

    assert!(dir.path().join("worksheet.toml").exists());
    assert!(dir.path().join("datasets/example.toml").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    worksheet(&dir).arg("init").assert().success();

    worksheet(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn check_perfect_answers() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("answers.toml"), PERFECT_GRANNY).unwrap();

    worksheet(&dir)
        .args(["check", "granny-doris", "--answers", "answers.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Task 1: Granny Doris's Story  5/5"))
        .stdout(predicate::str::contains("[✗]").not());
}

#[test]
fn check_reports_mistakes_with_correct_answers() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("answers.toml"),
        r#"
[answers.past-negatives]
1 = "Trees did not blow down in the tornado."
2 = "it wasnt a hot day yesterday"
"#,
    )
    .unwrap();

    worksheet(&dir)
        .args(["check", "past-negatives", "--answers", "answers.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1/6"))
        .stdout(predicate::str::contains("your answer: it wasnt a hot day yesterday"))
        .stdout(predicate::str::contains("your answer: (empty)"));
}

#[test]
fn check_all_writes_json_and_html() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("answers.toml"), PERFECT_GRANNY).unwrap();

    worksheet(&dir)
        .args([
            "check",
            "--all",
            "--answers",
            "answers.toml",
            "--format",
            "all",
            "--output",
            "out",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("5/40"));

    let files: Vec<_> = std::fs::read_dir(dir.path().join("out"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert!(files.iter().any(|p| p.extension().is_some_and(|e| e == "html")));

    let json_path = files
        .iter()
        .find(|p| p.extension().is_some_and(|e| e == "json"))
        .unwrap();
    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(json_path).unwrap()).unwrap();
    assert_eq!(report["exercises"].as_array().unwrap().len(), 7);
    assert_eq!(report["exercises"][0]["correct"], 5);
}

#[test]
fn check_rejects_invalid_answer() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("answers.toml"),
        "[answers.helicopter]\n1 = \"C\"\n",
    )
    .unwrap();

    worksheet(&dir)
        .args(["check", "helicopter", "--answers", "answers.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("answers.helicopter"));
}

#[test]
fn check_without_coach_key_still_succeeds() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("answers.toml"), PERFECT_GRANNY).unwrap();

    worksheet(&dir)
        .args([
            "check",
            "granny-doris",
            "--answers",
            "answers.toml",
            "--coach",
            "gemini",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("AI Coach is taking a nap"));
}

#[test]
fn check_with_mock_coach() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("answers.toml"), PERFECT_GRANNY).unwrap();

    worksheet(&dir)
        .args([
            "check",
            "granny-doris",
            "--answers",
            "answers.toml",
            "--coach",
            "mock",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("+500 XP"));
}

#[test]
fn practice_session_checks_answers() {
    let dir = TempDir::new().unwrap();

    worksheet(&dir)
        .args(["practice", "granny-doris"])
        .write_stdin("1 t\n2 f\n3 f\n4 f\n5 t\ncheck\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 5/5 Perfect score!"));
}

#[test]
fn practice_edit_after_check_needs_a_new_check() {
    let dir = TempDir::new().unwrap();

    worksheet(&dir)
        .args(["practice", "weather-words"])
        .write_stdin("1 snowing\ncheck\n2 hailing\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 1/6"))
        .stdout(predicate::str::contains("Type `check` to grade again."));
}

#[test]
fn practice_coach_feedback_from_mock() {
    let dir = TempDir::new().unwrap();

    worksheet(&dir)
        .args(["practice", "definitions", "--coach", "mock"])
        .write_stdin("1 a\n2 tsunami\ncheck\ncoach\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 2/6"))
        .stdout(predicate::str::contains("XP"));
}

#[test]
fn practice_uses_external_dataset() {
    let dir = TempDir::new().unwrap();
    worksheet(&dir).arg("init").assert().success();

    worksheet(&dir)
        .args(["practice", "irregular-verbs", "--dataset", "datasets"])
        .write_stdin("1 Saw.\n2 taked\ncheck\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 1/4"));
}
