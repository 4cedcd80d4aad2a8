//! The `worksheet init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("worksheet.toml").exists() {
        println!("worksheet.toml already exists, skipping.");
    } else {
        std::fs::write("worksheet.toml", SAMPLE_CONFIG)?;
        println!("Created worksheet.toml");
    }

    std::fs::create_dir_all("datasets")?;
    let example_path = std::path::Path::new("datasets/example.toml");
    if example_path.exists() {
        println!("datasets/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_DATASET)?;
        println!("Created datasets/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Put your Gemini API key in WORKSHEET_GEMINI_KEY (or edit worksheet.toml)");
    println!("  2. Run: worksheet validate --dataset datasets/example.toml");
    println!("  3. Run: worksheet practice irregular-verbs --dataset datasets");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# worksheet configuration

default_coach = "gemini"
timeout_secs = 60
# datasets = "datasets"

[coaches.gemini]
type = "gemini"
api_key = "${WORKSHEET_GEMINI_KEY}"
model = "gemini-2.5-flash"

[coaches.anthropic]
type = "anthropic"
api_key = "${ANTHROPIC_API_KEY}"

[coaches.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"

# Offline coach with canned feedback
[coaches.mock]
type = "mock"
"#;

const EXAMPLE_DATASET: &str = r#"[exercise]
id = "irregular-verbs"
title = "Extra: Irregular Past Simple"
section = "Grammar"
instructions = "Write the past simple form of each verb."
context = "Topic: Irregular past simple verbs"
example = "go -> went"
rule = { kind = "free_text", expand_contractions = false }

[[items]]
id = 1
prompt = "see"
answer = "saw"

[[items]]
id = 2
prompt = "take"
answer = "took"

[[items]]
id = 3
prompt = "feel"
answer = "felt"

[[items]]
id = 4
prompt = "run"
answer = "ran"
"#;
