use std::path::PathBuf;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use worksheet_core::parser::parse_exercise_str;
use worksheet_core::traits::extract_json_from_markdown;

const REPLY: &str = r#"Here is your feedback!

```json
{
  "badgeName": "Storm Chaser",
  "badgeEmoji": "⛈️",
  "xpEarned": 320,
  "feedbackTitle": "Nearly there!",
  "feedbackMessage": "You know most of the weather words.",
  "keyTip": "Hailing is ice falling from the sky."
}
```
"#;

fn bench_extract_json(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_json");

    group.bench_function("fenced", |b| {
        b.iter(|| extract_json_from_markdown(black_box(REPLY)))
    });

    let raw = "Sure thing: {\"badgeName\": \"x\"} bye";
    group.bench_function("raw", |b| b.iter(|| extract_json_from_markdown(black_box(raw))));

    group.finish();
}

fn bench_parse_exercise(c: &mut Criterion) {
    let mut toml = String::from(
        "[exercise]\nid = \"bench\"\ntitle = \"Bench\"\ncontext = \"Topic\"\nrule = { kind = \"free_text\" }\n",
    );
    for i in 1..=50 {
        toml.push_str(&format!(
            "\n[[items]]\nid = {i}\nprompt = \"Sentence {i}.\"\nanswer = \"Answer {i}\"\n"
        ));
    }
    let path = PathBuf::from("bench.toml");

    c.bench_function("parse_exercise_50_items", |b| {
        b.iter(|| parse_exercise_str(black_box(&toml), &path))
    });
}

criterion_group!(benches, bench_extract_json, bench_parse_exercise);
criterion_main!(benches);
