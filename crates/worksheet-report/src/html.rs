//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use worksheet_core::report::{ExerciseReport, WorksheetReport};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn score_class(score: f64) -> &'static str {
    if score >= 0.8 {
        "good"
    } else if score >= 0.5 {
        "fair"
    } else {
        "poor"
    }
}

/// Generate an HTML report from a worksheet report.
pub fn generate_html(report: &WorksheetReport) -> String {
    let mut html = String::new();
    let (correct, total) = report.totals();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>Worksheet report</title>\n");
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>Worksheet report</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">{} exercises | {}/{} correct | {}</p>\n",
        report.exercises.len(),
        correct,
        total,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Summary
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Exercise</th><th>Score</th><th>Mistakes</th><th>Badge</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for ex in &report.exercises {
        let badge = ex
            .feedback
            .as_ref()
            .map(|f| format!("{} {}", f.badge_emoji, f.badge_name))
            .unwrap_or_else(|| "-".to_string());
        html.push_str(&format!(
            "<tr><td><a href=\"#{}\">{}</a></td><td class=\"{}\">{}/{}</td><td>{}</td><td>{}</td></tr>\n",
            html_escape(&ex.exercise_id),
            html_escape(&ex.title),
            score_class(ex.score()),
            ex.correct,
            ex.total,
            ex.mistakes.len(),
            html_escape(&badge),
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Per-exercise detail
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Exercises</h2>\n");
    for ex in &report.exercises {
        html.push_str(&exercise_section(ex));
    }
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

fn exercise_section(ex: &ExerciseReport) -> String {
    let mut html = String::new();
    let id = html_escape(&ex.exercise_id);

    html.push_str(&format!("<article id=\"{id}\" data-exercise=\"{id}\">\n"));
    html.push_str(&format!(
        "<h3>{} <span class=\"score {}\">{}/{}</span></h3>\n",
        html_escape(&ex.title),
        score_class(ex.score()),
        ex.correct,
        ex.total
    ));

    html.push_str(
        "<label><input type=\"checkbox\" onchange=\"toggleMistakes(this)\"> Mistakes only</label>\n",
    );
    html.push_str("<table class=\"items\">\n");
    html.push_str("<thead><tr><th>#</th><th>Question</th><th>Your answer</th><th>Correct answer</th><th>Result</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for item in &ex.items {
        let (class, mark) = if item.correct {
            ("pass", "&#10003;")
        } else {
            ("fail", "&#10007;")
        };
        html.push_str(&format!(
            "<tr class=\"{class}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{mark}</td></tr>\n",
            item.id,
            html_escape(&item.question),
            html_escape(&item.user_answer),
            html_escape(&item.correct_answer),
        ));
    }
    html.push_str("</tbody></table>\n");

    if let Some(feedback) = &ex.feedback {
        html.push_str("<div class=\"coach\">\n");
        html.push_str(&format!(
            "<p class=\"badge\"><span class=\"emoji\">{}</span> <strong>{}</strong> +{} XP</p>\n",
            html_escape(&feedback.badge_emoji),
            html_escape(&feedback.badge_name),
            feedback.xp_earned
        ));
        html.push_str(&format!(
            "<h4>{}</h4>\n<p>{}</p>\n",
            html_escape(&feedback.feedback_title),
            html_escape(&feedback.feedback_message)
        ));
        if !feedback.key_tip.is_empty() {
            html.push_str(&format!(
                "<p class=\"tip\">Tip: {}</p>\n",
                html_escape(&feedback.key_tip)
            ));
        }
        html.push_str("</div>\n");
    } else if let Some(error) = &ex.feedback_error {
        html.push_str(&format!(
            "<div class=\"coach unavailable\"><p>{}</p></div>\n",
            html_escape(error)
        ));
    }

    html.push_str("</article>\n");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &WorksheetReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; --accent: #eef2ff; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; --accent: #1e1b4b; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
.good { color: #16a34a; }
.fair { color: #ca8a04; }
.poor { color: #dc2626; }
article { margin-bottom: 2.5rem; }
.coach { background: var(--accent); border-radius: 8px; padding: 1rem 1.5rem; }
.coach .emoji { font-size: 1.5rem; }
.unavailable { font-style: italic; }
.tip { font-weight: bold; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
"#;

const JS: &str = r#"
function toggleMistakes(box) {
  const rows = box.closest('article').querySelectorAll('table.items tbody tr.pass');
  rows.forEach(r => { r.style.display = box.checked ? 'none' : ''; });
}
"#;
