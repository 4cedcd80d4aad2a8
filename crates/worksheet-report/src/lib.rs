//! worksheet-report: rendering of graded worksheet reports.

pub mod html;

pub use html::{generate_html, write_html_report};
