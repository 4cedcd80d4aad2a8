//! The `worksheet list` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

pub fn execute(dataset: Option<PathBuf>) -> Result<()> {
    let exercises = super::load_catalog(dataset.as_deref())?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Section", "Title", "Kind", "Items"]);

    for ex in &exercises {
        table.add_row(vec![
            Cell::new(&ex.id),
            Cell::new(&ex.section),
            Cell::new(&ex.title),
            Cell::new(ex.rule.as_str()),
            Cell::new(ex.len()),
        ]);
    }

    println!("{table}");
    println!("\nStart with: worksheet practice <ID>");
    Ok(())
}
