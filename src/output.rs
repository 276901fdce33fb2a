use std::error::Error;

use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::table::{SortDirection, TableView, COLUMNS};
use crate::util::format_int;

/// Print the current page of the view as a markdown-style grid, preceded by
/// a status line with the filtered record count and page position.
pub fn print_page(view: &TableView) {
    let pages = view.page_count().max(1);
    let mut status = format!(
        "{} records | page {} of {}",
        format_int(view.filtered_count()),
        view.page() + 1,
        pages
    );
    if !view.filter().is_empty() {
        status.push_str(&format!(" | filter: \"{}\"", view.filter()));
    }
    println!("{}", status);

    let rows = view.page_rows();
    if rows.is_empty() {
        println!("(no rows)\n");
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(COLUMNS.iter().enumerate().map(|(i, c)| header_label(view, i, c.label)));
    for row in rows {
        builder.push_record(COLUMNS.iter().map(|c| c.render(row)));
    }
    let table = builder.build().with(Style::markdown()).to_string();
    println!("{}\n", table);
}

fn header_label(view: &TableView, index: usize, label: &str) -> String {
    match view.sort_state() {
        Some((col, SortDirection::Ascending)) if col == index => format!("{} ^", label),
        Some((col, SortDirection::Descending)) if col == index => format!("{} v", label),
        _ => label.to_string(),
    }
}

/// Print the numbered column list used by the `sort` command.
pub fn print_columns() {
    for (i, c) in COLUMNS.iter().enumerate() {
        println!("[{}] {}", i + 1, c.label);
    }
    println!();
}

/// Export the full filtered-and-sorted view (all pages) as CSV, cells
/// rendered exactly as displayed.
pub fn write_view_csv(path: &str, view: &TableView) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(COLUMNS.iter().map(|c| c.label))?;
    for row in view.ordered_rows() {
        wtr.write_record(COLUMNS.iter().map(|c| c.render(row)))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}
