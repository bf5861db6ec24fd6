use std::borrow::Cow;
use std::fmt::Write as _;

use crate::{
    data::display_cell,
    dataset::{ColumnType, Dataset},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Renders an elastic plain-text table with a dashed rule under the header.
pub fn render_table(headers: &[String], rows: &[Vec<String>], aligns: &[Align]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count().max(3)).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(sanitize_cell(cell).chars().count());
        }
    }

    let mut output = String::new();
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    for line in std::iter::once(headers).chain(std::iter::once(rule.as_slice())) {
        let _ = writeln!(output, "{}", format_row(line, &widths, &[]));
    }
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths, aligns));
    }
    output
}

/// Renders up to `limit` rows of a dataset with a `name:type` header.
pub fn render_dataset(dataset: &Dataset, limit: usize) -> String {
    let headers: Vec<String> = dataset
        .columns
        .iter()
        .map(|c| format!("{}:{}", c.name, c.column_type))
        .collect();
    let aligns: Vec<Align> = dataset
        .columns
        .iter()
        .map(|c| match c.column_type {
            ColumnType::Number => Align::Right,
            _ => Align::Left,
        })
        .collect();
    let rows: Vec<Vec<String>> = dataset
        .rows
        .iter()
        .take(limit)
        .map(|row| {
            dataset
                .columns
                .iter()
                .map(|c| display_cell(row.get(&c.name).and_then(Option::as_ref)))
                .collect()
        })
        .collect();
    render_table(&headers, &rows, &aligns)
}

fn format_row(values: &[String], widths: &[usize], aligns: &[Align]) -> String {
    let cells: Vec<String> = values
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(idx, (value, width))| {
            let cell = sanitize_cell(value);
            match aligns.get(idx).copied().unwrap_or(Align::Left) {
                Align::Left => format!("{cell:<width$}"),
                Align::Right => format!("{cell:>width$}"),
            }
        })
        .collect();
    cells.join("  ").trim_end().to_string()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
