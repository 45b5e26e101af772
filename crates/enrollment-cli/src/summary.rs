//! Terminal tables for the report grid and the category listing.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use enrollment_core::{Grid, GridLayout, Report};
use enrollment_model::{AxisConfiguration, Dimension, SelectionOptions};

const HEADER_ROWS: [usize; 3] = [0, 2, 3];

pub fn print_report(report: &Report, grid: &Grid, axes: &AxisConfiguration) {
    let criteria = report.criteria();
    println!("Grants: {}", criteria.grants.join(", "));
    println!("Protocols: {}", criteria.protocols.join(", "));
    println!("Period: {} to {}", criteria.start, criteria.end);
    println!(
        "Matched enrollments: {} ({} participants)",
        report.matched_records(),
        report.aggregate().grand_total()
    );
    println!("{}", report_table(grid, axes));
}

/// Grid as a table, one table row per non-blank grid row.
#[must_use]
pub fn report_table(grid: &Grid, axes: &AxisConfiguration) -> Table {
    let layout = GridLayout::new(axes);
    let totals_row = layout.totals_row();
    let mut table = Table::new();
    apply_report_table_style(&mut table);

    for (index, row) in grid.iter_rows().enumerate() {
        if row.iter().all(String::is_empty) {
            continue;
        }
        let cells: Vec<Cell> = row
            .iter()
            .enumerate()
            .map(|(column, text)| {
                if HEADER_ROWS.contains(&index) {
                    header_cell(text)
                } else if column == 0 {
                    label_cell(text, index == totals_row)
                } else if index == totals_row || column == layout.race_total_column() {
                    count_cell(text).add_attribute(Attribute::Bold)
                } else {
                    count_cell(text)
                }
            })
            .collect();
        table.add_row(cells);
    }
    for column in 1..layout.trailer_column() {
        align_column(&mut table, column, CellAlignment::Right);
    }
    table
}

/// Axis labels and selectable values.
#[must_use]
pub fn categories_table(axes: &AxisConfiguration, options: &SelectionOptions) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Field"), header_cell("Values")]);
    apply_table_style(&mut table);
    table.add_row(vec![label_cell("Grant", false), Cell::new(options.grants.join("\n"))]);
    table.add_row(vec![
        label_cell("Protocol", false),
        Cell::new(options.protocols.join("\n")),
    ]);
    for dimension in [Dimension::Race, Dimension::Ethnicity, Dimension::Gender] {
        let values: Vec<String> = axes
            .axis(dimension)
            .categories()
            .iter()
            .map(|category| {
                if category.displayed_as_row {
                    category.label.clone()
                } else {
                    format!("{} (totals only)", category.label)
                }
            })
            .collect();
        table.add_row(vec![
            label_cell(dimension.label(), false),
            Cell::new(values.join("\n")),
        ]);
    }
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn apply_report_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn label_cell(label: &str, is_total: bool) -> Cell {
    let cell = Cell::new(label).add_attribute(Attribute::Bold);
    if is_total {
        cell.fg(Color::Cyan)
    } else {
        cell.fg(Color::Blue)
    }
}

fn count_cell(text: &str) -> Cell {
    match text {
        "0" => dim_cell(text),
        _ => Cell::new(text),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
