use std::path::PathBuf;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use survey_cli::types::{OutputStatus, OutputSummary, ProcessResult};

pub fn print_summary(result: &ProcessResult) {
    println!("Survey: {}", result.survey_id);
    println!("Output: {}", result.output_dir.display());

    let mut table = Table::new();
    table.set_header(vec![header_cell("Measure"), header_cell("Value")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    let stats = &result.stats;
    table.add_row(vec![Cell::new("Responses"), Cell::new(result.responses)]);
    table.add_row(vec![Cell::new("Questions"), Cell::new(result.questions)]);
    table.add_row(vec![
        Cell::new("Dataset"),
        Cell::new(format!("{} x {}", result.rows, result.columns)),
    ]);
    table.add_row(vec![Cell::new("Answers applied"), Cell::new(stats.applied)]);
    table.add_row(vec![
        Cell::new("Answers dropped"),
        count_cell(stats.dropped(), Color::Yellow),
    ]);
    table.add_row(vec![
        dim_cell("  unresolved"),
        count_cell(stats.unresolved, Color::Yellow),
    ]);
    table.add_row(vec![
        dim_cell("  without value"),
        count_cell(stats.missing_value, Color::Yellow),
    ]);
    table.add_row(vec![
        dim_cell("  unknown kind"),
        count_cell(stats.unsupported, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Out of bounds"),
        count_cell(stats.out_of_bounds, Color::Yellow),
    ]);
    println!("{table}");

    if !result.outputs.is_empty() {
        print_output_table(&result.outputs);
    }
    if !result.errors.is_empty() {
        eprintln!("Errors:");
        for error in &result.errors {
            eprintln!("- {error}");
        }
    }
}

fn print_output_table(outputs: &[OutputSummary]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Format"),
        header_cell("Status"),
        header_cell("Files"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    for output in outputs {
        table.add_row(vec![
            Cell::new(output.format.as_str())
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            status_cell(&output.status),
            Cell::new(file_list(&output.files)),
        ]);
    }
    println!();
    println!("Outputs:");
    println!("{table}");
}

fn file_list(files: &[PathBuf]) -> String {
    files
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

fn status_cell(status: &OutputStatus) -> Cell {
    match status {
        OutputStatus::Written => Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        OutputStatus::Recoded { columns } => {
            Cell::new(format!("✓ recoded {}", columns.join(", "))).fg(Color::Yellow)
        }
        OutputStatus::Failed(message) => Cell::new(format!("✗ {message}"))
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(80);
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

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
