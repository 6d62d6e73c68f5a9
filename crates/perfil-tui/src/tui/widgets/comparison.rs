// Comparison table: the athlete's raw values against the reference
// population mean and standard deviation, one row per column.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Row, Table};
use ratatui::Frame;

use perfil_eval::report::{AthleteReport, ComparisonRow, RowFlag};

use super::fmt_opt;

pub fn render(frame: &mut Frame, area: Rect, report: &AthleteReport) {
    let header = Row::new(vec![
        Cell::from("Metric"),
        Cell::from("Athlete"),
        Cell::from("Mean"),
        Cell::from("SD"),
        Cell::from("Note"),
    ])
    .style(
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = report
        .rows
        .iter()
        .map(|row| {
            let style = match row.flag {
                Some(_) => Style::default().fg(Color::Yellow),
                None => Style::default(),
            };
            Row::new(row_cells(row).map(Cell::from)).style(style)
        })
        .collect();

    let widths = [
        Constraint::Min(22),
        Constraint::Length(9),
        Constraint::Length(9),
        Constraint::Length(8),
        Constraint::Length(14),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title(report)),
    );
    frame.render_widget(table, area);
}

/// Cell texts for one row: column, athlete value, mean, SD, note.
pub fn row_cells(row: &ComparisonRow) -> [String; 5] {
    let stats = row.reference.rounded();
    [
        row.column.clone(),
        fmt_opt(row.athlete_value, 1),
        format!("{:.1}", stats.mean),
        format!("{:.1}", stats.std),
        flag_note(row.flag).to_string(),
    ]
}

pub fn flag_note(flag: Option<RowFlag>) -> &'static str {
    match flag {
        Some(RowFlag::MissingPopulationColumn) => "not in group",
        Some(RowFlag::NoPopulationValues) => "no group data",
        None => "",
    }
}

fn title(report: &AthleteReport) -> String {
    let mut title = format!(
        "{} vs {} (n={})",
        report.section, report.reference_category, report.population_size
    );
    if !report.warnings.is_empty() {
        title.push_str(&format!(" [{} warnings]", report.warnings.len()));
    }
    title
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
