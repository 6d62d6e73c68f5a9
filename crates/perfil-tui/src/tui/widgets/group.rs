// Group profile table: mean, SD, min and max per column for a category.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Row, Table};
use ratatui::Frame;

use perfil_eval::report::{GroupReport, GroupRow};

pub fn render(frame: &mut Frame, area: Rect, report: &GroupReport, category_label: &str) {
    let header = Row::new(vec![
        Cell::from("Metric"),
        Cell::from("Mean"),
        Cell::from("SD"),
        Cell::from("Min"),
        Cell::from("Max"),
        Cell::from("n"),
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
            let style = if row.summary.is_none() {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            Row::new(row_cells(row).map(Cell::from)).style(style)
        })
        .collect();

    let widths = [
        Constraint::Min(22),
        Constraint::Length(9),
        Constraint::Length(8),
        Constraint::Length(9),
        Constraint::Length(9),
        Constraint::Length(4),
    ];

    let title = format!(
        "{} - {} ({} athletes)",
        report.section, category_label, report.population_size
    );
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(table, area);
}

/// Cell texts for one row; columns without values show dashes.
pub fn row_cells(row: &GroupRow) -> [String; 6] {
    match row.summary {
        Some(s) => [
            row.column.clone(),
            format!("{:.1}", s.mean),
            format!("{:.1}", s.std),
            format!("{:.1}", s.min),
            format!("{:.1}", s.max),
            s.n.to_string(),
        ],
        None => [
            row.column.clone(),
            "-".into(),
            "-".into(),
            "-".into(),
            "-".into(),
            "0".into(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perfil_eval::stats::GroupSummary;

    #[test]
    fn row_cells_with_and_without_values() {
        let row = GroupRow {
            column: "AKE DER".into(),
            summary: Some(GroupSummary {
                mean: 41.26,
                std: 3.04,
                min: 35.3,
                max: 47.2,
                n: 8,
            }),
        };
        assert_eq!(row_cells(&row)[1], "41.3");
        assert_eq!(row_cells(&row)[5], "8");

        let empty = GroupRow {
            column: "AKE IZQ".into(),
            summary: None,
        };
        assert_eq!(row_cells(&empty)[1], "-");
    }

    #[test]
    fn render_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(80, 10);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let report = GroupReport {
            category: "reserva".into(),
            section: "Movilidad".into(),
            population_size: 0,
            rows: vec![GroupRow {
                column: "AKE DER".into(),
                summary: None,
            }],
            warnings: vec![],
        };
        terminal
            .draw(|frame| render(frame, frame.area(), &report, "Reserva"))
            .unwrap();
    }
}
