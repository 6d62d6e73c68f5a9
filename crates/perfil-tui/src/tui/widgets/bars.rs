// Bilateral bars: right and left values per metric with the limb symmetry
// index. Totals occupy the right bar only.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use perfil_eval::chart::BilateralChart;

const LABEL_WIDTH: usize = 14;

/// Cells reserved for label, side marker and value text on each line.
const TEXT_WIDTH: usize = LABEL_WIDTH + 12;

pub fn render(frame: &mut Frame, area: Rect, chart: &BilateralChart) {
    let block = Block::default().borders(Borders::ALL).title("Right / Left");
    if chart.is_empty() {
        let paragraph = Paragraph::new("  No metrics to chart.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let bar_width = (area.width as usize).saturating_sub(TEXT_WIDTH + 2).max(4);
    let paragraph = Paragraph::new(chart_lines(chart, bar_width)).block(block);
    frame.render_widget(paragraph, area);
}

/// Two lines per metric (one for totals): label, side, bar and value.
pub fn chart_lines(chart: &BilateralChart, bar_width: usize) -> Vec<Line<'static>> {
    let max = chart
        .right
        .iter()
        .chain(chart.left.iter())
        .copied()
        .fold(0.0_f64, f64::max);

    let mut lines = Vec::new();
    for (i, label) in chart.labels.iter().enumerate() {
        let right = chart.right[i];
        let left = chart.left[i];
        let is_total = chart.totals[i];

        let name: String = label.chars().take(LABEL_WIDTH).collect();
        lines.push(Line::from(vec![
            Span::raw(format!("{name:<LABEL_WIDTH$}")),
            Span::styled(" R ", Style::default().fg(Color::Blue)),
            Span::styled(bar(right, max, bar_width), Style::default().fg(Color::Blue)),
            Span::raw(format!(" {right:.1}")),
        ]));
        if is_total {
            continue;
        }

        let mut spans = vec![
            Span::raw(" ".repeat(LABEL_WIDTH)),
            Span::styled(" L ", Style::default().fg(Color::Magenta)),
            Span::styled(bar(left, max, bar_width), Style::default().fg(Color::Magenta)),
            Span::raw(format!(" {left:.1}")),
        ];
        if let Some(lsi) = chart.lsi[i] {
            spans.push(Span::styled(
                format!("  LSI {lsi:.1}%"),
                Style::default().fg(Color::DarkGray),
            ));
        }
        lines.push(Line::from(spans));
    }
    lines
}

/// Bar of `width` cells scaled against `max`, padded to a fixed width.
pub fn bar(value: f64, max: f64, width: usize) -> String {
    let filled = if max > 0.0 && value > 0.0 {
        ((value / max) * width as f64).round() as usize
    } else {
        0
    };
    let filled = filled.min(width);
    format!("{}{}", "█".repeat(filled), " ".repeat(width - filled))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
