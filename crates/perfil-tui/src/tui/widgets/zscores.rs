// Z-score overview: one line per scored metric with a centred gauge and the
// clinical band, or an "insufficient data" panel when nothing was scored.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use perfil_eval::classify::ClinicalBand;
use perfil_eval::zscore::{ZScoreEntry, ZScoreSet};

use super::fmt_opt;

/// Half-width of the gauge in cells; the gauge spans -3..+3.
const GAUGE_HALF: usize = 6;

pub fn render(frame: &mut Frame, area: Rect, set: &ZScoreSet) {
    let block = Block::default().borders(Borders::ALL).title("Z-scores");

    let mut lines: Vec<Line> = Vec::new();
    if set.is_insufficient() {
        lines.push(Line::from(Span::styled(
            " Insufficient data",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!(
                " Fewer than {} athletes with values in {}.",
                set.min_population, set.category
            ),
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        lines.extend(set.entries.iter().map(entry_line));
    }

    for missing in &set.insufficient {
        lines.push(Line::from(Span::styled(
            format!(
                " {}: insufficient data ({}/{})",
                missing.metric, missing.valid_values, set.min_population
            ),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn entry_line(entry: &ZScoreEntry) -> Line<'static> {
    let color = band_color(entry.band);
    Line::from(vec![
        Span::styled(format!(" {:<15}", entry.metric), Style::default().fg(Color::White)),
        Span::styled(format!("{:>6} ", fmt_opt(entry.zscore, 2)), Style::default().fg(color)),
        Span::styled(gauge(entry.zscore), Style::default().fg(color)),
        Span::raw(" "),
        Span::styled(
            entry.band.label(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
    ])
}

/// Colour for a clinical band, red through green.
pub fn band_color(band: ClinicalBand) -> Color {
    match band {
        ClinicalBand::Critical => Color::Red,
        ClinicalBand::Low => Color::LightRed,
        ClinicalBand::BelowAverage => Color::Yellow,
        ClinicalBand::AboveAverage => Color::LightGreen,
        ClinicalBand::Good => Color::Green,
        ClinicalBand::Excellent => Color::Cyan,
        ClinicalBand::NotAvailable => Color::DarkGray,
    }
}

/// Gauge centred on zero: `[------|###---]` for a positive score. Each cell
/// is half a standard deviation; scores beyond +/-3 fill the whole side.
pub fn gauge(zscore: Option<f64>) -> String {
    let Some(z) = zscore.filter(|z| z.is_finite()) else {
        return format!("[{}|{}]", " ".repeat(GAUGE_HALF), " ".repeat(GAUGE_HALF));
    };
    let filled = ((z.abs() * 2.0).round() as usize).min(GAUGE_HALF);
    let empty = GAUGE_HALF - filled;
    if z < 0.0 {
        format!(
            "[{}{}|{}]",
            "-".repeat(empty),
            "#".repeat(filled),
            "-".repeat(GAUGE_HALF)
        )
    } else {
        format!(
            "[{}|{}{}]",
            "-".repeat(GAUGE_HALF),
            "#".repeat(filled),
            "-".repeat(empty)
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
