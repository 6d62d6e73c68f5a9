// Status bar widget: current selection, section tabs and view mode.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::{ViewMode, ViewState};

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = vec![Span::styled(
        " Perfil ",
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];

    let category = state
        .selected_category()
        .map(|c| c.label.as_str())
        .unwrap_or("--");
    let subject = match state.view {
        ViewMode::Individual => state.selected_athlete().unwrap_or("--"),
        ViewMode::Group => "whole group",
    };
    spans.push(Span::styled(
        format!(" {category} | {subject} | "),
        Style::default().fg(Color::White),
    ));

    spans.extend(section_spans(&state.sections, state.section_idx));
    spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
    spans.push(Span::styled(
        format!("[{}]", view_label(state.view)),
        Style::default().fg(Color::Yellow),
    ));

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Section tabs with the active one highlighted.
pub fn section_spans(sections: &[String], active: usize) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for (i, name) in sections.iter().enumerate() {
        let style = if i == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!("[{name}]"), style));
        spans.push(Span::raw(" "));
    }
    spans
}

pub fn view_label(view: ViewMode) -> &'static str {
    match view {
        ViewMode::Individual => "Individual",
        ViewMode::Group => "Group",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_spans_highlight_active() {
        let sections = vec!["Fuerza".to_string(), "Movilidad".to_string()];
        let spans = section_spans(&sections, 1);
        assert_eq!(spans.len(), 4);
        assert_eq!(spans[0].content, "[Fuerza]");
        assert_eq!(spans[2].content, "[Movilidad]");
        assert_eq!(spans[2].style.bg, Some(Color::White));
        assert_eq!(spans[0].style.bg, None);
    }

    #[test]
    fn view_labels() {
        assert_eq!(view_label(ViewMode::Individual), "Individual");
        assert_eq!(view_label(ViewMode::Group), "Group");
    }

    #[test]
    fn render_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(80, 1);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = ViewState::default();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
