// Picker column: categories on top, athletes of the selected category below.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::tui::ViewState;

fn highlight() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

pub fn render_categories(frame: &mut Frame, area: Rect, state: &ViewState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Category [</>]");

    if state.categories.is_empty() {
        let paragraph = Paragraph::new("  No categories.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = state
        .categories
        .iter()
        .map(|c| {
            ListItem::new(Line::from(vec![
                Span::raw(c.label.clone()),
                Span::styled(format!(" ({})", c.athletes), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(highlight())
        .highlight_symbol("> ");
    let mut list_state = ListState::default().with_selected(Some(state.category_idx));
    frame.render_stateful_widget(list, area, &mut list_state);
}

pub fn render_athletes(frame: &mut Frame, area: Rect, state: &ViewState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Athletes ({})", state.athletes.len()));

    if state.athletes.is_empty() {
        let paragraph = Paragraph::new("  No athletes in this category.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = state
        .athletes
        .iter()
        .map(|name| ListItem::new(name.clone()))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(highlight())
        .highlight_symbol("> ");
    let mut list_state = ListState::default().with_selected(Some(state.athlete_idx));
    frame.render_stateful_widget(list, area, &mut list_state);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::CategoryEntry;

    #[test]
    fn render_does_not_panic_when_empty() {
        let backend = ratatui::backend::TestBackend::new(30, 10);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = ViewState::default();
        terminal
            .draw(|frame| {
                render_categories(frame, Rect::new(0, 0, 30, 4), &state);
                render_athletes(frame, Rect::new(0, 4, 30, 6), &state);
            })
            .unwrap();
    }

    #[test]
    fn render_does_not_panic_with_lists() {
        let backend = ratatui::backend::TestBackend::new(30, 12);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.categories = vec![CategoryEntry {
            name: "Evaluacion_2910".into(),
            label: "Primer Equipo".into(),
            athletes: 2,
        }];
        state.athletes = vec!["Perez Juan".into(), "Gomez Luis".into()];
        state.athlete_idx = 1;
        terminal
            .draw(|frame| {
                render_categories(frame, Rect::new(0, 0, 30, 3), &state);
                render_athletes(frame, Rect::new(0, 3, 30, 9), &state);
            })
            .unwrap();
    }
}
