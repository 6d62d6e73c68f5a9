// Screen layout: panel arrangement and sizing.
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +--------------+-----------------------------------+
// | Categories   | Comparison table (55%)            |
// |              +-----------------+-----------------+
// +--------------+ Z-score overview| Bilateral bars  |
// | Athletes     | (50%)           | (50%)           |
// +--------------+-----------------+-----------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+
//
// The group view uses the whole right-hand side (`main`).

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Width of the picker column.
const SIDEBAR_WIDTH: u16 = 30;

#[derive(Debug, Clone)]
pub struct AppLayout {
    pub status_bar: Rect,
    pub categories: Rect,
    pub athletes: Rect,
    /// Whole right-hand side; `table`, `overview` and `chart` partition it.
    pub main: Rect,
    pub table: Rect,
    pub overview: Rect,
    pub chart: Rect,
    pub help_bar: Rect,
}

/// `category_rows` sizes the category picker (plus its borders).
pub fn build_layout(area: Rect, category_rows: u16) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(10),   // middle section
            Constraint::Length(1), // help bar
        ])
        .split(area);

    let status_bar = vertical[0];
    let middle = vertical[1];
    let help_bar = vertical[2];

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
        .split(middle);

    let sidebar = horizontal[0];
    let main = horizontal[1];

    let pickers = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(category_rows.saturating_add(2).max(3)),
            Constraint::Min(3),
        ])
        .split(sidebar);

    let main_sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(main);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(main_sections[1]);

    AppLayout {
        status_bar,
        categories: pickers[0],
        athletes: pickers[1],
        main,
        table: main_sections[0],
        overview: bottom[0],
        chart: bottom[1],
        help_bar,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_area() -> Rect {
        Rect::new(0, 0, 160, 50)
    }

    #[test]
    fn layout_all_rects_nonzero() {
        let layout = build_layout(test_area(), 3);
        let rects = [
            ("status_bar", layout.status_bar),
            ("categories", layout.categories),
            ("athletes", layout.athletes),
            ("main", layout.main),
            ("table", layout.table),
            ("overview", layout.overview),
            ("chart", layout.chart),
            ("help_bar", layout.help_bar),
        ];
        for (name, rect) in rects {
            assert!(rect.width > 0 && rect.height > 0, "{name} has zero area: {rect:?}");
        }
    }

    #[test]
    fn fixed_rows_and_sidebar() {
        let layout = build_layout(test_area(), 3);
        assert_eq!(layout.status_bar.height, 1);
        assert_eq!(layout.help_bar.height, 1);
        assert_eq!(layout.help_bar.y, 49);
        assert_eq!(layout.categories.width, SIDEBAR_WIDTH);
        assert_eq!(layout.categories.height, 5);
        assert_eq!(layout.main.x, SIDEBAR_WIDTH);
    }

    #[test]
    fn main_is_partitioned() {
        let layout = build_layout(test_area(), 2);
        assert_eq!(layout.table.y, layout.main.y);
        assert_eq!(layout.overview.y, layout.chart.y);
        assert_eq!(
            layout.table.height + layout.overview.height,
            layout.main.height
        );
        assert_eq!(layout.overview.width + layout.chart.width, layout.main.width);
    }
}
