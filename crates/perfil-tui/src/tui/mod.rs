// TUI dashboard: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` holding the current selection and the report
// assembled for it. Key presses mutate the selection and yield commands;
// `apply_command` runs them against the `App` and stores the result for
// `render_frame` to draw.

pub mod input;
pub mod layout;
pub mod widgets;

use std::time::Duration;

use chrono::NaiveDate;
use crossterm::event::{self, Event};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;
use tracing::{info, warn};

use perfil_eval::report::{AthleteReport, GroupReport};

use crate::app::{App, CategoryEntry, UserCommand};
use layout::{build_layout, AppLayout};

/// How long to wait for input before redrawing.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Individual,
    Group,
}

/// What the main panel shows.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Nothing to show, with the reason.
    Empty(String),
    Athlete(Box<AthleteReport>),
    Group(GroupReport),
    /// The report could not be built.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ViewState {
    pub categories: Vec<CategoryEntry>,
    pub category_idx: usize,
    /// Athletes of the selected category.
    pub athletes: Vec<String>,
    pub athlete_idx: usize,
    pub sections: Vec<String>,
    pub section_idx: usize,
    pub view: ViewMode,
    pub content: Content,
    /// One-line feedback shown in the help bar (export results, errors).
    pub message: Option<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            categories: Vec::new(),
            category_idx: 0,
            athletes: Vec::new(),
            athlete_idx: 0,
            sections: Vec::new(),
            section_idx: 0,
            view: ViewMode::Individual,
            content: Content::Empty("No data loaded.".into()),
            message: None,
        }
    }
}

impl ViewState {
    /// Initial state for a loaded app: first category, first athlete, first
    /// section, with the report already assembled.
    pub fn new(app: &mut App) -> Self {
        let mut state = ViewState {
            categories: app.categories(),
            sections: app.section_names(),
            ..ViewState::default()
        };
        reload_athletes(app, &mut state);
        refresh_content(app, &mut state);
        state
    }

    pub fn selected_category(&self) -> Option<&CategoryEntry> {
        self.categories.get(self.category_idx)
    }

    pub fn selected_athlete(&self) -> Option<&str> {
        self.athletes.get(self.athlete_idx).map(String::as_str)
    }

    pub fn selected_section(&self) -> Option<&str> {
        self.sections.get(self.section_idx).map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Command processing
// ---------------------------------------------------------------------------

/// Run one command. Returns false when the dashboard should exit.
pub fn apply_command(
    app: &mut App,
    state: &mut ViewState,
    command: UserCommand,
    today: NaiveDate,
) -> bool {
    match command {
        UserCommand::Quit => return false,
        UserCommand::CategoryChanged => {
            state.message = None;
            reload_athletes(app, state);
            refresh_content(app, state);
        }
        UserCommand::Refresh => {
            state.message = None;
            refresh_content(app, state);
        }
        UserCommand::Export => export_current(app, state, today),
    }
    true
}

fn reload_athletes(app: &App, state: &mut ViewState) {
    state.athletes = match state.selected_category() {
        Some(category) => app.athletes(&category.name),
        None => Vec::new(),
    };
    if state.athlete_idx >= state.athletes.len() {
        state.athlete_idx = 0;
    }
}

fn refresh_content(app: &mut App, state: &mut ViewState) {
    let (Some(category), Some(section)) = (
        state.selected_category().map(|c| c.name.clone()),
        state.selected_section().map(str::to_string),
    ) else {
        state.content = Content::Empty("No data loaded.".into());
        return;
    };

    state.content = match state.view {
        ViewMode::Individual => match state.selected_athlete() {
            None => Content::Empty("No athletes in this category.".into()),
            Some(athlete) => match app.athlete_report(&category, athlete, &section) {
                Ok(report) => Content::Athlete(Box::new(report)),
                Err(e) => {
                    warn!("{}", e);
                    Content::Failed(e.to_string())
                }
            },
        },
        ViewMode::Group => match app.group_report(&category, &section) {
            Ok(report) => Content::Group(report),
            Err(e) => {
                warn!("{}", e);
                Content::Failed(e.to_string())
            }
        },
    };
}

fn export_current(app: &mut App, state: &mut ViewState, today: NaiveDate) {
    if state.view != ViewMode::Individual {
        state.message = Some("Switch to the individual view (v) to export.".into());
        return;
    }
    let (Some(category), Some(athlete), Some(section)) = (
        state.selected_category().map(|c| c.name.clone()),
        state.selected_athlete().map(str::to_string),
        state.selected_section().map(str::to_string),
    ) else {
        state.message = Some("Nothing selected to export.".into());
        return;
    };

    state.message = Some(match app.export(&category, &athlete, &section, None, today) {
        Ok(written) => {
            info!("exported {}", written.html.display());
            format!("Exported {}", written.html.display())
        }
        Err(e) => {
            warn!("export failed: {:#}", e);
            format!("Export failed: {e:#}")
        }
    });
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    let category_rows = u16::try_from(state.categories.len()).unwrap_or(u16::MAX);
    let layout = build_layout(frame.area(), category_rows);

    widgets::status_bar::render(frame, layout.status_bar, state);
    widgets::sidebar::render_categories(frame, layout.categories, state);
    widgets::sidebar::render_athletes(frame, layout.athletes, state);
    render_main(frame, &layout, state);
    render_help_bar(frame, &layout, state);
}

fn render_main(frame: &mut Frame, layout: &AppLayout, state: &ViewState) {
    match &state.content {
        Content::Athlete(report) => {
            widgets::comparison::render(frame, layout.table, report);
            widgets::zscores::render(frame, layout.overview, &report.overview);
            widgets::bars::render(frame, layout.chart, &report.bars);
        }
        Content::Group(report) => {
            let label = state
                .selected_category()
                .map(|c| c.label.as_str())
                .unwrap_or(report.category.as_str());
            widgets::group::render(frame, layout.main, report, label);
        }
        Content::Empty(reason) => {
            let paragraph = Paragraph::new(format!("  {reason}"))
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(paragraph, layout.main);
        }
        Content::Failed(reason) => {
            let paragraph = Paragraph::new(vec![
                Line::from(Span::styled(
                    "  Report cannot be built",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                Line::from(format!("  {reason}")),
            ])
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL));
            frame.render_widget(paragraph, layout.main);
        }
    }
}

fn render_help_bar(frame: &mut Frame, layout: &AppLayout, state: &ViewState) {
    let line = match &state.message {
        Some(message) => Line::from(Span::styled(
            format!(" {message}"),
            Style::default().fg(Color::Yellow),
        )),
        None => Line::from(Span::styled(
            " q:Quit | </>:Category | Up/Down:Athlete | s/1-9:Section | v:View | e:Export",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::DIM),
        )),
    };
    let paragraph = Paragraph::new(line).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, layout.help_bar);
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the dashboard until the user quits.
///
/// The terminal is restored on exit and from the panic hook.
pub fn run(app: &mut App) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));

    let mut state = ViewState::new(app);
    let result = (|| -> anyhow::Result<()> {
        loop {
            terminal.draw(|frame| render_frame(frame, &state))?;

            if !event::poll(POLL_INTERVAL)? {
                continue;
            }
            let Event::Key(key_event) = event::read()? else {
                continue;
            };
            let Some(command) = input::handle_key(key_event, &mut state) else {
                continue;
            };
            let today = chrono::Local::now().date_naive();
            if !apply_command(app, &mut state, command, today) {
                return Ok(());
            }
        }
    })();

    ratatui::restore();
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use perfil_core::config::parse_config;
    use perfil_eval::dataset::{AthleteRecord, Dataset};
    use perfil_eval::metrics::MetricRegistry;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::path::Path;

    const CONFIG: &str = r#"
[data]
evaluations_path = "data.csv"

[category_labels]
A = "Primer Equipo"

[[sections]]
name = "Fuerza"

[[sections.metrics]]
name = "CUAD"
right = "R"
left = "L"
overview = true

[[sections]]
name = "Movilidad"

[[sections.metrics]]
name = "AKE"
right = "AKE DER"
left = "AKE IZQ"
overview = true
"#;

    fn test_app() -> App {
        let config = parse_config(CONFIG).unwrap();
        let records = vec![
            AthleteRecord::new("Ana", "A").with("R", Some(10.0)).with("L", Some(12.0)),
            AthleteRecord::new("Bea", "A").with("R", Some(14.0)).with("L", Some(16.0)),
            AthleteRecord::new("Cami", "A").with("R", Some(18.0)).with("L", Some(20.0)),
            AthleteRecord::new("Dani", "B").with("R", Some(9.0)).with("L", Some(9.0)),
        ];
        let dataset = Dataset::new(vec!["R".into(), "L".into()], records);
        let registry = MetricRegistry::from_config(&config).unwrap();
        App::new(Path::new("."), config, dataset, registry)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, 29).unwrap()
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn view_state_default_is_sensible() {
        let state = ViewState::default();
        assert!(state.categories.is_empty());
        assert!(state.selected_athlete().is_none());
        assert_eq!(state.view, ViewMode::Individual);
        assert!(matches!(state.content, Content::Empty(_)));
        assert!(state.message.is_none());
    }

    #[test]
    fn new_state_selects_first_athlete_report() {
        let mut app = test_app();
        let state = ViewState::new(&mut app);
        assert_eq!(state.selected_category().unwrap().label, "Primer Equipo");
        assert_eq!(state.selected_athlete(), Some("Ana"));
        assert_eq!(state.selected_section(), Some("Fuerza"));
        match &state.content {
            Content::Athlete(report) => assert_eq!(report.athlete, "Ana"),
            other => panic!("expected athlete content, got {other:?}"),
        }
    }

    #[test]
    fn category_change_reloads_athletes() {
        let mut app = test_app();
        let mut state = ViewState::new(&mut app);
        state.category_idx = 1;
        assert!(apply_command(&mut app, &mut state, UserCommand::CategoryChanged, today()));
        assert_eq!(state.athletes, vec!["Dani"]);
        match &state.content {
            Content::Athlete(report) => {
                assert_eq!(report.athlete, "Dani");
                assert!(report.overview.is_insufficient());
            }
            other => panic!("expected athlete content, got {other:?}"),
        }
    }

    #[test]
    fn group_view_and_failed_section() {
        let mut app = test_app();
        let mut state = ViewState::new(&mut app);
        state.view = ViewMode::Group;
        apply_command(&mut app, &mut state, UserCommand::Refresh, today());
        assert!(matches!(&state.content, Content::Group(g) if g.population_size == 3));

        state.view = ViewMode::Individual;
        state.section_idx = 1;
        apply_command(&mut app, &mut state, UserCommand::Refresh, today());
        assert!(matches!(&state.content, Content::Failed(msg) if msg.contains("Movilidad")));
    }

    #[test]
    fn export_requires_individual_view() {
        let mut app = test_app();
        let mut state = ViewState::new(&mut app);
        state.view = ViewMode::Group;
        apply_command(&mut app, &mut state, UserCommand::Export, today());
        assert!(state.message.as_deref().unwrap().contains("individual view"));
    }

    #[test]
    fn quit_stops_the_loop() {
        let mut app = test_app();
        let mut state = ViewState::new(&mut app);
        assert!(!apply_command(&mut app, &mut state, UserCommand::Quit, today()));
    }

    #[test]
    fn render_frame_draws_selection_and_tables() {
        let mut app = test_app();
        let state = ViewState::new(&mut app);
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|frame| render_frame(frame, &state)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Primer Equipo"));
        assert!(text.contains("Bea"));
        assert!(text.contains("[Fuerza]"));
        assert!(text.contains("Z-scores"));
        assert!(text.contains("LSI"));
    }

    #[test]
    fn render_frame_handles_every_content_kind() {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let mut state = ViewState::default();
        terminal.draw(|frame| render_frame(frame, &state)).unwrap();
        assert!(buffer_text(&terminal).contains("No data loaded."));

        state.content = Content::Failed("no valid columns".into());
        terminal.draw(|frame| render_frame(frame, &state)).unwrap();
        assert!(buffer_text(&terminal).contains("Report cannot be built"));
    }
}
