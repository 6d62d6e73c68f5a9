// Integration tests for the dashboard crate.
//
// These run against the shipped defaults and the sample evaluation sheet in
// data/, driving the same App and ViewState the binary uses.

use std::path::{Path, PathBuf};

use perfil_core::config::{parse_config, validate};
use perfil_eval::dataset::{Dataset, LoadOptions};
use perfil_eval::metrics::MetricRegistry;
use perfil_tui::app::{App, UserCommand};
use perfil_tui::cli;
use perfil_tui::tui::{apply_command, render_frame, Content, ViewMode, ViewState};
use ratatui::backend::TestBackend;
use ratatui::Terminal;

// ===========================================================================
// Test helpers
// ===========================================================================

/// Repository root, two levels above this crate.
fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// Build the app from shipped files without copying anything into config/.
fn sample_app() -> App {
    let root = project_root();
    let text = std::fs::read_to_string(root.join("defaults/dashboard.toml"))
        .expect("defaults/dashboard.toml should exist");
    let config = parse_config(&text).expect("defaults should parse");
    validate(&config).expect("defaults should validate");

    let dataset = Dataset::load_path(
        &root.join(&config.data.evaluations_path),
        &LoadOptions::from_config(&config),
    )
    .expect("sample sheet should load");
    let registry = MetricRegistry::from_config(&config).expect("registry should build");
    App::new(&root, config, dataset, registry)
}

fn today() -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(2024, 10, 29).unwrap()
}

// ===========================================================================
// Tests
// ===========================================================================

#[test]
fn sample_sheet_lists_both_squads() {
    let app = sample_app();
    let text = cli::format_categories(&app.categories());
    assert!(text.contains("Evaluacion_2910"));
    assert!(text.contains("(Primer Equipo)"));
    assert!(text.contains("reserva"));

    let first_team = app.athletes("Evaluacion_2910");
    assert_eq!(first_team.len(), 8);
    assert!(!first_team.iter().any(|n| n == "MEDIA" || n.contains("RIESGO")));
}

#[test]
fn fuerza_report_covers_every_column() {
    let mut app = sample_app();
    let report = app
        .athlete_report("Evaluacion_2910", "Alvarez Tomas", "Fuerza")
        .unwrap();
    // Six bilateral pairs, then three totals.
    assert_eq!(report.rows.len(), 15);
    assert_eq!(report.rows[12].column, "F PICO (IMTP) (N)");
    assert!(report.rows.iter().all(|r| r.flag.is_none()));
    assert_eq!(report.overview.entries.len(), 5);
    assert!(report.overview.insufficient.is_empty());
    assert_eq!(report.bars.labels.len(), 9);
    assert_eq!(report.radar.labels.len(), 5);
}

#[test]
fn dashboard_walkthrough() {
    let mut app = sample_app();
    let mut state = ViewState::new(&mut app);
    assert_eq!(state.selected_athlete(), Some("Alvarez Tomas"));

    // Next category: the reserve squad.
    state.category_idx = 1;
    state.athlete_idx = 0;
    assert!(apply_command(&mut app, &mut state, UserCommand::CategoryChanged, today()));
    assert_eq!(state.athletes.len(), 4);
    assert!(matches!(&state.content, Content::Athlete(r) if r.category == "reserva"));

    state.view = ViewMode::Group;
    state.section_idx = 1;
    apply_command(&mut app, &mut state, UserCommand::Refresh, today());
    match &state.content {
        Content::Group(group) => {
            assert_eq!(group.section, "Movilidad");
            assert_eq!(group.population_size, 4);
        }
        other => panic!("expected group content, got {other:?}"),
    }

    let mut terminal = Terminal::new(TestBackend::new(150, 45)).unwrap();
    terminal.draw(|frame| render_frame(frame, &state)).unwrap();
    let text: String = terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect();
    assert!(text.contains("Movilidad - Reserva (4 athletes)"));
    assert!(text.contains("AKE DER"));
}

#[test]
fn export_from_dashboard_writes_files() {
    let mut app = sample_app();
    let out = std::env::temp_dir().join(format!("perfil_dashboard_export_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&out);

    let written = app
        .export("reserva", "Lopez Ignacio", "Fuerza", Some(&out), today())
        .unwrap();
    assert!(written.html.ends_with("lopez_ignacio_fuerza_20241029.html"));
    let json = std::fs::read_to_string(&written.json).unwrap();
    assert!(json.contains("\"category\": \"Reserva\""));

    let _ = std::fs::remove_dir_all(&out);
}
