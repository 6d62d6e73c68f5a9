// Keyboard input handling.
//
// Selection changes are applied to `ViewState` directly; anything that needs
// the loaded data (rebuilding lists, assembling reports, exporting) is
// returned as a `UserCommand` for the dashboard loop.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::{ViewMode, ViewState};
use crate::app::UserCommand;

pub fn handle_key(key_event: KeyEvent, state: &mut ViewState) -> Option<UserCommand> {
    // Windows reports both press and release.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    match key_event.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(UserCommand::Quit),

        // Category picker
        KeyCode::Left | KeyCode::Char('h') => {
            step_category(state, false).then_some(UserCommand::CategoryChanged)
        }
        KeyCode::Right | KeyCode::Char('l') => {
            step_category(state, true).then_some(UserCommand::CategoryChanged)
        }

        // Athlete picker
        KeyCode::Up | KeyCode::Char('k') => step_athlete(state, false).then_some(UserCommand::Refresh),
        KeyCode::Down | KeyCode::Char('j') => step_athlete(state, true).then_some(UserCommand::Refresh),
        KeyCode::Home => {
            let changed = state.athlete_idx != 0;
            state.athlete_idx = 0;
            changed.then_some(UserCommand::Refresh)
        }
        KeyCode::End => {
            let last = state.athletes.len().saturating_sub(1);
            let changed = state.athlete_idx != last;
            state.athlete_idx = last;
            changed.then_some(UserCommand::Refresh)
        }

        // Sections
        KeyCode::Char('s') | KeyCode::Tab => step_section(state, true).then_some(UserCommand::Refresh),
        KeyCode::Char('S') | KeyCode::BackTab => {
            step_section(state, false).then_some(UserCommand::Refresh)
        }
        KeyCode::Char(c @ '1'..='9') => {
            let idx = (c as usize) - ('1' as usize);
            if idx < state.sections.len() && idx != state.section_idx {
                state.section_idx = idx;
                Some(UserCommand::Refresh)
            } else {
                None
            }
        }

        KeyCode::Char('v') => {
            state.view = match state.view {
                ViewMode::Individual => ViewMode::Group,
                ViewMode::Group => ViewMode::Individual,
            };
            Some(UserCommand::Refresh)
        }

        KeyCode::Char('e') => Some(UserCommand::Export),

        _ => None,
    }
}

/// Move the category selection, wrapping around. Resets the athlete.
fn step_category(state: &mut ViewState, forward: bool) -> bool {
    let len = state.categories.len();
    if len < 2 {
        return false;
    }
    state.category_idx = wrap_step(state.category_idx, len, forward);
    state.athlete_idx = 0;
    true
}

/// Move the athlete selection, clamped to the list.
fn step_athlete(state: &mut ViewState, forward: bool) -> bool {
    let len = state.athletes.len();
    if len == 0 {
        return false;
    }
    let next = if forward {
        (state.athlete_idx + 1).min(len - 1)
    } else {
        state.athlete_idx.saturating_sub(1)
    };
    let changed = next != state.athlete_idx;
    state.athlete_idx = next;
    changed
}

fn step_section(state: &mut ViewState, forward: bool) -> bool {
    let len = state.sections.len();
    if len < 2 {
        return false;
    }
    state.section_idx = wrap_step(state.section_idx, len, forward);
    true
}

fn wrap_step(idx: usize, len: usize, forward: bool) -> usize {
    if forward {
        (idx + 1) % len
    } else {
        (idx + len - 1) % len
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::CategoryEntry;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn state() -> ViewState {
        let mut state = ViewState::default();
        state.categories = ["A", "B"]
            .iter()
            .map(|name| CategoryEntry {
                name: name.to_string(),
                label: name.to_string(),
                athletes: 2,
            })
            .collect();
        state.athletes = vec!["Ana".into(), "Bea".into()];
        state.sections = vec!["Fuerza".into(), "Movilidad".into(), "Funcionalidad".into()];
        state
    }

    #[test]
    fn quit_keys() {
        let mut s = state();
        assert_eq!(handle_key(press(KeyCode::Char('q')), &mut s), Some(UserCommand::Quit));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key(ctrl_c, &mut s), Some(UserCommand::Quit));
    }

    #[test]
    fn category_wraps_and_resets_athlete() {
        let mut s = state();
        s.athlete_idx = 1;
        assert_eq!(
            handle_key(press(KeyCode::Left), &mut s),
            Some(UserCommand::CategoryChanged)
        );
        assert_eq!(s.category_idx, 1);
        assert_eq!(s.athlete_idx, 0);
        handle_key(press(KeyCode::Right), &mut s);
        assert_eq!(s.category_idx, 0);
    }

    #[test]
    fn athlete_selection_is_clamped() {
        let mut s = state();
        assert_eq!(handle_key(press(KeyCode::Up), &mut s), None);
        assert_eq!(handle_key(press(KeyCode::Down), &mut s), Some(UserCommand::Refresh));
        assert_eq!(s.athlete_idx, 1);
        assert_eq!(handle_key(press(KeyCode::Down), &mut s), None);
        assert_eq!(handle_key(press(KeyCode::Home), &mut s), Some(UserCommand::Refresh));
        assert_eq!(s.athlete_idx, 0);
    }

    #[test]
    fn sections_cycle_and_jump() {
        let mut s = state();
        handle_key(press(KeyCode::Char('S')), &mut s);
        assert_eq!(s.section_idx, 2);
        handle_key(press(KeyCode::Tab), &mut s);
        assert_eq!(s.section_idx, 0);
        assert_eq!(handle_key(press(KeyCode::Char('2')), &mut s), Some(UserCommand::Refresh));
        assert_eq!(s.section_idx, 1);
        assert_eq!(handle_key(press(KeyCode::Char('9')), &mut s), None);
    }

    #[test]
    fn view_toggle_and_export() {
        let mut s = state();
        handle_key(press(KeyCode::Char('v')), &mut s);
        assert_eq!(s.view, ViewMode::Group);
        handle_key(press(KeyCode::Char('v')), &mut s);
        assert_eq!(s.view, ViewMode::Individual);
        assert_eq!(handle_key(press(KeyCode::Char('e')), &mut s), Some(UserCommand::Export));
    }

    #[test]
    fn release_events_are_ignored() {
        let mut s = state();
        let mut release = press(KeyCode::Char('q'));
        release.kind = KeyEventKind::Release;
        assert_eq!(handle_key(release, &mut s), None);
    }
}
