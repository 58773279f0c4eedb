use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

/// Screen cells moved per pan key press.
pub const PAN_CELLS: f64 = 4.0;
pub const ZOOM_STEP: f64 = 1.25;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Action {
    /// Direction in screen cells; scaled to world units by the app.
    Pan(f64, f64),
    Zoom(f64),
    TogglePause,
    TimeScale(f64),
    NextSystem,
    ResetView,
    Quit,
}

pub fn collect_input_nonblocking() -> anyhow::Result<Vec<KeyEvent>> {
    let mut out = Vec::new();
    while event::poll(Duration::ZERO)? {
        if let Event::Key(k) = event::read()? {
            if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat {
                out.push(k);
                if out.len() >= 32 {
                    break;
                }
            }
        }
    }
    Ok(out)
}

pub fn map_key(ev: KeyEvent) -> Option<Action> {
    if ev.modifiers.contains(KeyModifiers::CONTROL) && matches!(ev.code, KeyCode::Char('c')) {
        return Some(Action::Quit);
    }
    let action = match ev.code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Action::Pan(-PAN_CELLS, 0.0),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Action::Pan(PAN_CELLS, 0.0),
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Action::Pan(0.0, -PAN_CELLS),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Action::Pan(0.0, PAN_CELLS),
        KeyCode::Char('+') | KeyCode::Char('=') => Action::Zoom(ZOOM_STEP),
        KeyCode::Char('-') | KeyCode::Char('_') => Action::Zoom(1.0 / ZOOM_STEP),
        KeyCode::Char(' ') => Action::TogglePause,
        KeyCode::Char(']') => Action::TimeScale(2.0),
        KeyCode::Char('[') => Action::TimeScale(0.5),
        KeyCode::Tab => Action::NextSystem,
        KeyCode::Char('r') | KeyCode::Char('R') => Action::ResetView,
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Action::Quit,
        _ => return None,
    };
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn movement_and_zoom() {
        assert_eq!(map_key(key(KeyCode::Left)), Some(Action::Pan(-4.0, 0.0)));
        assert_eq!(map_key(key(KeyCode::Char('s'))), Some(Action::Pan(0.0, 4.0)));
        assert_eq!(map_key(key(KeyCode::Char('+'))), Some(Action::Zoom(1.25)));
        assert_eq!(map_key(key(KeyCode::Char('-'))), Some(Action::Zoom(0.8)));
    }

    #[test]
    fn control_keys() {
        assert_eq!(map_key(key(KeyCode::Char('q'))), Some(Action::Quit));
        assert_eq!(map_key(key(KeyCode::Esc)), Some(Action::Quit));
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
        assert_eq!(map_key(key(KeyCode::Char(' '))), Some(Action::TogglePause));
        assert_eq!(map_key(key(KeyCode::Tab)), Some(Action::NextSystem));
        assert_eq!(map_key(key(KeyCode::Char('z'))), None);
    }
}
