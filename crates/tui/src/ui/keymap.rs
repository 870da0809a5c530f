use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    Cancel,
    NextField,
    PrevField,
    Submit,
    Backspace,
    Up,
    Down,
    Left,
    Right,
    ToggleMode,
    Input(char),
    None,
}

/// Maps a key press to an action. While `typing`, plain characters are
/// always input so that `q` and friends can be typed.
pub fn map_key(key: KeyEvent, typing: bool) -> AppAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => AppAction::Quit,
            KeyCode::Char('n') => AppAction::ToggleMode,
            _ => AppAction::None,
        };
    }

    match key.code {
        KeyCode::Char('q') if !typing => AppAction::Quit,
        KeyCode::Esc => AppAction::Cancel,
        KeyCode::Tab => AppAction::NextField,
        KeyCode::BackTab => AppAction::PrevField,
        KeyCode::Enter => AppAction::Submit,
        KeyCode::Backspace => AppAction::Backspace,
        KeyCode::Up => AppAction::Up,
        KeyCode::Down => AppAction::Down,
        KeyCode::Left => AppAction::Left,
        KeyCode::Right => AppAction::Right,
        KeyCode::Char(ch) => AppAction::Input(ch),
        _ => AppAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn q_quits_only_outside_text_input() {
        assert_eq!(map_key(key(KeyCode::Char('q')), false), AppAction::Quit);
        assert_eq!(
            map_key(key(KeyCode::Char('q')), true),
            AppAction::Input('q')
        );
    }

    #[test]
    fn ctrl_shortcuts() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        let ctrl_n = KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL);
        assert_eq!(map_key(ctrl_c, true), AppAction::Quit);
        assert_eq!(map_key(ctrl_n, true), AppAction::ToggleMode);
    }
}
