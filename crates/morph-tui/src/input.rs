use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Input action that can be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    FocusNext,
    FocusPrev,
    Toggle,           // Space/Enter: expand or collapse the focused panel
    TogglePause,      // 'p'
    Stop,             // 's': stop where it is
    ToggleLazy,       // 'z'
    ToggleIgnoreWidth,
    ToggleIgnoreHeight,
    SpeedUp,          // '+': smaller divisor
    SlowDown,         // '-': larger divisor
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => Action::Quit,
        (KeyCode::Esc, _) => Action::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,

        (KeyCode::Tab, KeyModifiers::NONE) => Action::FocusNext,
        (KeyCode::Char('l'), KeyModifiers::NONE) => Action::FocusNext,
        (KeyCode::Right, KeyModifiers::NONE) => Action::FocusNext,
        (KeyCode::BackTab, _) => Action::FocusPrev,
        (KeyCode::Char('h'), KeyModifiers::NONE) => Action::FocusPrev,
        (KeyCode::Left, KeyModifiers::NONE) => Action::FocusPrev,

        (KeyCode::Char(' '), KeyModifiers::NONE) => Action::Toggle,
        (KeyCode::Enter, KeyModifiers::NONE) => Action::Toggle,
        (KeyCode::Char('p'), KeyModifiers::NONE) => Action::TogglePause,
        (KeyCode::Char('s'), KeyModifiers::NONE) => Action::Stop,

        (KeyCode::Char('z'), KeyModifiers::NONE) => Action::ToggleLazy,
        (KeyCode::Char('w'), KeyModifiers::NONE) => Action::ToggleIgnoreWidth,
        (KeyCode::Char('e'), KeyModifiers::NONE) => Action::ToggleIgnoreHeight,
        (KeyCode::Char('+'), _) | (KeyCode::Char('='), KeyModifiers::NONE) => Action::SpeedUp,
        (KeyCode::Char('-'), KeyModifiers::NONE) => Action::SlowDown,

        _ => Action::None,
    }
}
