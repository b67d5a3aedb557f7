use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

/// Input action that can be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    TogglePlayback,
    ToggleText,
    ScrollUp,
    ScrollDown,
    ScrollHalfPageUp,
    ScrollHalfPageDown,
    JumpToFirst,
    JumpToLast,
    None,
}

impl Action {
    /// Actions that move the calendar under the user's hand
    pub fn is_scroll(self) -> bool {
        matches!(
            self,
            Action::ScrollUp | Action::ScrollDown | Action::ScrollHalfPageUp | Action::ScrollHalfPageDown
        )
    }
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        // Quit
        (KeyCode::Char('q'), KeyModifiers::NONE) => Action::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,
        (KeyCode::Esc, _) => Action::Quit,

        // Playback
        (KeyCode::Char(' '), _) => Action::TogglePlayback,
        (KeyCode::Char('t'), KeyModifiers::NONE) => Action::ToggleText,

        // Scrolling
        (KeyCode::Char('j'), KeyModifiers::NONE) => Action::ScrollDown,
        (KeyCode::Down, _) => Action::ScrollDown,
        (KeyCode::Char('k'), KeyModifiers::NONE) => Action::ScrollUp,
        (KeyCode::Up, _) => Action::ScrollUp,
        (KeyCode::Char('d'), KeyModifiers::CONTROL) => Action::ScrollHalfPageDown,
        (KeyCode::PageDown, _) => Action::ScrollHalfPageDown,
        (KeyCode::Char('u'), KeyModifiers::CONTROL) => Action::ScrollHalfPageUp,
        (KeyCode::PageUp, _) => Action::ScrollHalfPageUp,

        // Jumps
        (KeyCode::Char('g'), KeyModifiers::NONE) => Action::JumpToFirst,
        (KeyCode::Home, _) => Action::JumpToFirst,
        (KeyCode::Char('G'), _) => Action::JumpToLast,
        (KeyCode::End, _) => Action::JumpToLast,

        _ => Action::None,
    }
}

/// Mouse wheel scrolls the calendar
pub fn handle_mouse_event(mouse: MouseEvent) -> Action {
    match mouse.kind {
        MouseEventKind::ScrollDown => Action::ScrollDown,
        MouseEventKind::ScrollUp => Action::ScrollUp,
        _ => Action::None,
    }
}
