use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

/// Processed input events for the editor
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Quit,
    ToggleHelp,
    /// Any key while help is shown
    CloseHelp,
    /// Number key: inventory slot, 0-based
    PickItem(usize),
    Commit,
    Cancel,
    Delete,
    Rotate,
    Pan { dx: i16, dy: i16 },
    ZoomIn,
    ZoomOut,
    ToggleGridLines,
    MousePress { x: u16, y: u16 },
    MouseDrag { x: u16, y: u16 },
    MouseRelease { x: u16, y: u16 },
    Resize { width: u16, height: u16 },
    None,
}

/// Input handler for processing terminal events
pub struct InputHandler {
    help_visible: bool,
}

impl InputHandler {
    pub fn new() -> Self {
        Self { help_visible: false }
    }

    pub fn set_help_visible(&mut self, visible: bool) {
        self.help_visible = visible;
    }

    /// Poll for input events with timeout
    pub fn poll(&mut self, timeout: Duration) -> Option<InputEvent> {
        if event::poll(timeout).ok()? {
            match event::read().ok()? {
                Event::Key(key_event) if key_event.kind != KeyEventKind::Release => Some(self.handle_key(key_event)),
                Event::Mouse(mouse_event) => Some(Self::handle_mouse(mouse_event)),
                Event::Resize(width, height) => Some(InputEvent::Resize { width, height }),
                _ => None,
            }
        } else {
            None
        }
    }

    fn handle_key(&self, event: KeyEvent) -> InputEvent {
        if event.code == KeyCode::Char('c') && event.modifiers.contains(KeyModifiers::CONTROL) {
            return InputEvent::Quit;
        }
        if self.help_visible {
            return InputEvent::CloseHelp;
        }

        match event.code {
            KeyCode::Char('q') => InputEvent::Quit,
            KeyCode::Char('?') => InputEvent::ToggleHelp,

            KeyCode::Char(c @ '1'..='9') => InputEvent::PickItem(c as usize - '1' as usize),

            KeyCode::Enter => InputEvent::Commit,
            KeyCode::Esc => InputEvent::Cancel,
            KeyCode::Char('x') | KeyCode::Delete | KeyCode::Backspace => InputEvent::Delete,
            KeyCode::Char('r') => InputEvent::Rotate,

            KeyCode::Left => InputEvent::Pan { dx: -2, dy: 0 },
            KeyCode::Right => InputEvent::Pan { dx: 2, dy: 0 },
            KeyCode::Up => InputEvent::Pan { dx: 0, dy: -1 },
            KeyCode::Down => InputEvent::Pan { dx: 0, dy: 1 },

            KeyCode::Char('+') | KeyCode::Char('=') => InputEvent::ZoomIn,
            KeyCode::Char('-') | KeyCode::Char('_') => InputEvent::ZoomOut,

            KeyCode::Char('g') => InputEvent::ToggleGridLines,

            _ => InputEvent::None,
        }
    }

    fn handle_mouse(event: MouseEvent) -> InputEvent {
        let (x, y) = (event.column, event.row);
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => InputEvent::MousePress { x, y },
            MouseEventKind::Drag(MouseButton::Left) => InputEvent::MouseDrag { x, y },
            MouseEventKind::Up(MouseButton::Left) => InputEvent::MouseRelease { x, y },
            MouseEventKind::ScrollUp => InputEvent::ZoomIn,
            MouseEventKind::ScrollDown => InputEvent::ZoomOut,
            _ => InputEvent::None,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn mouse(kind: MouseEventKind) -> MouseEvent {
        MouseEvent {
            kind,
            column: 12,
            row: 7,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_number_keys_pick_slots() {
        let handler = InputHandler::new();
        assert_eq!(handler.handle_key(key(KeyCode::Char('1'))), InputEvent::PickItem(0));
        assert_eq!(handler.handle_key(key(KeyCode::Char('9'))), InputEvent::PickItem(8));
        assert_eq!(handler.handle_key(key(KeyCode::Char('0'))), InputEvent::None);
    }

    #[test]
    fn test_session_keys() {
        let handler = InputHandler::new();
        assert_eq!(handler.handle_key(key(KeyCode::Enter)), InputEvent::Commit);
        assert_eq!(handler.handle_key(key(KeyCode::Esc)), InputEvent::Cancel);
        assert_eq!(handler.handle_key(key(KeyCode::Char('x'))), InputEvent::Delete);
        assert_eq!(handler.handle_key(key(KeyCode::Char('r'))), InputEvent::Rotate);
    }

    #[test]
    fn test_help_swallows_keys() {
        let mut handler = InputHandler::new();
        handler.set_help_visible(true);
        assert_eq!(handler.handle_key(key(KeyCode::Char('x'))), InputEvent::CloseHelp);
        let ctrl_c = KeyEvent {
            modifiers: KeyModifiers::CONTROL,
            ..key(KeyCode::Char('c'))
        };
        assert_eq!(handler.handle_key(ctrl_c), InputEvent::Quit);
    }

    #[test]
    fn test_mouse_gesture() {
        assert_eq!(
            InputHandler::handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left))),
            InputEvent::MousePress { x: 12, y: 7 }
        );
        assert_eq!(
            InputHandler::handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left))),
            InputEvent::MouseDrag { x: 12, y: 7 }
        );
        assert_eq!(
            InputHandler::handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left))),
            InputEvent::MouseRelease { x: 12, y: 7 }
        );
        assert_eq!(
            InputHandler::handle_mouse(mouse(MouseEventKind::Moved)),
            InputEvent::None
        );
    }
}
