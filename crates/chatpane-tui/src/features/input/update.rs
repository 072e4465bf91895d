//! Key handling for the input box.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::InputState;

/// What a key press did to the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Plain Enter: send the current value.
    Submit,
    Edited,
    Ignored,
}

/// Applies an editing key. Enter without Shift or Alt submits.
pub fn handle_key(input: &mut InputState, key: KeyEvent) -> InputAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let newline_modifier = key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT);

    match key.code {
        KeyCode::Enter if newline_modifier => input.insert_char('\n'),
        KeyCode::Enter => return InputAction::Submit,
        KeyCode::Char('j') if ctrl => input.insert_char('\n'),
        KeyCode::Char('a') if ctrl => input.move_home(),
        KeyCode::Char('e') if ctrl => input.move_end(),
        KeyCode::Char(ch) if !ctrl => input.insert_char(ch),
        KeyCode::Tab => input.insert_char('\t'),
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Home => input.move_home(),
        KeyCode::End => input.move_end(),
        _ => return InputAction::Ignored,
    }
    InputAction::Edited
}

/// Inserts pasted text, normalizing line endings.
pub fn handle_paste(input: &mut InputState, text: &str) {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    input.insert_str(&normalized);
}
