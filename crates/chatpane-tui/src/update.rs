//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};
use ratatui::layout::Rect;

use crate::effects::{self, UiEffect};
use crate::events::UiEvent;
use crate::input::{self, InputAction};
use crate::state::AppState;
use crate::{render, transcript};

/// Rows scrolled per mouse wheel notch.
const MOUSE_SCROLL_ROWS: usize = 3;

/// The main reducer function.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            app.spinner_frame = app.spinner_frame.wrapping_add(1);
            vec![]
        }
        UiEvent::Frame { width, height } => {
            handle_frame(app, width, height);
            vec![]
        }
        UiEvent::Terminal(term_event) => handle_terminal_event(app, term_event),
        UiEvent::Widget(widget_event) => effects::from_widget(app.widget.handle(widget_event)),
        UiEvent::TypewriterSaved { result } => {
            if let Err(err) = result {
                app.notice = Some(format!("Could not save setting: {err}"));
            }
            vec![]
        }
    }
}

/// Recomputes transcript layout for the current terminal size.
fn handle_frame(app: &mut AppState, width: u16, height: u16) {
    app.terminal_size = (width, height);
    let layout = render::layout(app, Rect::new(0, 0, width, height));
    let pane = layout.transcript;
    let total_rows = transcript::build_lines(
        app.widget.transcript(),
        &app.labels,
        transcript::text_width(pane.width),
    )
    .len();
    app.transcript.sync(
        app.widget.transcript().revision(),
        total_rows,
        usize::from(pane.height),
    );
}

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) => handle_key(app, key),
        Event::Mouse(mouse) if app.widget.is_open() => {
            match mouse.kind {
                MouseEventKind::ScrollUp => app.transcript.scroll_up(MOUSE_SCROLL_ROWS),
                MouseEventKind::ScrollDown => app.transcript.scroll_down(MOUSE_SCROLL_ROWS),
                _ => {}
            }
            vec![]
        }
        Event::Paste(text) if app.widget.is_open() => {
            input::handle_paste(&mut app.input, &text);
            vec![]
        }
        _ => vec![],
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    if matches!(key.kind, KeyEventKind::Release) {
        return vec![];
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c' | 'q') if ctrl => return vec![UiEffect::Quit],
        KeyCode::Char('t') if ctrl => {
            app.widget.toggle();
            return vec![];
        }
        KeyCode::Char('y') if ctrl => return toggle_typewriter(app),
        _ => {}
    }

    if !app.widget.is_open() {
        // The launcher line acts as the toggle button.
        if key.code == KeyCode::Enter {
            app.widget.open();
        }
        return vec![];
    }

    match key.code {
        KeyCode::Esc => {
            app.widget.close();
            vec![]
        }
        KeyCode::PageUp => {
            app.transcript.page_up();
            vec![]
        }
        KeyCode::PageDown => {
            app.transcript.page_down();
            vec![]
        }
        _ => match input::handle_key(&mut app.input, key) {
            InputAction::Submit => {
                app.notice = None;
                effects::from_widget(app.widget.send_message(&mut app.input))
            }
            InputAction::Edited | InputAction::Ignored => vec![],
        },
    }
}

fn toggle_typewriter(app: &mut AppState) -> Vec<UiEffect> {
    let enabled = !app.widget.options().typewriter;
    app.widget.set_typewriter(enabled);
    app.notice = Some(format!(
        "Typewriter {}",
        if enabled { "on" } else { "off" }
    ));
    vec![UiEffect::PersistTypewriter { enabled }]
}

#[cfg(test)]
mod tests {
    use chatpane_core::config::Config;
    use chatpane_core::message::Sender;
    use chatpane_core::widget::{WidgetEffect, WidgetEvent};

    use super::*;

    fn app() -> AppState {
        AppState::new(&Config::default())
    }

    fn press(app: &mut AppState, code: KeyCode, modifiers: KeyModifiers) -> Vec<UiEffect> {
        update(app, UiEvent::Terminal(Event::Key(KeyEvent::new(code, modifiers))))
    }

    fn type_text(app: &mut AppState, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch), KeyModifiers::NONE);
        }
    }

    #[test]
    fn test_ctrl_t_toggles_panel() {
        let mut app = app();
        assert!(!app.widget.is_open());
        press(&mut app, KeyCode::Char('t'), KeyModifiers::CONTROL);
        assert!(app.widget.is_open());
        press(&mut app, KeyCode::Char('t'), KeyModifiers::CONTROL);
        assert!(!app.widget.is_open());
    }

    #[test]
    fn test_esc_closes_and_enter_on_launcher_opens() {
        let mut app = app();
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert!(app.widget.is_open());
        press(&mut app, KeyCode::Esc, KeyModifiers::NONE);
        assert!(!app.widget.is_open());
    }

    #[test]
    fn test_typing_ignored_while_closed() {
        let mut app = app();
        type_text(&mut app, "hi");
        assert!(app.input.is_empty());
    }

    #[test]
    fn test_enter_sends_and_clears_input() {
        let mut app = app();
        app.widget.open();
        type_text(&mut app, "Hello");

        let effects = press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::Widget(WidgetEffect::Dispatch(dispatch))] if dispatch.message == "Hello"
        ));
        assert!(app.input.is_empty());
        let last = app.widget.transcript().last().unwrap();
        assert_eq!(last.sender(), Sender::User);
        assert_eq!(last.text(), "Hello");
    }

    #[test]
    fn test_blank_enter_sends_nothing() {
        let mut app = app();
        app.widget.open();
        type_text(&mut app, "   ");
        let effects = press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert!(effects.is_empty());
        assert!(app.widget.transcript().is_empty());
    }

    #[test]
    fn test_reply_starts_reveal() {
        let mut app = app();
        app.widget.open();
        type_text(&mut app, "Hello");
        let effects = press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        let Some(UiEffect::Widget(WidgetEffect::Dispatch(dispatch))) = effects.first() else {
            panic!("expected dispatch");
        };

        let effects = update(
            &mut app,
            UiEvent::Widget(WidgetEvent::DispatchFinished {
                id: dispatch.id,
                outcome: Ok("Hi".to_string()),
            }),
        );
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::Widget(WidgetEffect::StartReveal(job))] if job.steps == 2
        ));
        assert!(app.is_busy());
    }

    #[test]
    fn test_ctrl_y_toggles_typewriter_and_persists() {
        let mut app = app();
        assert!(app.widget.options().typewriter);
        let effects = press(&mut app, KeyCode::Char('y'), KeyModifiers::CONTROL);
        assert!(!app.widget.options().typewriter);
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::PersistTypewriter { enabled: false }]
        ));
        assert_eq!(app.notice.as_deref(), Some("Typewriter off"));
    }

    #[test]
    fn test_save_failure_sets_notice() {
        let mut app = app();
        update(
            &mut app,
            UiEvent::TypewriterSaved {
                result: Err("read-only".to_string()),
            },
        );
        assert_eq!(
            app.notice.as_deref(),
            Some("Could not save setting: read-only")
        );
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        let effects = press(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(matches!(effects.as_slice(), [UiEffect::Quit]));
        let effects = press(&mut app, KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(matches!(effects.as_slice(), [UiEffect::Quit]));
    }

    #[test]
    fn test_frame_follows_new_entries() {
        let mut app = app();
        app.widget.open();
        for idx in 0..30 {
            app.widget.append_message(Sender::Bot, format!("line {idx}"));
        }
        update(&mut app, UiEvent::Frame { width: 80, height: 24 });
        assert!(app.transcript.is_following());
        assert_eq!(app.transcript.offset(), app.transcript.max_offset());
        assert!(app.transcript.offset() > 0);

        press(&mut app, KeyCode::PageUp, KeyModifiers::NONE);
        assert!(!app.transcript.is_following());

        app.widget.append_message(Sender::Bot, "new");
        update(&mut app, UiEvent::Frame { width: 80, height: 24 });
        assert!(app.transcript.is_following());
    }
}
