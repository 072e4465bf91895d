//! Pure view functions for the TUI.
//!
//! Functions here take `&AppState`, draw to a ratatui `Frame`, and never
//! mutate state or return effects.
//!
//! Screen layout: the host area fills the terminal, the launcher line sits
//! on the last row, and the chat panel floats above the launcher in the
//! bottom-right corner while open.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::state::AppState;
use crate::{input, transcript};

const LAUNCHER_HEIGHT: u16 = 1;
const PANEL_MAX_WIDTH: u16 = 64;
const PANEL_MAX_HEIGHT: u16 = 28;

/// Spinner frames for the busy indicator.
const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];

#[derive(Debug, Clone, Copy)]
pub struct ScreenLayout {
    pub host: Rect,
    pub launcher: Rect,
    pub panel: Rect,
    pub transcript: Rect,
    pub input: Rect,
}

/// Computes the screen regions. Panel regions are computed even while the
/// panel is hidden so scroll state stays in sync.
pub fn layout(app: &AppState, area: Rect) -> ScreenLayout {
    let [host, launcher] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(LAUNCHER_HEIGHT)]).areas(area);

    let width = area.width.min(PANEL_MAX_WIDTH);
    let height = host.height.min(PANEL_MAX_HEIGHT);
    let panel = Rect::new(
        host.right().saturating_sub(width),
        host.bottom().saturating_sub(height),
        width,
        height,
    );

    let inner = panel_block().inner(panel);
    let [transcript, input] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(input::input_height(&app.input)),
    ])
    .areas(inner);

    ScreenLayout {
        host,
        launcher,
        panel,
        transcript,
        input,
    }
}

fn panel_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue))
        .title(" Chat ")
        .title_bottom(Line::from(" Enter send · Shift+Enter newline · Esc close ").right_aligned())
}

/// Renders the entire TUI to the frame.
pub fn render(app: &AppState, frame: &mut Frame) {
    let layout = layout(app, frame.area());

    render_host(app, layout.host, frame);
    render_launcher(app, layout.launcher, frame);

    if app.widget.is_open() {
        frame.render_widget(Clear, layout.panel);
        frame.render_widget(panel_block(), layout.panel);
        transcript::render_transcript(
            app.widget.transcript(),
            &app.transcript,
            &app.labels,
            layout.transcript,
            frame,
        );
        input::render_input(&app.input, layout.input, frame);
    }
}

fn render_host(app: &AppState, area: Rect, frame: &mut Frame) {
    let muted = Style::default().fg(Color::DarkGray);
    let lines = vec![
        Line::from(Span::styled(
            "chatpane",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(format!("Backend: {}", app.endpoint), muted)),
        Line::default(),
        Line::from(Span::styled(
            "Ctrl+T chat · Ctrl+Y typewriter · Ctrl+Q quit",
            muted,
        )),
    ];
    let top = area.height.saturating_sub(4) / 2;
    let body = Rect {
        y: area.y + top,
        height: area.height.saturating_sub(top),
        ..area
    };
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), body);
}

fn render_launcher(app: &AppState, area: Rect, frame: &mut Frame) {
    let button_style = if app.widget.is_open() {
        Style::default().fg(Color::Black).bg(Color::Blue)
    } else {
        Style::default().fg(Color::Blue).add_modifier(Modifier::REVERSED)
    };
    let mut spans = vec![Span::styled(" 💬 Chat ", button_style), Span::raw(" ")];

    if app.is_busy() {
        let spinner = SPINNER_FRAMES[app.spinner_frame % SPINNER_FRAMES.len()];
        let label = if app.widget.in_flight() > 0 || app.widget.queued() > 0 {
            "waiting for reply"
        } else {
            "typing"
        };
        spans.push(Span::styled(
            format!("{spinner} {label} "),
            Style::default().fg(Color::Yellow),
        ));
    }

    if let Some(notice) = &app.notice {
        spans.push(Span::styled(
            notice.clone(),
            Style::default().fg(Color::DarkGray),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
