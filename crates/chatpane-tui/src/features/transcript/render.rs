//! Transcript rendering.
//!
//! Each entry renders as a label row followed by its text, indented and
//! hard-wrapped to the pane width. Entry text is always literal; nothing in
//! a message is interpreted as markup or terminal control.

use chatpane_core::config::LabelsConfig;
use chatpane_core::message::Sender;
use chatpane_core::text::sanitize_for_display;
use chatpane_core::transcript::{Entry, Transcript};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::TranscriptView;
use crate::common::{Scrollbar, wrap_text};

const TEXT_INDENT: &str = "  ";
/// Columns kept free on the right for the scrollbar and a gap.
const SCROLLBAR_GUTTER: u16 = 2;
const REVEAL_CURSOR: &str = "▌";
const EMPTY_HINT: &str = "No messages yet. Say hello!";

/// Width available for transcript rows in a pane of `pane_width` columns.
pub fn text_width(pane_width: u16) -> usize {
    usize::from(pane_width.saturating_sub(SCROLLBAR_GUTTER)).max(1)
}

fn label_style(sender: Sender) -> Style {
    let color = match sender {
        Sender::User => Color::Cyan,
        Sender::Bot => Color::Green,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn entry_lines(entry: &Entry, labels: &LabelsConfig, width: usize) -> Vec<Line<'static>> {
    let label = labels.for_sender(entry.sender()).to_string();
    let mut lines = vec![Line::from(Span::styled(label, label_style(entry.sender())))];

    let text = sanitize_for_display(entry.text());
    let wrap_width = width.saturating_sub(TEXT_INDENT.len()).max(1);
    let rows = wrap_text(&text, wrap_width);
    let last = rows.len() - 1;
    for (idx, row) in rows.into_iter().enumerate() {
        let mut spans = vec![Span::raw(TEXT_INDENT), Span::raw(row)];
        if idx == last && entry.is_revealing() {
            spans.push(Span::styled(REVEAL_CURSOR, Style::default().fg(Color::DarkGray)));
        }
        lines.push(Line::from(spans));
    }
    lines
}

/// Builds every row of the transcript, wrapped to `width` columns.
pub fn build_lines(
    transcript: &Transcript,
    labels: &LabelsConfig,
    width: usize,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (idx, entry) in transcript.entries().iter().enumerate() {
        if idx > 0 {
            lines.push(Line::default());
        }
        lines.extend(entry_lines(entry, labels, width));
    }
    lines
}

pub fn render_transcript(
    transcript: &Transcript,
    view: &TranscriptView,
    labels: &LabelsConfig,
    area: Rect,
    frame: &mut Frame,
) {
    if transcript.is_empty() {
        let hint = Paragraph::new(Line::styled(
            EMPTY_HINT,
            Style::default().fg(Color::DarkGray),
        ));
        frame.render_widget(hint, area);
        return;
    }

    let lines = build_lines(transcript, labels, text_width(area.width));
    let visible: Vec<Line> = lines
        .iter()
        .skip(view.offset())
        .take(usize::from(area.height))
        .cloned()
        .collect();
    frame.render_widget(Paragraph::new(visible), area);

    frame.render_widget(
        Scrollbar::new(lines.len(), usize::from(area.height), view.offset()),
        area,
    );
}
