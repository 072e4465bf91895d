//! Input box rendering.

use chatpane_core::text::sanitize_for_display;
use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};
use unicode_width::UnicodeWidthStr;

use super::InputState;

/// Maximum visible input rows before the box scrolls.
const MAX_INPUT_ROWS: u16 = 5;

const PLACEHOLDER: &str = "Type a message...";

/// Height of the input box including its border.
pub fn input_height(input: &InputState) -> u16 {
    let rows = u16::try_from(input.line_count()).unwrap_or(MAX_INPUT_ROWS);
    rows.clamp(1, MAX_INPUT_ROWS) + 2
}

pub fn render_input(input: &InputState, area: Rect, frame: &mut Frame) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);

    let (cursor_row, before_cursor) = input.cursor_line();
    let visible_rows = usize::from(inner.height.max(1));
    let first_row = (cursor_row + 1).saturating_sub(visible_rows);

    let paragraph = if input.is_empty() {
        Paragraph::new(Line::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray)))
    } else {
        let lines: Vec<Line> = input
            .lines()
            .skip(first_row)
            .take(visible_rows)
            .map(|line| Line::raw(sanitize_for_display(line).into_owned()))
            .collect();
        Paragraph::new(lines)
    };
    frame.render_widget(paragraph.block(block), area);

    let col = u16::try_from(sanitize_for_display(before_cursor).width()).unwrap_or(u16::MAX);
    let row = u16::try_from(cursor_row - first_row).unwrap_or(0);
    frame.set_cursor_position(Position::new(
        inner.x.saturating_add(col).min(inner.right().saturating_sub(1)),
        inner.y + row,
    ));
}
