//! Scrollbar for the transcript pane.
//!
//! The thumb length is computed once from the content/viewport ratio so it
//! keeps a stable size while scrolling, and it touches the bottom of the track
//! exactly when the view follows the latest entry.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Widget;

const THUMB_SYMBOL: &str = "┃";
const TRACK_SYMBOL: &str = "│";

#[derive(Debug, Clone, Copy)]
pub struct Scrollbar {
    total_rows: usize,
    viewport_rows: usize,
    offset: usize,
}

impl Scrollbar {
    pub fn new(total_rows: usize, viewport_rows: usize, offset: usize) -> Self {
        Self {
            total_rows,
            viewport_rows,
            offset,
        }
    }

    fn max_offset(&self) -> usize {
        self.total_rows.saturating_sub(self.viewport_rows)
    }

    fn is_visible(&self) -> bool {
        self.max_offset() > 0
    }

    /// Returns `(thumb_start, thumb_len)` for a track of `track_len` rows.
    fn thumb(&self, track_len: usize) -> (usize, usize) {
        let thumb_len = (track_len * self.viewport_rows)
            .checked_div(self.total_rows)
            .unwrap_or(track_len)
            .clamp(1, track_len);
        let free = track_len - thumb_len;
        let offset = self.offset.min(self.max_offset());
        let start = (offset * free).checked_div(self.max_offset()).unwrap_or(0);
        (start, thumb_len)
    }
}

impl Widget for Scrollbar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let track_len = area.height as usize;
        if !self.is_visible() || track_len == 0 || area.width == 0 {
            return;
        }

        let (start, len) = self.thumb(track_len);
        let x = area.x + area.width - 1;
        let style = Style::default().fg(Color::DarkGray);
        for (idx, y) in (area.y..area.y + area.height).enumerate() {
            let symbol = if (start..start + len).contains(&idx) {
                THUMB_SYMBOL
            } else {
                TRACK_SYMBOL
            };
            buf.set_string(x, y, symbol, style);
        }
    }
}
