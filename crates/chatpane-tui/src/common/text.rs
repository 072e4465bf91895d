//! Text utilities for TUI rendering.

use unicode_width::UnicodeWidthChar;

/// Hard-wraps `text` to `width` terminal columns.
///
/// Each `\n` starts a new row; wide characters never straddle a row boundary.
/// Always returns at least one row (empty text yields one empty row).
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();

    for line in text.split('\n') {
        let mut row = String::new();
        let mut row_width = 0;
        for ch in line.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if row_width + ch_width > width && !row.is_empty() {
                rows.push(std::mem::take(&mut row));
                row_width = 0;
            }
            row.push(ch);
            row_width += ch_width;
        }
        rows.push(row);
    }

    rows
}
