//! Display-safe text.
//!
//! Transcript text is always shown literally: control characters that a
//! terminal would interpret (escape sequences, carriage returns) are removed
//! before display, never passed through. Both the TUI and the piped CLI
//! output go through [`sanitize_for_display`].

use std::borrow::Cow;

/// Width tabs expand to.
const TAB_WIDTH: usize = 4;

/// Removes terminal control characters and expands tabs.
///
/// Newlines are kept; callers decide how to lay them out.
pub fn sanitize_for_display(s: &str) -> Cow<'_, str> {
    let needs_change = s
        .chars()
        .any(|ch| ch == '\t' || (ch.is_control() && ch != '\n'));
    if !needs_change {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\t' => out.push_str(&" ".repeat(TAB_WIDTH)),
            '\n' => out.push('\n'),
            ch if ch.is_control() => {}
            ch => out.push(ch),
        }
    }
    Cow::Owned(out)
}
