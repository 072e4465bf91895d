//! Transcript: the ordered, append-only list of rendered entries.
//!
//! Entries are never removed or reordered. The only mutation after insertion
//! is the incremental reveal appending characters to an entry's text.
//!
//! Scroll model: `scroll_height()` is the number of rows the transcript
//! occupies (one label row plus one row per text line for every entry) and
//! `scroll_top()` is the current offset. Every append and every revealed
//! character sets `scroll_top = scroll_height`, which keeps the latest entry
//! visible.

use crate::message::{Message, Sender};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub u64);

/// Text still waiting to be revealed, with a byte cursor into it.
#[derive(Debug, Clone)]
struct PendingReveal {
    full: String,
    cursor: usize,
}

impl PendingReveal {
    fn next_char(&mut self) -> Option<char> {
        let ch = self.full[self.cursor..].chars().next()?;
        self.cursor += ch.len_utf8();
        Some(ch)
    }

    fn rest(&self) -> &str {
        &self.full[self.cursor..]
    }

    fn is_done(&self) -> bool {
        self.cursor >= self.full.len()
    }
}

/// One rendered transcript entry.
#[derive(Debug, Clone)]
pub struct Entry {
    id: EntryId,
    sender: Sender,
    text: String,
    reveal: Option<PendingReveal>,
}

impl Entry {
    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    /// Text currently displayed (a prefix of the full text while revealing).
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_revealing(&self) -> bool {
        self.reveal.is_some()
    }

    /// Rows this entry occupies: the sender label plus each text line.
    pub fn height(&self) -> usize {
        1 + self.text.split('\n').count()
    }

    /// Reveals the next character. Returns `true` if more characters remain.
    fn reveal_next(&mut self) -> bool {
        let Some(reveal) = self.reveal.as_mut() else {
            return false;
        };
        if let Some(ch) = reveal.next_char() {
            self.text.push(ch);
        }
        if reveal.is_done() {
            self.reveal = None;
            false
        } else {
            true
        }
    }

    /// Shows the remaining text at once.
    fn finish_reveal(&mut self) {
        if let Some(reveal) = self.reveal.take() {
            self.text.push_str(reveal.rest());
        }
    }

    /// Snapshot of the entry as a message (with the currently displayed text).
    pub fn to_message(&self) -> Message {
        Message {
            sender: self.sender,
            text: self.text.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<Entry>,
    next_id: u64,
    scroll_top: usize,
    /// Bumped on every mutation so views can detect changes cheaply.
    revision: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        // Ids are assigned in insertion order, so the list is sorted by id.
        self.entries
            .binary_search_by_key(&id, Entry::id)
            .ok()
            .map(|idx| &self.entries[idx])
    }

    fn get_mut(&mut self, id: EntryId) -> Option<&mut Entry> {
        self.entries
            .binary_search_by_key(&id, Entry::id)
            .ok()
            .map(|idx| &mut self.entries[idx])
    }

    pub fn last(&self) -> Option<&Entry> {
        self.entries.last()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    pub fn scroll_height(&self) -> usize {
        self.entries.iter().map(Entry::height).sum()
    }

    pub fn is_scrolled_to_bottom(&self) -> bool {
        self.scroll_top >= self.scroll_height()
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_top = self.scroll_height();
    }

    /// Moves the scroll offset, clamped to `0..=scroll_height`.
    pub fn set_scroll_top(&mut self, top: usize) {
        self.scroll_top = top.min(self.scroll_height());
    }

    /// Appends a complete entry and scrolls to the bottom.
    pub fn append(&mut self, sender: Sender, text: impl Into<String>) -> EntryId {
        let id = self.allocate_id();
        self.push(Entry {
            id,
            sender,
            text: text.into(),
            reveal: None,
        })
    }

    /// Appends an empty entry that will reveal `text` one character at a time.
    ///
    /// Empty `text` yields a plain empty entry with nothing left to reveal.
    pub fn append_revealing(&mut self, sender: Sender, text: impl Into<String>) -> EntryId {
        let full = text.into();
        let reveal = (!full.is_empty()).then_some(PendingReveal { full, cursor: 0 });
        let id = self.allocate_id();
        self.push(Entry {
            id,
            sender,
            text: String::new(),
            reveal,
        })
    }

    /// Reveals one more character of `id` and re-scrolls to the bottom.
    ///
    /// Returns `true` while characters remain. Unknown or already complete
    /// entries are left untouched and return `false`.
    pub fn reveal_next(&mut self, id: EntryId) -> bool {
        let Some(entry) = self.get_mut(id) else {
            return false;
        };
        if !entry.is_revealing() {
            return false;
        }
        let more = entry.reveal_next();
        self.touch();
        more
    }

    /// Completes a pending reveal immediately.
    pub fn finish_reveal(&mut self, id: EntryId) {
        if let Some(entry) = self.get_mut(id)
            && entry.is_revealing()
        {
            entry.finish_reveal();
            self.touch();
        }
    }

    fn allocate_id(&mut self) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    fn push(&mut self, entry: Entry) -> EntryId {
        let id = entry.id;
        self.entries.push(entry);
        self.touch();
        id
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
        self.scroll_to_bottom();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order_and_scrolls() {
        let mut transcript = Transcript::new();
        transcript.append(Sender::User, "Hello");
        transcript.append(Sender::Bot, "Hi\nthere");

        let texts: Vec<&str> = transcript.entries().iter().map(Entry::text).collect();
        assert_eq!(texts, vec!["Hello", "Hi\nthere"]);
        assert_eq!(transcript.scroll_height(), 2 + 3);
        assert_eq!(transcript.scroll_top(), transcript.scroll_height());
    }

    #[test]
    fn test_entry_ids_are_sequential_across_append_kinds() {
        let mut transcript = Transcript::new();
        let first = transcript.append(Sender::User, "Hello");
        let second = transcript.append_revealing(Sender::Bot, "Hi");
        let third = transcript.append(Sender::User, "Bye");

        assert!(first < second && second < third);
        let ids: Vec<EntryId> = transcript.entries().iter().map(Entry::id).collect();
        assert_eq!(ids, vec![first, second, third]);
    }

    #[test]
    fn test_reveal_yields_prefixes_left_to_right() {
        let mut transcript = Transcript::new();
        let id = transcript.append_revealing(Sender::Bot, "héllo");
        assert_eq!(transcript.get(id).unwrap().text(), "");

        let mut seen = Vec::new();
        while transcript.reveal_next(id) {
            seen.push(transcript.get(id).unwrap().text().to_string());
        }
        seen.push(transcript.get(id).unwrap().text().to_string());

        assert_eq!(seen, vec!["h", "hé", "hél", "héll", "héllo"]);
        assert!(!transcript.get(id).unwrap().is_revealing());
        assert!(transcript.is_scrolled_to_bottom());
    }

    #[test]
    fn test_reveal_empty_text_has_nothing_pending() {
        let mut transcript = Transcript::new();
        let id = transcript.append_revealing(Sender::Bot, "");
        let entry = transcript.get(id).unwrap();
        assert_eq!(entry.text(), "");
        assert!(!entry.is_revealing());
        assert_eq!(entry.height(), 2);
        assert!(!transcript.reveal_next(id));
    }

    #[test]
    fn test_finish_reveal_shows_rest() {
        let mut transcript = Transcript::new();
        let id = transcript.append_revealing(Sender::Bot, "abc");
        transcript.reveal_next(id);
        transcript.finish_reveal(id);
        assert_eq!(transcript.get(id).unwrap().text(), "abc");
        // Late ticks after completion are ignored.
        assert!(!transcript.reveal_next(id));
        assert_eq!(transcript.get(id).unwrap().text(), "abc");
    }

    #[test]
    fn test_reveal_rescrolls_after_manual_scroll() {
        let mut transcript = Transcript::new();
        transcript.append(Sender::User, "one\ntwo\nthree");
        let id = transcript.append_revealing(Sender::Bot, "a\nb");
        transcript.set_scroll_top(0);
        assert!(!transcript.is_scrolled_to_bottom());

        transcript.reveal_next(id);
        assert_eq!(transcript.scroll_top(), transcript.scroll_height());
    }

    #[test]
    fn test_set_scroll_top_clamps() {
        let mut transcript = Transcript::new();
        transcript.append(Sender::User, "x");
        transcript.set_scroll_top(100);
        assert_eq!(transcript.scroll_top(), 2);
    }

    #[test]
    fn test_revision_changes_on_every_mutation() {
        let mut transcript = Transcript::new();
        let start = transcript.revision();
        let id = transcript.append_revealing(Sender::Bot, "ab");
        let after_append = transcript.revision();
        transcript.reveal_next(id);
        assert!(after_append > start);
        assert!(transcript.revision() > after_append);
    }
}
