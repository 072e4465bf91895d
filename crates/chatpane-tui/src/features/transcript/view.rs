//! Scroll position over the wrapped transcript rows.
//!
//! The view follows the bottom by default. Any change to the transcript
//! (new entry or revealed character) snaps it back to the bottom; manual
//! scrolling up detaches it until the user scrolls back down.

#[derive(Debug, Clone)]
pub struct TranscriptView {
    offset: usize,
    follow: bool,
    total_rows: usize,
    viewport_rows: usize,
    seen_revision: u64,
}

impl Default for TranscriptView {
    fn default() -> Self {
        Self {
            offset: 0,
            follow: true,
            total_rows: 0,
            viewport_rows: 0,
            seen_revision: 0,
        }
    }
}

impl TranscriptView {
    /// Updates the layout for this frame.
    pub fn sync(&mut self, revision: u64, total_rows: usize, viewport_rows: usize) {
        if revision != self.seen_revision {
            self.seen_revision = revision;
            self.follow = true;
        }
        self.total_rows = total_rows;
        self.viewport_rows = viewport_rows;

        if self.follow {
            self.offset = self.max_offset();
        } else {
            self.offset = self.offset.min(self.max_offset());
            self.follow = self.offset == self.max_offset();
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_following(&self) -> bool {
        self.follow
    }

    pub fn max_offset(&self) -> usize {
        self.total_rows.saturating_sub(self.viewport_rows)
    }

    pub fn scroll_up(&mut self, rows: usize) {
        self.offset = self.offset.saturating_sub(rows);
        self.follow = self.offset == self.max_offset();
    }

    pub fn scroll_down(&mut self, rows: usize) {
        self.offset = (self.offset + rows).min(self.max_offset());
        self.follow = self.offset == self.max_offset();
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.page_rows());
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.page_rows());
    }

    fn page_rows(&self) -> usize {
        self.viewport_rows.saturating_sub(1).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follows_bottom_by_default() {
        let mut view = TranscriptView::default();
        view.sync(1, 50, 10);
        assert_eq!(view.offset(), 40);
        assert!(view.is_following());
    }

    #[test]
    fn test_scroll_up_detaches_until_bottom() {
        let mut view = TranscriptView::default();
        view.sync(1, 50, 10);
        view.scroll_up(5);
        assert_eq!(view.offset(), 35);
        assert!(!view.is_following());

        // Same revision, more rows (e.g. resize): position kept.
        view.sync(1, 60, 10);
        assert_eq!(view.offset(), 35);

        view.scroll_down(100);
        assert_eq!(view.offset(), 50);
        assert!(view.is_following());
    }

    #[test]
    fn test_transcript_change_snaps_to_bottom() {
        let mut view = TranscriptView::default();
        view.sync(1, 50, 10);
        view.page_up();
        assert!(!view.is_following());

        view.sync(2, 52, 10);
        assert_eq!(view.offset(), 42);
        assert!(view.is_following());
    }

    #[test]
    fn test_content_shorter_than_viewport() {
        let mut view = TranscriptView::default();
        view.sync(1, 3, 10);
        view.scroll_up(1);
        assert_eq!(view.offset(), 0);
        assert!(view.is_following());
    }
}
