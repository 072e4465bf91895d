//! Transcript slice: scroll state and rendering of chat entries.

mod render;
mod view;

pub use render::{build_lines, render_transcript, text_width};
pub use view::TranscriptView;
