//! Helpers shared across the TUI feature slices.

pub mod scrollbar;
pub mod text;

pub use scrollbar::Scrollbar;
pub use text::wrap_text;
