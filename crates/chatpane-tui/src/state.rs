//! Application state for the TUI.

use chatpane_core::config::{Config, LabelsConfig};
use chatpane_core::widget::{ChatWidget, WidgetOptions};

use crate::input::InputState;
use crate::transcript::TranscriptView;

pub struct AppState {
    /// Visibility, transcript, and dispatch bookkeeping.
    pub widget: ChatWidget,
    /// Text being composed in the panel.
    pub input: InputState,
    /// Scroll position of the wrapped transcript.
    pub transcript: TranscriptView,
    pub labels: LabelsConfig,
    /// Backend URL, shown on the host screen.
    pub endpoint: String,
    /// Transient status message shown on the launcher line.
    pub notice: Option<String>,
    /// Last known terminal size (width, height).
    pub terminal_size: (u16, u16),
    pub spinner_frame: usize,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            widget: ChatWidget::new(WidgetOptions::from(config)),
            input: InputState::default(),
            transcript: TranscriptView::default(),
            labels: config.labels.clone(),
            endpoint: config.endpoint.clone(),
            notice: None,
            terminal_size: (0, 0),
            spinner_frame: 0,
            should_quit: false,
        }
    }

    /// True while a reply is pending or a reveal is running.
    pub fn is_busy(&self) -> bool {
        !self.widget.is_idle()
    }
}
