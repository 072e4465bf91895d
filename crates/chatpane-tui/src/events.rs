//! UI event types.
//!
//! Everything the reducer reacts to arrives as a `UiEvent`: terminal input,
//! frame/tick timing, and results of background work delivered through the
//! runtime inbox.

use chatpane_core::widget::WidgetEvent;

#[derive(Debug)]
pub enum UiEvent {
    /// Periodic tick; drives the busy spinner and triggers a redraw.
    Tick,

    /// Emitted once per loop iteration with the current terminal size.
    Frame { width: u16, height: u16 },

    /// Raw terminal input.
    Terminal(crossterm::event::Event),

    /// Dispatch result or reveal step for the chat widget.
    Widget(WidgetEvent),

    /// The typewriter preference was written to the config file.
    TypewriterSaved { result: Result<(), String> },
}

impl From<WidgetEvent> for UiEvent {
    fn from(event: WidgetEvent) -> Self {
        UiEvent::Widget(event)
    }
}
