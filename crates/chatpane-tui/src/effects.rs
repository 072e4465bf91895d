//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! The reducer never performs I/O or spawns tasks directly.

use chatpane_core::widget::WidgetEffect;

#[derive(Debug)]
pub enum UiEffect {
    /// Quit the application.
    Quit,

    /// Network dispatch, reveal start, or reveal cancellation.
    Widget(WidgetEffect),

    /// Persist the typewriter toggle to the config file.
    PersistTypewriter { enabled: bool },
}

/// Wraps widget effects for the runtime.
pub fn from_widget(effects: Vec<WidgetEffect>) -> Vec<UiEffect> {
    effects.into_iter().map(UiEffect::Widget).collect()
}
