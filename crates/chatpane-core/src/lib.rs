//! Core chatpane library (widget state, transcript, transport, config).

pub mod config;
pub mod logging;
pub mod message;
pub mod reveal;
pub mod runner;
pub mod session;
pub mod text;
pub mod transcript;
pub mod transport;
pub mod widget;
