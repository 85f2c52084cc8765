//! datachat TUI - Terminal interface for datachat
//!
//! A full-screen terminal UI for asking questions about a project's tables.
//! All conversation logic lives in the embedded Conductor; this crate turns
//! key presses into surface events and draws what the Conductor reports.
//!
//! # Architecture
//!
//! - **ConductorClient**: Embedded Conductor plus its message channel
//! - **DisplayState**: Transcript, progress and input derived from messages
//! - **Widgets**: Scrollable text block, result cards, charts, progress panel
//! - **UI**: Frame layout and the welcome screen

pub mod app;
pub mod conductor_client;
pub mod display;
pub mod theme;
pub mod ui;
pub mod widgets;

pub use app::App;
pub use conductor_client::ConductorClient;
pub use display::DisplayState;
