//! Widgets
//!
//! Everything here produces ratatui lines or widgets from display state;
//! nothing talks to the Conductor.

pub mod chart;
pub mod progress;
pub mod result_card;
pub mod text_block;
pub mod transcript;

pub use progress::ProgressPanel;
pub use text_block::{TextBlock, TextBlockState};
