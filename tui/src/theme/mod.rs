//! Theme and Colors
//!
//! The chart palette, recommendation accents and the transcript colors.
//! Terminals have no alpha channel, so opacity is applied by scaling a
//! color toward black.

use ratatui::style::Color;

use datachat_conductor::render::{CategoryColor, PaletteColor, PALETTE_SIZE};
use datachat_conductor::NotifyLevel;

// ============================================================================
// Chart Palette
// ============================================================================

/// The five chart colors, in palette order
pub const CHART_PALETTE: [Color; PALETTE_SIZE] = [
    Color::Rgb(233, 118, 91),
    Color::Rgb(42, 157, 144),
    Color::Rgb(92, 148, 178),
    Color::Rgb(232, 196, 104),
    Color::Rgb(244, 164, 98),
];

/// Terminal color for a palette entry
pub fn palette(color: PaletteColor) -> Color {
    CHART_PALETTE[color.0 % PALETTE_SIZE]
}

/// Scale an RGB color toward black; named colors pass through
pub fn with_opacity(color: Color, opacity: f32) -> Color {
    match color {
        Color::Rgb(r, g, b) => {
            let opacity = opacity.clamp(0.0, 1.0);
            // Channel values stay within 0..=255 after scaling by 0..=1
            let scale = |c: u8| (f32::from(c) * opacity).round() as u8;
            Color::Rgb(scale(r), scale(g), scale(b))
        }
        other => other,
    }
}

// ============================================================================
// Recommendation Accents
// ============================================================================

/// Terminal color for a recommendation category accent
pub fn category(color: CategoryColor) -> Color {
    match color {
        CategoryColor::Yellow => Color::Rgb(234, 179, 8),
        CategoryColor::Blue => Color::Rgb(59, 130, 246),
        CategoryColor::Purple => Color::Rgb(168, 85, 247),
        CategoryColor::Green => Color::Rgb(34, 197, 94),
        CategoryColor::Red => Color::Rgb(239, 68, 68),
        CategoryColor::Neutral => ACCENT,
    }
}

// ============================================================================
// UI Colors
// ============================================================================

/// Accent for the agent's messages and headers
pub const ACCENT: Color = Color::Rgb(99, 102, 241);

/// User input green
pub const USER_GREEN: Color = Color::Rgb(130, 220, 130);

/// System/dim text
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

/// Error red
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

/// Warning amber
pub const WARNING_AMBER: Color = Color::Rgb(245, 180, 60);

/// Success green
pub const SUCCESS_GREEN: Color = Color::Rgb(120, 230, 120);

/// Query text
pub const CODE_BLUE: Color = Color::Rgb(150, 180, 255);

/// Color for a notification level
pub fn notify(level: NotifyLevel) -> Color {
    match level {
        NotifyLevel::Info => ACCENT,
        NotifyLevel::Warning => WARNING_AMBER,
        NotifyLevel::Error => ERROR_RED,
    }
}
