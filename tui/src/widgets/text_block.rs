//! TextBlock Widget
//!
//! A borderless, scrollable region of pre-built lines. The scroll offset
//! counts lines from the bottom, so 0 always shows the newest content.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::StatefulWidget;

/// State for a scrollable text block
#[derive(Debug, Default)]
pub struct TextBlockState {
    /// Scroll offset (lines from bottom, 0 = latest)
    pub scroll_offset: usize,
    /// Total content lines at the last render
    pub total_lines: usize,
    /// Visible height at the last render
    pub height: usize,
}

impl TextBlockState {
    /// Scroll by delta (positive = toward older content)
    pub fn scroll(&mut self, delta: isize) {
        let max_scroll = self.max_scroll();
        self.scroll_offset = self.scroll_offset.saturating_add_signed(delta).min(max_scroll);
    }

    /// Scroll to the newest content
    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }

    /// Scroll so line `start` is at the top, or as close as the content allows
    pub fn reveal(&mut self, start: usize, total_lines: usize, height: usize) {
        self.scroll_offset = total_lines.saturating_sub(start + height);
    }

    /// Half the visible height, at least one line
    pub fn page(&self) -> isize {
        isize::try_from((self.height / 2).max(1)).unwrap_or(1)
    }

    fn max_scroll(&self) -> usize {
        self.total_lines.saturating_sub(self.height)
    }
}

/// A borderless, scrollable text block
pub struct TextBlock<'a> {
    lines: &'a [Line<'static>],
}

impl<'a> TextBlock<'a> {
    /// Block over already wrapped lines
    pub fn new(lines: &'a [Line<'static>]) -> Self {
        Self { lines }
    }
}

impl StatefulWidget for TextBlock<'_> {
    type State = TextBlockState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let height = area.height as usize;
        state.total_lines = self.lines.len();
        state.height = height;

        // Clamp scroll
        state.scroll_offset = state.scroll_offset.min(state.max_scroll());

        let visible_end = state.total_lines.saturating_sub(state.scroll_offset);
        let visible_start = visible_end.saturating_sub(height);

        for (i, line) in self.lines[visible_start..visible_end].iter().enumerate() {
            // Bounded by area.height
            let y = area.y + i as u16;
            buf.set_line(area.x, y, line, area.width);
        }

        // Markers when content is hidden above or below
        let marker = Style::default().fg(Color::Yellow);
        if visible_start > 0 && area.width > 0 {
            buf.set_string(area.x + area.width - 1, area.y, "↑", marker);
        }
        if state.scroll_offset > 0 && area.width > 0 && area.height > 0 {
            buf.set_string(
                area.x + area.width - 1,
                area.y + area.height - 1,
                "↓",
                marker,
            );
        }
    }
}
