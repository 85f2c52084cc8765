//! Progress panel
//!
//! Header plus one line per stage. Drawn as an overlay above the input
//! line while a question is in flight.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};

use datachat_conductor::{ProgressStage, StageStatus, PROGRESS_HEADER};

use crate::theme::{ACCENT, DIM_GRAY, SUCCESS_GREEN};

/// Lines for the stage list, header first
pub fn progress_lines(stages: &[ProgressStage]) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        PROGRESS_HEADER,
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
    ))];
    lines.extend(stages.iter().map(|stage| {
        let (marker, style) = match stage.status {
            StageStatus::Complete => ("●", Style::default().fg(SUCCESS_GREEN)),
            StageStatus::Active => ("●", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
            StageStatus::Pending => ("○", Style::default().fg(DIM_GRAY)),
        };
        Line::from(Span::styled(
            format!("{marker} {}", stage.display_label()),
            style,
        ))
    }));
    lines
}

/// Rows the panel needs, borders included
pub fn panel_height(stages: &[ProgressStage]) -> u16 {
    u16::try_from(stages.len() + 3).unwrap_or(u16::MAX)
}

/// Overlay panel for the progress stages
pub struct ProgressPanel<'a> {
    stages: &'a [ProgressStage],
}

impl<'a> ProgressPanel<'a> {
    /// Panel over the current stages
    pub fn new(stages: &'a [ProgressStage]) -> Self {
        Self { stages }
    }
}

impl Widget for ProgressPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        Paragraph::new(progress_lines(self.stages))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(DIM_GRAY)),
            )
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn stage(id: usize, label: &str, status: StageStatus) -> ProgressStage {
        ProgressStage {
            id,
            label: label.to_string(),
            status,
        }
    }

    #[test]
    fn test_stage_markers() {
        let stages = vec![
            stage(0, "Reading tables", StageStatus::Complete),
            stage(1, "Writing query", StageStatus::Active),
            stage(2, "Running query", StageStatus::Pending),
        ];
        let lines: Vec<String> = progress_lines(&stages)
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect();

        assert_eq!(
            lines,
            vec![
                PROGRESS_HEADER.to_string(),
                "● Reading tables ✓".to_string(),
                "● Writing query...".to_string(),
                "○ Running query".to_string(),
            ]
        );
        assert_eq!(panel_height(&stages), 6);
    }
}
