//! Frame layout and drawing
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ transcript (scrollable)              │
//! │          ┌─────────────────────┐     │
//! │          │ progress overlay    │     │
//! ├──────────┴─────────────────────┴─────┤
//! │ input line                           │
//! │ status bar                           │
//! └──────────────────────────────────────┘
//! ```

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use datachat_conductor::{MessageId, EXAMPLE_QUESTIONS};

use crate::display::DisplayState;
use crate::theme::{self, ACCENT, DIM_GRAY, USER_GREEN};
use crate::widgets::progress::panel_height;
use crate::widgets::{transcript, ProgressPanel, TextBlock, TextBlockState};

/// Input box height (separator plus two text lines)
pub const INPUT_HEIGHT: u16 = 3;

/// Widest the progress overlay gets
const PROGRESS_WIDTH: u16 = 44;

/// Empty-state heading
pub const WELCOME_TITLE: &str = "Ask questions about your data";

/// Empty-state hint when the project has tables
pub const WELCOME_READY: &str =
    "I can analyze your data, find patterns, and create visualizations. Try asking a question!";

/// Empty-state hint when it does not
pub const WELCOME_NO_DATA: &str = "Upload some CSV files first to start analyzing your data.";

/// View-only state that survives between frames
#[derive(Debug, Default)]
pub struct ViewState {
    /// Transcript scroll position
    pub transcript: TextBlockState,
    /// Message to bring to the top on the next frame
    pub scroll_target: Option<MessageId>,
    /// Active project, shown in the status bar
    pub project: String,
}

/// Draw one frame
pub fn draw(frame: &mut Frame, display: &DisplayState, view: &mut ViewState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(1),
        ])
        .split(frame.area());

    if display.messages.is_empty() {
        draw_welcome(frame, display, chunks[0]);
    } else {
        draw_transcript(frame, display, view, chunks[0]);
    }
    draw_input(frame, display, chunks[1]);
    draw_status(frame, display, view, chunks[2]);

    if !display.progress.is_empty() {
        let area = progress_area(chunks[0], panel_height(&display.progress));
        frame.render_widget(ProgressPanel::new(&display.progress), area);
    }
}

fn draw_transcript(frame: &mut Frame, display: &DisplayState, view: &mut ViewState, area: Rect) {
    // Rightmost column is kept for the scroll markers
    let built = transcript::build(&display.messages, area.width.saturating_sub(1));

    if let Some(target) = view.scroll_target.take() {
        match built.starts.get(&target) {
            Some(start) => {
                view.transcript
                    .reveal(*start, built.lines.len(), usize::from(area.height));
            }
            None => view.transcript.scroll_to_bottom(),
        }
    }

    frame.render_stateful_widget(TextBlock::new(&built.lines), area, &mut view.transcript);
}

fn draw_welcome(frame: &mut Frame, display: &DisplayState, area: Rect) {
    let hint = if display.has_data {
        WELCOME_READY
    } else {
        WELCOME_NO_DATA
    };
    let mut lines = vec![
        Line::default(),
        Line::from(Span::styled(
            WELCOME_TITLE,
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(hint, Style::default().fg(DIM_GRAY))),
    ];
    if display.examples_visible() {
        lines.push(Line::default());
        for (i, question) in EXAMPLE_QUESTIONS.iter().enumerate() {
            lines.push(Line::from(vec![
                Span::styled(format!("[F{}] ", i + 1), Style::default().fg(DIM_GRAY)),
                Span::raw(*question),
            ]));
        }
    }

    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn draw_input(frame: &mut Frame, display: &DisplayState, area: Rect) {
    let width = usize::from(area.width);
    let mut lines = vec![Line::from(Span::styled(
        "─".repeat(width),
        Style::default().fg(DIM_GRAY),
    ))];

    if display.input.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("> {}", display.placeholder()),
            Style::default().fg(DIM_GRAY),
        )));
    } else {
        let enabled = !display.is_submitting()
            && (display.is_input_enabled() || display.input.starts_with('/'));
        let style = if !enabled {
            Style::default().fg(DIM_GRAY)
        } else {
            Style::default().fg(USER_GREEN)
        };
        let full = format!("> {}_", display.input);
        let wrapped = textwrap::wrap(&full, width.max(1));
        let text_height = usize::from(area.height.saturating_sub(1));
        // Keep the cursor end visible
        let skip = wrapped.len().saturating_sub(text_height);
        lines.extend(
            wrapped
                .into_iter()
                .skip(skip)
                .map(|segment| Line::from(Span::styled(segment.into_owned(), style))),
        );
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn draw_status(frame: &mut Frame, display: &DisplayState, view: &ViewState, area: Rect) {
    let line = match &display.notification {
        Some(notification) => Line::from(Span::styled(
            format!(" {}", notification.message),
            Style::default().fg(theme::notify(notification.level)),
        )),
        None => {
            let project = if view.project.is_empty() {
                String::new()
            } else {
                format!(" | {}", view.project)
            };
            let scroll = if view.transcript.scroll_offset > 0 {
                format!(" [^{} lines]", view.transcript.scroll_offset)
            } else {
                String::new()
            };
            Line::from(Span::styled(
                format!(
                    " {}{project} | Enter ask | Tab view | Esc quit{scroll}",
                    display.conductor_state.description()
                ),
                Style::default().fg(DIM_GRAY),
            ))
        }
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// Bottom-left corner of the transcript area, clipped to it
fn progress_area(transcript: Rect, height: u16) -> Rect {
    let width = PROGRESS_WIDTH.min(transcript.width);
    let height = height.min(transcript.height);
    Rect {
        x: transcript.x + 1_u16.min(transcript.width - width),
        y: transcript.y + transcript.height - height,
        width,
        height,
    }
}
