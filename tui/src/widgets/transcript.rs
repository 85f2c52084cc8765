//! Transcript lines
//!
//! Flattens the display messages into wrapped lines and remembers where each
//! message starts, so a scroll request can bring it to the top.

use std::collections::HashMap;

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use datachat_conductor::MessageId;

use super::result_card::{card_lines, table_lines};
use crate::display::{DisplayBody, DisplayMessage, DisplayRole};
use crate::theme::{ACCENT, DIM_GRAY, USER_GREEN};

/// Wrapped transcript
#[derive(Debug, Default)]
pub struct Transcript {
    /// All lines, oldest first
    pub lines: Vec<Line<'static>>,
    /// First line of each message
    pub starts: HashMap<MessageId, usize>,
}

/// Wrap `messages` to `width` columns
pub fn build(messages: &[DisplayMessage], width: u16) -> Transcript {
    let mut transcript = Transcript::default();
    let wrap_width = usize::from(width.max(1));

    for (i, message) in messages.iter().enumerate() {
        if i > 0 {
            transcript.lines.push(Line::default());
        }
        transcript
            .starts
            .insert(message.id.clone(), transcript.lines.len());
        transcript.lines.extend(prose_lines(message, wrap_width));

        match &message.body {
            DisplayBody::Text => {}
            DisplayBody::Result(state) => transcript.lines.extend(card_lines(state, width)),
            DisplayBody::Table(table) => transcript.lines.extend(table_lines(table, wrap_width)),
        }
    }

    transcript
}

fn prose_lines(message: &DisplayMessage, width: usize) -> Vec<Line<'static>> {
    let prefix = message.role.prefix();
    let (prefix_style, text_style) = match message.role {
        DisplayRole::User => (
            Style::default().fg(USER_GREEN).add_modifier(Modifier::BOLD),
            Style::default(),
        ),
        DisplayRole::Assistant => (
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            Style::default(),
        ),
        DisplayRole::System => (Style::default(), Style::default().fg(DIM_GRAY)),
    };

    let full = format!("{prefix}{}", message.content);
    textwrap::wrap(&full, width)
        .into_iter()
        .enumerate()
        .map(|(i, segment)| {
            let segment = segment.into_owned();
            match segment.strip_prefix(prefix) {
                Some(rest) if i == 0 && !prefix.is_empty() => Line::from(vec![
                    Span::styled(prefix.to_string(), prefix_style),
                    Span::styled(rest.to_string(), text_style),
                ]),
                _ => Line::from(Span::styled(segment, text_style)),
            }
        })
        .collect()
}
