//! Result card lines
//!
//! Summary, badges, tab bar and the selected tab's content for one result,
//! followed by the recommendation panel.

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use datachat_conductor::render::{
    ResultCard, ResultTab, ResultView, TableView, EMPTY_RESULT_TEXT, RECOMMENDATIONS_TITLE,
};

use super::chart::chart_lines;
use crate::display::ResultState;
use crate::theme::{self, ACCENT, CODE_BLUE, DIM_GRAY};

/// Widest a table column is drawn before its cells are clipped
pub const MAX_COLUMN_WIDTH: usize = 24;

/// Lines for a rendered result
pub fn card_lines(state: &ResultState, width: u16) -> Vec<Line<'static>> {
    match &state.view {
        ResultView::Empty { message } => vec![Line::from(Span::styled(
            (*message).to_string(),
            Style::default().fg(DIM_GRAY),
        ))],
        ResultView::Populated(card) => populated_lines(card, state, width),
    }
}

fn populated_lines(card: &ResultCard, state: &ResultState, width: u16) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if let Some(summary) = &card.summary {
        lines.push(Line::from(summary.clone()));
    }
    let badge = Style::default().fg(ACCENT).add_modifier(Modifier::REVERSED);
    lines.push(Line::from(vec![
        Span::styled(format!(" {} ", card.row_badge), badge),
        Span::raw(" "),
        Span::styled(format!(" {} ", card.time_badge), badge),
    ]));

    lines.push(tab_bar(&card.tabs, state.tab));

    match state.tab {
        ResultTab::Table => lines.extend(table_lines(&card.table, usize::from(width))),
        ResultTab::Chart => match &card.chart {
            Some(chart) => lines.extend(chart_lines(chart, &state.hover, width)),
            None => lines.push(Line::from(EMPTY_RESULT_TEXT)),
        },
        ResultTab::Query => lines.extend(card.query_text.lines().map(|l| {
            Line::from(Span::styled(l.to_string(), Style::default().fg(CODE_BLUE)))
        })),
    }

    if card.recommendations.is_visible() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            RECOMMENDATIONS_TITLE,
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for (i, entry) in card.recommendations.entries.iter().enumerate() {
            let color = theme::category(entry.style.color);
            let mut spans = vec![
                Span::styled(format!("[Alt+{}] ", i + 1), Style::default().fg(DIM_GRAY)),
                Span::styled(
                    format!("{} {}", entry.style.icon, entry.question),
                    Style::default().fg(color),
                ),
            ];
            if !entry.description.is_empty() {
                spans.push(Span::styled(
                    format!(" - {}", entry.description),
                    Style::default().fg(DIM_GRAY),
                ));
            }
            lines.push(Line::from(spans));
        }
    }

    lines
}

fn tab_bar(tabs: &[ResultTab], selected: ResultTab) -> Line<'static> {
    let mut spans = Vec::new();
    for tab in tabs {
        let style = if *tab == selected {
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(DIM_GRAY)
        };
        spans.push(Span::styled(format!("[{}]", tab.label()), style));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::styled("(Tab)", Style::default().fg(DIM_GRAY)));
    Line::from(spans)
}

/// Header, separator and rows, clipped to `width`
pub fn table_lines(table: &TableView, width: usize) -> Vec<Line<'static>> {
    let widths: Vec<usize> = table
        .column_widths()
        .into_iter()
        .map(|w| w.min(MAX_COLUMN_WIDTH))
        .collect();

    let row_text = |cells: &[String]| {
        let text = cells
            .iter()
            .zip(&widths)
            .map(|(cell, w)| pad(cell, *w))
            .collect::<Vec<_>>()
            .join(" │ ");
        clip(&text, width)
    };

    let mut lines = vec![
        Line::from(Span::styled(
            row_text(&table.columns),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            clip(
                &widths
                    .iter()
                    .map(|w| "─".repeat(*w))
                    .collect::<Vec<_>>()
                    .join("─┼─"),
                width,
            ),
            Style::default().fg(DIM_GRAY),
        )),
    ];
    lines.extend(table.rows.iter().map(|row| Line::from(row_text(row))));

    if let Some(note) = &table.truncation_note {
        lines.push(Line::from(Span::styled(
            note.clone(),
            Style::default().fg(DIM_GRAY).add_modifier(Modifier::ITALIC),
        )));
    }
    lines
}

/// Pad or clip `text` to exactly `width` chars
fn pad(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count > width {
        let mut clipped: String = text.chars().take(width.saturating_sub(1)).collect();
        clipped.push('…');
        clipped
    } else {
        format!("{text}{}", " ".repeat(width - count))
    }
}

fn clip(text: &str, width: usize) -> String {
    text.chars().take(width).collect::<String>().trim_end().to_string()
}
