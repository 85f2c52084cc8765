//! Chart lines
//!
//! Text renditions of a [`ChartView`]: horizontal bars, proportional pie
//! rows, and a small character plot for line, area and scatter charts.
//! Pixel widths suggested by the view are converted at
//! [`PX_PER_COLUMN`] and clipped to the space available.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use datachat_conductor::render::{
    BarDatum, ChartFrame, ChartValue, ChartView, HoverState, PaletteColor, PieSlice, ScatterPoint,
    SeriesPoint,
};

use crate::theme::{self, DIM_GRAY};

/// Pixels per terminal column when sizing charts
pub const PX_PER_COLUMN: u32 = 8;

/// Rows in a line/area/scatter plot
pub const PLOT_HEIGHT: usize = 8;

/// Widest category label before truncation
const MAX_LABEL_WIDTH: usize = 16;

/// Columns a chart may use out of `available`
pub fn chart_width(chart: &ChartView, available: u16) -> usize {
    let available = usize::from(available);
    match chart.suggested_min_width() {
        Some(px) => usize::try_from(px / PX_PER_COLUMN)
            .unwrap_or(available)
            .min(available),
        None => available,
    }
}

/// Lines for `chart` with hover emphasis applied
pub fn chart_lines(chart: &ChartView, hover: &HoverState, available: u16) -> Vec<Line<'static>> {
    let width = chart_width(chart, available);
    let mut lines = frame_lines(chart.frame());

    match chart {
        ChartView::Bar { bars, .. } => lines.extend(bar_lines(bars, hover, width)),
        ChartView::Pie { slices, .. } => lines.extend(pie_lines(slices, hover, width)),
        ChartView::Line { points, color, .. } => {
            lines.extend(series_lines(points, *color, false, width));
        }
        ChartView::Area { points, color, .. } => {
            lines.extend(series_lines(points, *color, true, width));
        }
        ChartView::Scatter { points, .. } => lines.extend(scatter_lines(points, width)),
    }

    lines
}

fn frame_lines(frame: &ChartFrame) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if let Some(title) = &frame.title {
        lines.push(Line::from(Span::styled(
            title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
    }
    lines.push(Line::from(Span::styled(
        format!("{} by {}", frame.y_field, frame.x_field),
        Style::default().fg(DIM_GRAY),
    )));
    lines
}

// ============================================================================
// Bars and slices
// ============================================================================

fn bar_lines(bars: &[BarDatum], hover: &HoverState, width: usize) -> Vec<Line<'static>> {
    let labels: Vec<String> = bars.iter().map(|b| clip(&b.category.to_string(), MAX_LABEL_WIDTH)).collect();
    let label_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let values: Vec<String> = bars.iter().map(|b| b.value.to_string()).collect();
    let value_width = values.iter().map(|v| v.chars().count()).max().unwrap_or(0);
    let bar_space = width.saturating_sub(label_width + value_width + 3).max(1);

    let max = bars
        .iter()
        .filter_map(|b| b.value.as_f64())
        .fold(0.0_f64, f64::max);

    bars.iter()
        .zip(labels)
        .zip(values)
        .enumerate()
        .map(|(i, ((bar, label), value))| {
            let color = theme::with_opacity(theme::palette(bar.color), hover.bar_opacity(i));
            let length = scaled(bar.value.as_f64().unwrap_or(0.0), max, bar_space);
            let mut style = Style::default().fg(color);
            if hover.bar == Some(i) {
                style = style.add_modifier(Modifier::BOLD);
            }
            Line::from(vec![
                Span::raw(format!("{label:>label_width$} ")),
                Span::styled("█".repeat(length), style),
                Span::styled(format!(" {value}"), style),
            ])
        })
        .collect()
}

fn pie_lines(slices: &[PieSlice], hover: &HoverState, width: usize) -> Vec<Line<'static>> {
    let bar_space = (width / 3).max(1);

    slices
        .iter()
        .enumerate()
        .map(|(i, slice)| {
            let emphasis = hover.pie_emphasis(i);
            let color = theme::with_opacity(theme::palette(slice.color), emphasis.opacity);
            let length = scaled(f64::from(slice.percent), 100.0, bar_space);
            let mut label_style = Style::default().fg(color);
            let (open, close) = if emphasis.outlined {
                label_style = label_style.add_modifier(Modifier::BOLD);
                ("▶ ", " ◀")
            } else {
                ("  ", "")
            };
            Line::from(vec![
                Span::styled(open, label_style),
                Span::styled("▇".repeat(length), Style::default().fg(color)),
                Span::raw(" ".repeat(bar_space - length + 1)),
                Span::styled(format!("{}{close}", slice.label), label_style),
            ])
        })
        .collect()
}

/// Whole cells out of `space` for `value` relative to `max`
fn scaled(value: f64, max: f64, space: usize) -> usize {
    if max <= 0.0 || value <= 0.0 {
        return 0;
    }
    // Ratio is within 0..=1, so the product fits in `space`
    let cells = (value / max * space as f64).round() as usize;
    cells.min(space)
}

// ============================================================================
// Plots
// ============================================================================

/// A character grid, top row first
struct Plot {
    cells: Vec<Vec<(char, Color)>>,
    width: usize,
}

impl Plot {
    fn new(width: usize) -> Self {
        Self {
            cells: vec![vec![(' ', Color::Reset); width]; PLOT_HEIGHT],
            width,
        }
    }

    fn set(&mut self, col: usize, row: usize, glyph: char, color: Color) {
        if col < self.width && row < PLOT_HEIGHT {
            self.cells[row][col] = (glyph, color);
        }
    }

    fn into_lines(self, y_labels: (String, String)) -> Vec<Line<'static>> {
        let label_width = y_labels.0.chars().count().max(y_labels.1.chars().count());
        self.cells
            .into_iter()
            .enumerate()
            .map(|(row, cells)| {
                let label = match row {
                    0 => y_labels.0.clone(),
                    r if r == PLOT_HEIGHT - 1 => y_labels.1.clone(),
                    _ => String::new(),
                };
                let mut spans = vec![Span::styled(
                    format!("{label:>label_width$} │"),
                    Style::default().fg(DIM_GRAY),
                )];
                spans.extend(
                    cells
                        .into_iter()
                        .map(|(glyph, color)| Span::styled(glyph.to_string(), Style::default().fg(color))),
                );
                Line::from(spans)
            })
            .collect()
    }
}

/// Smallest and largest numeric value
fn y_range<'a>(values: impl Iterator<Item = &'a ChartValue>) -> Option<(f64, f64)> {
    let numbers: Vec<f64> = values.filter_map(ChartValue::as_f64).collect();
    let min = numbers.iter().copied().reduce(f64::min)?;
    let max = numbers.iter().copied().reduce(f64::max)?;
    Some((min, max))
}

/// Plot row for `value` within `range`, 0 at the top
fn plot_row(value: f64, (min, max): (f64, f64)) -> usize {
    if max <= min {
        return PLOT_HEIGHT / 2;
    }
    // Ratio is within 0..=1
    let level = ((value - min) / (max - min) * (PLOT_HEIGHT - 1) as f64).round() as usize;
    PLOT_HEIGHT - 1 - level.min(PLOT_HEIGHT - 1)
}

/// Column of point `index` out of `count`, spread across `width`
fn plot_col(index: usize, count: usize, width: usize) -> usize {
    if count <= 1 || width <= 1 {
        0
    } else {
        index * (width - 1) / (count - 1)
    }
}

fn x_axis(first: &ChartValue, last: &ChartValue, label_width: usize, width: usize) -> Line<'static> {
    let first = first.to_string();
    let last = last.to_string();
    let gap = width.saturating_sub(first.chars().count() + last.chars().count()).max(1);
    Line::from(Span::styled(
        format!("{:label_width$}  {first}{}{last}", "", " ".repeat(gap)),
        Style::default().fg(DIM_GRAY),
    ))
}

fn y_labels(range: (f64, f64)) -> (String, String) {
    (
        ChartValue::Number(range.1).to_string(),
        ChartValue::Number(range.0).to_string(),
    )
}

fn series_lines(
    points: &[SeriesPoint],
    color: PaletteColor,
    filled: bool,
    width: usize,
) -> Vec<Line<'static>> {
    let Some(range) = y_range(points.iter().map(|p| &p.y)) else {
        return vec![empty_plot_line()];
    };
    let labels = y_labels(range);
    let label_width = labels.0.chars().count().max(labels.1.chars().count());
    let plot_width = width.saturating_sub(label_width + 2).max(1);
    let color = theme::palette(color);

    let mut plot = Plot::new(plot_width);
    let mut previous: Option<(usize, usize)> = None;
    for (i, point) in points.iter().enumerate() {
        let Some(y) = point.y.as_f64() else {
            previous = None;
            continue;
        };
        let col = plot_col(i, points.len(), plot_width);
        let row = plot_row(y, range);

        if let Some((prev_col, prev_row)) = previous {
            // Connect to the previous point
            for c in prev_col + 1..col {
                let t = (c - prev_col) as f64 / (col - prev_col) as f64;
                let r = (prev_row as f64 + (row as f64 - prev_row as f64) * t).round() as usize;
                plot.set(c, r, '·', color);
                if filled {
                    fill_below(&mut plot, c, r, color);
                }
            }
        }
        if filled {
            fill_below(&mut plot, col, row, color);
        }
        plot.set(col, row, '•', color);
        previous = Some((col, row));
    }

    let mut lines = plot.into_lines(labels);
    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        lines.push(x_axis(&first.x, &last.x, label_width, plot_width));
    }
    lines
}

fn fill_below(plot: &mut Plot, col: usize, row: usize, color: Color) {
    for r in row + 1..PLOT_HEIGHT {
        plot.set(col, r, '░', theme::with_opacity(color, 0.6));
    }
}

fn scatter_lines(points: &[ScatterPoint], width: usize) -> Vec<Line<'static>> {
    let Some(range) = y_range(points.iter().map(|p| &p.y)) else {
        return vec![empty_plot_line()];
    };
    let labels = y_labels(range);
    let label_width = labels.0.chars().count().max(labels.1.chars().count());
    let plot_width = width.saturating_sub(label_width + 2).max(1);

    // Numeric x spreads by value; otherwise points keep row order
    let x_numeric = points.iter().all(|p| p.x.as_f64().is_some());
    let x_range = if x_numeric {
        y_range(points.iter().map(|p| &p.x))
    } else {
        None
    };

    let mut plot = Plot::new(plot_width);
    for (i, point) in points.iter().enumerate() {
        let Some(y) = point.y.as_f64() else {
            continue;
        };
        let col = match (x_range, point.x.as_f64()) {
            (Some((min, max)), Some(x)) if max > min => {
                // Ratio is within 0..=1
                ((x - min) / (max - min) * (plot_width - 1) as f64).round() as usize
            }
            _ => plot_col(i, points.len(), plot_width),
        };
        plot.set(col, plot_row(y, range), '●', theme::palette(point.color));
    }

    let mut lines = plot.into_lines(labels);
    if let (Some((min, max)), true) = (x_range, x_numeric) {
        lines.push(x_axis(
            &ChartValue::Number(min),
            &ChartValue::Number(max),
            label_width,
            plot_width,
        ));
    } else if let (Some(first), Some(last)) = (points.first(), points.last()) {
        lines.push(x_axis(&first.x, &last.x, label_width, plot_width));
    }
    lines
}

fn empty_plot_line() -> Line<'static> {
    Line::from(Span::styled(
        "No numeric values to plot",
        Style::default().fg(DIM_GRAY),
    ))
}

fn clip(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut clipped: String = text.chars().take(max.saturating_sub(1)).collect();
        clipped.push('…');
        clipped
    }
}
