//! Chart tab
//!
//! A chart is only built from a [`ChartSpec`] that carries both axis fields,
//! so a suggestion with a missing field can only ever become
//! [`ChartSpec::TableOnly`].

use serde_json::Value;

use crate::query::{ChartKind, ChartSuggestion, Row};

/// Number of colors in the chart palette
pub const PALETTE_SIZE: usize = 5;

/// Opacity of bars that are not hovered while another bar is
pub const DIMMED_BAR_OPACITY: f32 = 0.6;

/// Opacity of slices that are not hovered while another slice is
pub const DIMMED_SLICE_OPACITY: f32 = 0.8;

/// Smallest chart width in pixels
const MIN_CHART_WIDTH_PX: u32 = 600;

/// Width in pixels given to each data point
const CHART_WIDTH_PER_POINT_PX: u32 = 60;

/// Index into the chart palette
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PaletteColor(pub usize);

impl PaletteColor {
    /// Color for the `index`-th data point
    pub fn for_index(index: usize) -> Self {
        Self(index % PALETTE_SIZE)
    }
}

// ============================================================================
// Value coercion
// ============================================================================

/// A cell value prepared for a chart axis
#[derive(Clone, Debug, PartialEq)]
pub enum ChartValue {
    /// Numeric, either a JSON number or text that parsed as one
    Number(f64),
    /// Anything else, as display text
    Text(String),
    /// Absent or null
    Missing,
}

impl ChartValue {
    /// Coerce a raw cell
    pub fn coerce(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Missing,
            Some(Value::Number(n)) => n.as_f64().map_or(Self::Missing, Self::Number),
            Some(Value::String(s)) => parse_numeric(s).map_or_else(|| Self::Text(s.clone()), Self::Number),
            Some(Value::Bool(b)) => Self::Text(b.to_string()),
            Some(nested) => Self::Text(nested.to_string()),
        }
    }

    /// Numeric value, if any
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChartValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Missing => Ok(()),
        }
    }
}

/// Parse text that is entirely a finite number, ignoring surrounding
/// whitespace. Empty text is not a number.
pub fn parse_numeric(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

// ============================================================================
// Chart selection
// ============================================================================

/// The two fields every chart kind plots
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChartAxes {
    /// Category / x field
    pub x_field: String,
    /// Value / y field
    pub y_field: String,
}

/// What to draw, decided once per result
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChartSpec {
    /// No chart; the table tab stands alone
    TableOnly,
    /// Bar chart
    Bar(ChartAxes),
    /// Line chart
    Line(ChartAxes),
    /// Pie chart
    Pie(ChartAxes),
    /// Area chart
    Area(ChartAxes),
    /// Scatter plot
    Scatter(ChartAxes),
}

impl ChartSpec {
    /// Resolve a suggestion. Missing or empty axis fields mean no chart.
    pub fn from_suggestion(suggestion: &ChartSuggestion) -> Self {
        let axes = match (
            suggestion.x_field.as_deref(),
            suggestion.y_field.as_deref(),
        ) {
            (Some(x), Some(y)) if !x.is_empty() && !y.is_empty() => ChartAxes {
                x_field: x.to_string(),
                y_field: y.to_string(),
            },
            _ => return Self::TableOnly,
        };

        match suggestion.kind {
            ChartKind::Table => Self::TableOnly,
            ChartKind::Bar => Self::Bar(axes),
            ChartKind::Line => Self::Line(axes),
            ChartKind::Pie => Self::Pie(axes),
            ChartKind::Area => Self::Area(axes),
            ChartKind::Scatter => Self::Scatter(axes),
        }
    }

    /// True unless table-only
    pub fn has_chart(&self) -> bool {
        !matches!(self, Self::TableOnly)
    }
}

// ============================================================================
// Chart views
// ============================================================================

/// Title and axis names shared by every chart kind
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChartFrame {
    /// Title, when the service gave one
    pub title: Option<String>,
    /// Category / x field
    pub x_field: String,
    /// Value / y field
    pub y_field: String,
}

/// One bar
#[derive(Clone, Debug, PartialEq)]
pub struct BarDatum {
    /// Category label
    pub category: ChartValue,
    /// Bar height
    pub value: ChartValue,
    /// Fill color
    pub color: PaletteColor,
}

/// One pie slice
#[derive(Clone, Debug, PartialEq)]
pub struct PieSlice {
    /// Slice name
    pub name: String,
    /// Slice value
    pub value: ChartValue,
    /// Share of the total, rounded to a whole percent
    pub percent: u32,
    /// `"{name}: {value} ({percent}%)"`
    pub label: String,
    /// Fill color
    pub color: PaletteColor,
}

/// One point of a line or area series
#[derive(Clone, Debug, PartialEq)]
pub struct SeriesPoint {
    /// X value
    pub x: ChartValue,
    /// Y value
    pub y: ChartValue,
}

/// One scatter point
#[derive(Clone, Debug, PartialEq)]
pub struct ScatterPoint {
    /// X value
    pub x: ChartValue,
    /// Y value
    pub y: ChartValue,
    /// Fill color
    pub color: PaletteColor,
}

/// A chart ready to draw
#[derive(Clone, Debug, PartialEq)]
pub enum ChartView {
    /// Bar chart, one color per bar
    Bar {
        /// Title and axes
        frame: ChartFrame,
        /// Bars in row order
        bars: Vec<BarDatum>,
    },
    /// Pie chart
    Pie {
        /// Title and axes
        frame: ChartFrame,
        /// Slices in row order
        slices: Vec<PieSlice>,
    },
    /// Single-series line chart
    Line {
        /// Title and axes
        frame: ChartFrame,
        /// Points in row order
        points: Vec<SeriesPoint>,
        /// Series color
        color: PaletteColor,
    },
    /// Single-series area chart
    Area {
        /// Title and axes
        frame: ChartFrame,
        /// Points in row order
        points: Vec<SeriesPoint>,
        /// Series color
        color: PaletteColor,
    },
    /// Scatter plot, one color per point
    Scatter {
        /// Title and axes
        frame: ChartFrame,
        /// Points in row order
        points: Vec<ScatterPoint>,
    },
}

impl ChartView {
    /// Build the chart for `spec` from already-limited rows.
    ///
    /// Only fields that are among `columns` are read; any other field is
    /// missing on every row.
    pub fn build(
        spec: &ChartSpec,
        title: Option<&str>,
        rows: &[Row],
        columns: &[String],
    ) -> Option<Self> {
        let (axes, kind) = match spec {
            ChartSpec::TableOnly => return None,
            ChartSpec::Bar(axes) => (axes, ChartKind::Bar),
            ChartSpec::Line(axes) => (axes, ChartKind::Line),
            ChartSpec::Pie(axes) => (axes, ChartKind::Pie),
            ChartSpec::Area(axes) => (axes, ChartKind::Area),
            ChartSpec::Scatter(axes) => (axes, ChartKind::Scatter),
        };

        let frame = ChartFrame {
            title: title.filter(|t| !t.is_empty()).map(str::to_string),
            x_field: axes.x_field.clone(),
            y_field: axes.y_field.clone(),
        };
        let field = |row: &Row, name: &str| {
            if columns.iter().any(|c| c == name) {
                ChartValue::coerce(row.get(name))
            } else {
                ChartValue::Missing
            }
        };
        let pairs: Vec<(ChartValue, ChartValue)> = rows
            .iter()
            .map(|row| (field(row, &axes.x_field), field(row, &axes.y_field)))
            .collect();

        Some(match kind {
            ChartKind::Bar => Self::Bar {
                frame,
                bars: pairs
                    .into_iter()
                    .enumerate()
                    .map(|(i, (category, value))| BarDatum {
                        category,
                        value,
                        color: PaletteColor::for_index(i),
                    })
                    .collect(),
            },
            ChartKind::Pie => Self::Pie {
                frame,
                slices: pie_slices(pairs),
            },
            ChartKind::Line | ChartKind::Area => {
                let points = pairs
                    .into_iter()
                    .map(|(x, y)| SeriesPoint { x, y })
                    .collect();
                let color = PaletteColor(0);
                if kind == ChartKind::Line {
                    Self::Line { frame, points, color }
                } else {
                    Self::Area { frame, points, color }
                }
            }
            ChartKind::Scatter => Self::Scatter {
                frame,
                points: pairs
                    .into_iter()
                    .enumerate()
                    .map(|(i, (x, y))| ScatterPoint {
                        x,
                        y,
                        color: PaletteColor::for_index(i),
                    })
                    .collect(),
            },
            ChartKind::Table => return None,
        })
    }

    /// The kind of chart
    pub fn kind(&self) -> ChartKind {
        match self {
            Self::Bar { .. } => ChartKind::Bar,
            Self::Pie { .. } => ChartKind::Pie,
            Self::Line { .. } => ChartKind::Line,
            Self::Area { .. } => ChartKind::Area,
            Self::Scatter { .. } => ChartKind::Scatter,
        }
    }

    /// Title and axes
    pub fn frame(&self) -> &ChartFrame {
        match self {
            Self::Bar { frame, .. }
            | Self::Pie { frame, .. }
            | Self::Line { frame, .. }
            | Self::Area { frame, .. }
            | Self::Scatter { frame, .. } => frame,
        }
    }

    /// Number of bars, slices or points
    pub fn len(&self) -> usize {
        match self {
            Self::Bar { bars, .. } => bars.len(),
            Self::Pie { slices, .. } => slices.len(),
            Self::Line { points, .. } | Self::Area { points, .. } => points.len(),
            Self::Scatter { points, .. } => points.len(),
        }
    }

    /// True when there is nothing to plot
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Minimum drawing width in pixels, so points do not crowd together.
    /// Pie charts fill whatever width they get.
    pub fn suggested_min_width(&self) -> Option<u32> {
        if matches!(self, Self::Pie { .. }) {
            return None;
        }
        let points = u32::try_from(self.len()).unwrap_or(u32::MAX);
        Some(MIN_CHART_WIDTH_PX.max(points.saturating_mul(CHART_WIDTH_PER_POINT_PX)))
    }
}

fn pie_slices(pairs: Vec<(ChartValue, ChartValue)>) -> Vec<PieSlice> {
    let weight = |value: &ChartValue| value.as_f64().filter(|n| *n > 0.0).unwrap_or(0.0);
    let total: f64 = pairs.iter().map(|(_, value)| weight(value)).sum();

    pairs
        .into_iter()
        .enumerate()
        .map(|(i, (name, value))| {
            let percent = if total > 0.0 {
                // Bounded to 0..=100 by construction
                (weight(&value) / total * 100.0).round() as u32
            } else {
                0
            };
            let name = name.to_string();
            let label = format!("{name}: {value} ({percent}%)");
            PieSlice {
                name,
                value,
                percent,
                label,
                color: PaletteColor::for_index(i),
            }
        })
        .collect()
}

// ============================================================================
// Hover emphasis
// ============================================================================

/// Emphasis for one pie slice
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SliceEmphasis {
    /// Fill opacity
    pub opacity: f32,
    /// Whether the slice is outlined
    pub outlined: bool,
}

/// Transient hover state of one result's chart
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HoverState {
    /// Hovered bar
    pub bar: Option<usize>,
    /// Hovered slice
    pub pie: Option<usize>,
}

impl HoverState {
    /// Opacity of bar `index`
    pub fn bar_opacity(&self, index: usize) -> f32 {
        match self.bar {
            Some(hovered) if hovered != index => DIMMED_BAR_OPACITY,
            _ => 1.0,
        }
    }

    /// Emphasis of slice `index`
    pub fn pie_emphasis(&self, index: usize) -> SliceEmphasis {
        match self.pie {
            None => SliceEmphasis {
                opacity: 1.0,
                outlined: false,
            },
            Some(hovered) if hovered == index => SliceEmphasis {
                opacity: 1.0,
                outlined: true,
            },
            Some(_) => SliceEmphasis {
                opacity: DIMMED_SLICE_OPACITY,
                outlined: false,
            },
        }
    }

    /// Move emphasis one step through `chart`'s bars or slices.
    ///
    /// Stepping past either end clears the emphasis. Other chart kinds have
    /// no hover emphasis.
    pub fn step(&mut self, chart: &ChartView, forward: bool) {
        let slot = match chart {
            ChartView::Bar { .. } => &mut self.bar,
            ChartView::Pie { .. } => &mut self.pie,
            _ => return,
        };
        let len = chart.len();
        *slot = match (*slot, forward) {
            _ if len == 0 => None,
            (None, true) => Some(0),
            (None, false) => Some(len - 1),
            (Some(i), true) if i + 1 < len => Some(i + 1),
            (Some(i), false) if i > 0 => Some(i - 1),
            _ => None,
        };
    }

    /// Drop any emphasis
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
