//! Result Renderer
//!
//! Turns a [`QueryResult`] into a surface-agnostic view model: summary,
//! badges, a table, at most one chart, the query text and the follow-up
//! recommendations. Surfaces draw the view; they do not interpret the
//! payload themselves.
//!
//! # Rules
//!
//! - No rows: a single placeholder, nothing else.
//! - Columns come from the first row's keys.
//! - The table shows the first `table_row_limit` rows (100 by default).
//! - Charts use the first `chart_row_limit` rows (20 by default), with
//!   numeric-looking text coerced to numbers.
//! - The chart tab exists only when the suggestion names a chart kind and
//!   both axis fields; it is then the default tab.
//!
//! Rendering is pure. The only outward effect is
//! [`ResultRenderer::activate`], which asks the Conductor to submit a
//! recommendation's question.

mod chart;
mod recommendations;
mod table;

pub use chart::{
    parse_numeric, BarDatum, ChartAxes, ChartFrame, ChartSpec, ChartValue, ChartView,
    HoverState, PaletteColor, PieSlice, ScatterPoint, SeriesPoint, SliceEmphasis,
    DIMMED_BAR_OPACITY, DIMMED_SLICE_OPACITY, PALETTE_SIZE,
};
pub use recommendations::{
    CategoryColor, CategoryStyle, RecommendationEntry, RecommendationPanel, RequeryHandle,
    RequeryRequest, RECOMMENDATIONS_TITLE,
};
pub use table::{cell_text, TableView};

use crate::config::ConductorConfig;
use crate::query::QueryResult;

/// Placeholder for a result without rows
pub const EMPTY_RESULT_TEXT: &str = "No results found for your query.";

/// Tabs of a result card
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResultTab {
    /// Rows as a table
    Table,
    /// The suggested chart
    Chart,
    /// The executed query text
    Query,
}

impl ResultTab {
    /// Tab caption
    pub fn label(&self) -> &'static str {
        match self {
            Self::Table => "Table",
            Self::Chart => "Chart",
            Self::Query => "SQL",
        }
    }
}

/// Rendered result with rows
#[derive(Clone, Debug, PartialEq)]
pub struct ResultCard {
    /// Summary text, when the service gave one
    pub summary: Option<String>,
    /// `"{rowCount} rows"`
    pub row_badge: String,
    /// `"{elapsed}ms"`
    pub time_badge: String,
    /// Available tabs, in display order
    pub tabs: Vec<ResultTab>,
    /// Tab selected when the card first appears
    pub default_tab: ResultTab,
    /// Table tab
    pub table: TableView,
    /// Chart tab, if a chart could be built
    pub chart: Option<ChartView>,
    /// Query tab, verbatim
    pub query_text: String,
    /// Follow-up questions
    pub recommendations: RecommendationPanel,
}

impl ResultCard {
    /// The tab after `current`, wrapping around
    pub fn next_tab(&self, current: ResultTab) -> ResultTab {
        let index = self.tabs.iter().position(|t| *t == current).unwrap_or(0);
        self.tabs[(index + 1) % self.tabs.len()]
    }
}

/// What to draw for one result
#[derive(Clone, Debug, PartialEq)]
pub enum ResultView {
    /// No rows came back
    Empty {
        /// Placeholder text
        message: &'static str,
    },
    /// Rows came back
    Populated(Box<ResultCard>),
}

/// Builds result views and forwards recommendation activations
#[derive(Clone, Debug)]
pub struct ResultRenderer {
    table_row_limit: usize,
    chart_row_limit: usize,
    requery: Option<RequeryHandle>,
}

impl Default for ResultRenderer {
    fn default() -> Self {
        Self::from_config(&ConductorConfig::default())
    }
}

impl ResultRenderer {
    /// Renderer with the given row limits
    pub fn new(table_row_limit: usize, chart_row_limit: usize) -> Self {
        Self {
            table_row_limit,
            chart_row_limit,
            requery: None,
        }
    }

    /// Renderer with the configured row limits
    pub fn from_config(config: &ConductorConfig) -> Self {
        Self::new(config.table_row_limit, config.chart_row_limit)
    }

    /// Attach the channel recommendation activations are sent on
    #[must_use]
    pub fn with_requery(mut self, handle: RequeryHandle) -> Self {
        self.requery = Some(handle);
        self
    }

    /// Render a result
    pub fn render(&self, result: &QueryResult) -> ResultView {
        if result.rows.is_empty() {
            return ResultView::Empty {
                message: EMPTY_RESULT_TEXT,
            };
        }

        let columns = result.columns();
        let table = TableView::build(
            &result.rows,
            &columns,
            result.row_count,
            self.table_row_limit,
        );

        let spec = ChartSpec::from_suggestion(&result.chart_suggestion);
        let chart_rows = &result.rows[..result.rows.len().min(self.chart_row_limit)];
        let chart = ChartView::build(
            &spec,
            result.chart_suggestion.title.as_deref(),
            chart_rows,
            &columns,
        );

        let mut tabs = vec![ResultTab::Table];
        if chart.is_some() {
            tabs.push(ResultTab::Chart);
        }
        tabs.push(ResultTab::Query);
        let default_tab = if chart.is_some() {
            ResultTab::Chart
        } else {
            ResultTab::Table
        };

        ResultView::Populated(Box::new(ResultCard {
            summary: Some(result.summary.clone()).filter(|s| !s.trim().is_empty()),
            row_badge: format!("{} rows", result.row_count),
            time_badge: format!("{}ms", result.elapsed_ms),
            tabs,
            default_tab,
            table,
            chart,
            query_text: result.query_text.clone(),
            recommendations: RecommendationPanel::build(&result.recommendations),
        }))
    }

    /// Activate recommendation `index` of `panel`.
    ///
    /// Returns false when there is no such entry or no Conductor to ask.
    pub fn activate(&self, panel: &RecommendationPanel, index: usize) -> bool {
        self.requery
            .as_ref()
            .is_some_and(|handle| handle.activate(panel, index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{ChartKind, ChartSuggestion, Recommendation, RecommendationCategory, Row};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tokio::sync::mpsc;

    fn result(rows: Vec<Row>, row_count: usize, suggestion: ChartSuggestion) -> QueryResult {
        QueryResult {
            query_text: "SELECT category, count FROM t".to_string(),
            rows,
            row_count,
            chart_suggestion: suggestion,
            recommendations: Vec::new(),
            summary: String::new(),
            elapsed_ms: 12,
        }
    }

    fn bar(x: &str, y: &str) -> ChartSuggestion {
        ChartSuggestion {
            kind: ChartKind::Bar,
            x_field: Some(x.to_string()),
            y_field: Some(y.to_string()),
            title: Some("Counts".to_string()),
        }
    }

    fn row(value: serde_json::Value) -> Row {
        value.as_object().unwrap().clone()
    }

    fn card(view: ResultView) -> ResultCard {
        match view {
            ResultView::Populated(card) => *card,
            ResultView::Empty { .. } => panic!("expected a populated card"),
        }
    }

    #[test]
    fn test_empty_rows_render_placeholder_only() {
        let view = ResultRenderer::default().render(&result(Vec::new(), 0, bar("a", "b")));
        assert_eq!(
            view,
            ResultView::Empty {
                message: "No results found for your query."
            }
        );
    }

    #[test]
    fn test_bar_result_defaults_to_chart_tab() {
        let rows = vec![
            row(json!({"category": "A", "count": "10"})),
            row(json!({"category": "B", "count": "5"})),
        ];
        let card = card(ResultRenderer::default().render(&result(rows, 2, bar("category", "count"))));

        assert_eq!(
            card.tabs,
            vec![ResultTab::Table, ResultTab::Chart, ResultTab::Query]
        );
        assert_eq!(card.default_tab, ResultTab::Chart);
        assert_eq!(card.row_badge, "2 rows");
        assert_eq!(card.time_badge, "12ms");
        assert_eq!(card.summary, None);

        let Some(ChartView::Bar { frame, bars }) = card.chart else {
            panic!("expected a bar chart");
        };
        assert_eq!(frame.title.as_deref(), Some("Counts"));
        let values: Vec<Option<f64>> = bars.iter().map(|b| b.value.as_f64()).collect();
        assert_eq!(values, vec![Some(10.0), Some(5.0)]);
        let colors: Vec<PaletteColor> = bars.iter().map(|b| b.color).collect();
        assert_eq!(colors, vec![PaletteColor(0), PaletteColor(1)]);
    }

    #[test]
    fn test_missing_axis_falls_back_to_table() {
        let rows = vec![row(json!({"category": "A", "count": 1}))];
        let suggestion = ChartSuggestion {
            kind: ChartKind::Pie,
            x_field: Some("category".to_string()),
            y_field: None,
            title: None,
        };
        let card = card(ResultRenderer::default().render(&result(rows, 1, suggestion)));

        assert!(card.chart.is_none());
        assert_eq!(card.tabs, vec![ResultTab::Table, ResultTab::Query]);
        assert_eq!(card.default_tab, ResultTab::Table);
        assert_eq!(card.next_tab(ResultTab::Table), ResultTab::Query);
        assert_eq!(card.next_tab(ResultTab::Query), ResultTab::Table);
    }

    #[test]
    fn test_table_truncation_at_150_rows() {
        let rows: Vec<Row> = (0..150).map(|i| row(json!({"n": i}))).collect();
        let card = card(ResultRenderer::default().render(&result(
            rows,
            150,
            ChartSuggestion::default(),
        )));

        assert_eq!(card.table.rows.len(), 100);
        let note = card.table.truncation_note.unwrap();
        assert!(note.contains("150"), "{note}");
    }

    #[test]
    fn test_chart_uses_first_20_rows() {
        let rows: Vec<Row> = (0..50)
            .map(|i| row(json!({"category": format!("c{i}"), "count": i})))
            .collect();
        let card = card(ResultRenderer::default().render(&result(
            rows,
            50,
            bar("category", "count"),
        )));
        assert_eq!(card.chart.map(|c| c.len()), Some(20));
    }

    #[test]
    fn test_summary_and_query_text() {
        let mut payload = result(
            vec![row(json!({"n": 1}))],
            1,
            ChartSuggestion::default(),
        );
        payload.summary = "One row.".to_string();
        let card = card(ResultRenderer::default().render(&payload));

        assert_eq!(card.summary.as_deref(), Some("One row."));
        assert_eq!(card.query_text, "SELECT category, count FROM t");
    }

    #[test]
    fn test_activate_routes_through_requery_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let renderer = ResultRenderer::default().with_requery(RequeryHandle::new(tx));

        let mut payload = result(vec![row(json!({"n": 1}))], 1, ChartSuggestion::default());
        payload.recommendations = vec![Recommendation {
            question: "X".to_string(),
            description: String::new(),
            category: RecommendationCategory::Insight,
        }];
        let card = card(renderer.render(&payload));

        assert!(card.recommendations.is_visible());
        assert!(renderer.activate(&card.recommendations, 0));
        assert_eq!(rx.try_recv().unwrap().question, "X");
    }

    #[test]
    fn test_activate_without_channel_is_inert() {
        let panel = RecommendationPanel::build(&[Recommendation {
            question: "X".to_string(),
            description: String::new(),
            category: RecommendationCategory::Trend,
        }]);
        assert!(!ResultRenderer::default().activate(&panel, 0));
    }
}
