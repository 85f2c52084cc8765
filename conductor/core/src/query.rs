//! Query Result Model
//!
//! The data returned by the analysis service for a single natural-language
//! question. The service translates the question into a structured query,
//! executes it and returns the rows alongside a chart hint, a free-text
//! summary and follow-up recommendations.
//!
//! Field names on the wire follow the service's camelCase JSON; the Rust
//! names describe what the fields hold.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One result row: column name to arbitrary JSON value.
///
/// Key order is the order the service emitted them in, which is what the
/// table renderer uses to derive column order.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// A completed query as returned by the analysis service
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// The structured query text that was executed
    #[serde(rename = "sql")]
    pub query_text: String,
    /// Result rows, possibly more than any renderer will display
    #[serde(rename = "data", default, deserialize_with = "null_as_default")]
    pub rows: Vec<Row>,
    /// Total row count reported by the service
    #[serde(rename = "rowCount", default, deserialize_with = "null_as_default")]
    pub row_count: usize,
    /// Suggested visualization
    #[serde(rename = "chartSuggestion", default, deserialize_with = "null_as_default")]
    pub chart_suggestion: ChartSuggestion,
    /// Follow-up questions the user may want to ask next
    #[serde(default, deserialize_with = "null_as_default")]
    pub recommendations: Vec<Recommendation>,
    /// Free-text summary of the result (may be empty)
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    /// Query execution time reported by the service, in milliseconds
    #[serde(rename = "executionTime", default, deserialize_with = "null_as_default")]
    pub elapsed_ms: u64,
}

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl QueryResult {
    /// Column names in the order of the first row's keys.
    ///
    /// Keys that only appear in later rows are not columns.
    pub fn columns(&self) -> Vec<String> {
        self.rows
            .first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// The assistant text recorded for this result
    pub fn headline(&self) -> String {
        format!("Found {} results in {}ms", self.row_count, self.elapsed_ms)
    }
}

/// Visualization kinds the service may suggest
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// Tabular display only, no chart
    #[default]
    Table,
    /// Vertical bar chart
    Bar,
    /// Line chart
    Line,
    /// Pie chart
    Pie,
    /// Filled area chart
    Area,
    /// Scatter plot
    Scatter,
}

impl ChartKind {
    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Pie => "pie",
            Self::Area => "area",
            Self::Scatter => "scatter",
        }
    }
}

/// Chart hint attached to a result
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSuggestion {
    /// Suggested visualization
    #[serde(rename = "type", default)]
    pub kind: ChartKind,
    /// Category / x axis field
    #[serde(rename = "xAxis", default, skip_serializing_if = "Option::is_none")]
    pub x_field: Option<String>,
    /// Value / y axis field
    #[serde(rename = "yAxis", default, skip_serializing_if = "Option::is_none")]
    pub y_field: Option<String>,
    /// Chart title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Why a recommendation was suggested
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationCategory {
    /// Explain something notable in the result
    Insight,
    /// Look deeper into a subset
    DrillDown,
    /// Compare against another slice
    Comparison,
    /// Look at change over time
    Trend,
    /// Investigate an outlier
    Anomaly,
    /// Any category this client does not know
    #[default]
    #[serde(other)]
    Other,
}

impl RecommendationCategory {
    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Insight => "Insight",
            Self::DrillDown => "Drill down",
            Self::Comparison => "Comparison",
            Self::Trend => "Trend",
            Self::Anomaly => "Anomaly",
            Self::Other => "Suggestion",
        }
    }
}

/// A suggested follow-up question
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// The question to ask if the user activates this recommendation
    pub question: String,
    /// Why the question is worth asking
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Category of the suggestion
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub category: RecommendationCategory,
}

/// Metadata for a table attached to a project
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    /// Table identifier
    #[serde(default)]
    pub id: String,
    /// Owning project
    #[serde(rename = "projectId", default)]
    pub project_id: String,
    /// Table name as used in queries
    #[serde(rename = "tableName")]
    pub table_name: String,
    /// Original upload file name
    #[serde(rename = "originalName", default)]
    pub original_name: String,
    /// Column names
    #[serde(default)]
    pub columns: Vec<String>,
    /// Upload time
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A project groups the tables a conversation queries
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Project identifier
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Tables uploaded to this project
    #[serde(default)]
    pub tables: Vec<TableMetadata>,
    /// Creation time
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification time
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}
