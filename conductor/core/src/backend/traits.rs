//! Analysis Backend Trait
//!
//! Trait definition for the remote analysis service. The Conductor only
//! needs to submit a question; listing tables and previewing rows are used
//! for the data-availability flag and the surface's `/tables` and
//! `/preview` commands.

use async_trait::async_trait;

use super::error::BackendError;
use crate::query::{QueryResult, Row, TableMetadata};

/// Analysis service trait
///
/// Implement this trait to point the Conductor at a different service or to
/// script responses in tests.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Get the backend name
    fn name(&self) -> &str;

    /// Check if the service is reachable
    async fn health_check(&self) -> bool;

    /// Translate a question into a query, run it and return the result
    async fn submit_query(
        &self,
        project_id: &str,
        question: &str,
    ) -> Result<QueryResult, BackendError>;

    /// Tables attached to a project
    async fn list_project_tables(
        &self,
        project_id: &str,
    ) -> Result<Vec<TableMetadata>, BackendError>;

    /// First `limit` rows of a table
    async fn preview_table(
        &self,
        project_id: &str,
        table_name: &str,
        limit: usize,
    ) -> Result<Vec<Row>, BackendError>;

    /// Whether the project has anything to ask questions about
    async fn has_data(&self, project_id: &str) -> Result<bool, BackendError> {
        let tables = self.list_project_tables(project_id).await?;
        Ok(!tables.is_empty())
    }
}
