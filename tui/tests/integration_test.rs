//! Integration Tests for TUI + Conductor
//!
//! These tests drive the App the way a terminal would (key events in,
//! frames out) against a scripted analysis backend and a `TestBackend`
//! terminal.
//!
//! # Test Coverage
//!
//! 1. **Welcome screen**: Starter questions offered only when data exists
//! 2. **Question flow**: Typed question renders a result card
//! 3. **Input gating**: No data means only commands can be typed
//! 4. **Follow-ups**: Alt+N re-asks a recommendation's question
//! 5. **Teardown**: Esc ends the loop

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pretty_assertions::assert_eq;
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use serde_json::json;
use tokio::time::timeout;

use datachat_conductor::{
    AnalysisBackend, BackendError, ConductorConfig, QueryResult, ResultTab, Row, TableMetadata,
    EXAMPLE_QUESTIONS,
};
use datachat_tui::display::DisplayRole;
use datachat_tui::{App, ConductorClient};

// ============================================================================
// Scripted Backend
// ============================================================================

#[derive(Clone, Default)]
struct ScriptedBackend {
    has_tables: bool,
    requests: Arc<AtomicUsize>,
}

impl ScriptedBackend {
    fn with_data() -> Self {
        Self {
            has_tables: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl AnalysisBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn health_check(&self) -> bool {
        true
    }

    async fn submit_query(
        &self,
        _project_id: &str,
        _question: &str,
    ) -> Result<QueryResult, BackendError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Ok(serde_json::from_value(json!({
            "sql": "SELECT category, count(*) AS count FROM sales GROUP BY category",
            "data": [{"category": "A", "count": 3}, {"category": "B", "count": 1}],
            "rowCount": 2,
            "chartSuggestion": {"type": "bar", "xAxis": "category", "yAxis": "count"},
            "recommendations": [
                {"question": "Which category grew fastest?", "description": "", "type": "trend"}
            ],
            "summary": "Two categories",
            "executionTime": 9
        }))
        .expect("valid result"))
    }

    async fn list_project_tables(
        &self,
        project_id: &str,
    ) -> Result<Vec<TableMetadata>, BackendError> {
        if !self.has_tables {
            return Ok(Vec::new());
        }
        Ok(vec![serde_json::from_value(json!({
            "id": "t1",
            "projectId": project_id,
            "tableName": "sales",
            "originalName": "sales.csv",
            "columns": ["category", "count"]
        }))
        .expect("valid table")])
    }

    async fn preview_table(
        &self,
        _project_id: &str,
        _table_name: &str,
        _limit: usize,
    ) -> Result<Vec<Row>, BackendError> {
        Ok(Vec::new())
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn config() -> ConductorConfig {
    let mut config = ConductorConfig::default();
    config.project_id = Some("proj-1".to_string());
    config
}

async fn app(backend: ScriptedBackend) -> App<ScriptedBackend> {
    let mut app = App::with_client(ConductorClient::with_backend(backend, config()));
    app.connect().await.expect("connect");
    app
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

async fn type_text(app: &mut App<ScriptedBackend>, text: &str) {
    for c in text.chars() {
        app.handle_key(key(KeyCode::Char(c))).await.expect("key");
    }
}

/// Step the app until `done` holds, or fail after a second
async fn step_until(app: &mut App<ScriptedBackend>, done: impl Fn(&App<ScriptedBackend>) -> bool) {
    timeout(Duration::from_secs(1), async {
        while !done(app) {
            app.step().await;
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

fn screen(app: &mut App<ScriptedBackend>) -> String {
    let mut terminal = Terminal::new(TestBackend::new(100, 40)).expect("terminal");
    app.render(&mut terminal).expect("draw");
    let buffer = terminal.backend().buffer();
    (0..buffer.area.height)
        .map(|y| {
            (0..buffer.area.width)
                .map(|x| buffer[(x, y)].symbol().to_string())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_welcome_screen_offers_examples_with_data() {
    let mut app = app(ScriptedBackend::with_data()).await;
    let text = screen(&mut app);

    assert!(text.contains("Ask questions about your data"));
    assert!(text.contains(&format!("[F1] {}", EXAMPLE_QUESTIONS[0])));
    assert!(text.contains("Ask a question about your data..."));
}

#[tokio::test]
async fn test_welcome_screen_without_data() {
    let mut app = app(ScriptedBackend::default()).await;
    let text = screen(&mut app);

    assert!(text.contains("Upload some CSV files first"));
    assert!(!text.contains("[F1]"));
    assert!(text.contains("Upload CSV files to start asking questions..."));
}

#[tokio::test]
async fn test_typed_question_renders_result_card() {
    let mut app = app(ScriptedBackend::with_data()).await;

    type_text(&mut app, "counts by category").await;
    app.handle_key(key(KeyCode::Enter)).await.unwrap();
    step_until(&mut app, |app| app.display().messages.len() == 2).await;

    let display = app.display();
    assert_eq!(display.messages[0].role, DisplayRole::User);
    assert_eq!(display.messages[0].content, "counts by category");
    assert_eq!(display.messages[1].content, "Found 2 results in 9ms");
    assert_eq!(display.latest_card().unwrap().tab, ResultTab::Chart);
    assert!(display.input.is_empty());

    let text = screen(&mut app);
    assert!(text.contains("You: counts by category"));
    assert!(text.contains("[Chart]"));
    assert!(text.contains("Recommended Next Steps"));
}

#[tokio::test]
async fn test_example_key_fills_input() {
    let mut app = app(ScriptedBackend::with_data()).await;

    app.handle_key(key(KeyCode::F(2))).await.unwrap();
    app.step().await;

    assert_eq!(app.display().input, EXAMPLE_QUESTIONS[1]);
    assert!(app.display().messages.is_empty());
}

#[tokio::test]
async fn test_without_data_only_commands_can_be_typed() {
    let backend = ScriptedBackend::default();
    let requests = backend.requests.clone();
    let mut app = app(backend).await;

    type_text(&mut app, "hello").await;
    assert_eq!(app.display().input, "");

    type_text(&mut app, "/tables").await;
    assert_eq!(app.display().input, "/tables");
    app.handle_key(key(KeyCode::Enter)).await.unwrap();
    app.step().await;

    let notice = app.display().messages.last().unwrap();
    assert_eq!(notice.role, DisplayRole::System);
    assert_eq!(notice.content, "No tables in this project yet.");
    assert_eq!(requests.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_alt_number_asks_recommendation() {
    let backend = ScriptedBackend::with_data();
    let requests = backend.requests.clone();
    let mut app = app(backend).await;

    type_text(&mut app, "counts").await;
    app.handle_key(key(KeyCode::Enter)).await.unwrap();
    step_until(&mut app, |app| app.display().messages.len() == 2).await;

    app.handle_key(KeyEvent::new(KeyCode::Char('1'), KeyModifiers::ALT))
        .await
        .unwrap();
    step_until(&mut app, |app| app.display().messages.len() == 4).await;

    assert_eq!(app.display().messages[2].content, "Which category grew fastest?");
    assert_eq!(requests.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_tab_cycles_latest_card() {
    let mut app = app(ScriptedBackend::with_data()).await;

    type_text(&mut app, "counts").await;
    app.handle_key(key(KeyCode::Enter)).await.unwrap();
    step_until(&mut app, |app| app.display().messages.len() == 2).await;

    app.handle_key(key(KeyCode::Tab)).await.unwrap();
    assert_eq!(app.display().latest_card().unwrap().tab, ResultTab::Query);
    assert!(screen(&mut app).contains("SELECT category"));
}

#[tokio::test]
async fn test_escape_stops_the_loop() {
    let mut app = app(ScriptedBackend::with_data()).await;

    app.handle_key(key(KeyCode::Esc)).await.unwrap();
    app.step().await;

    assert!(app.display().quit);
    assert!(!app.is_running());
}
