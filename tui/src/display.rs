//! Display State Types
//!
//! Types that represent the current display state for the TUI.
//! These are derived from ConductorMessages and used for rendering.
//!
//! # Design Philosophy
//!
//! The TUI is a "thin client" - it just renders what the Conductor tells it to.
//! Display state is the bridge between ConductorMessages and rendering.
//!
//! - DisplayMessage: A transcript entry, with its rendered result if any
//! - ResultState: Selected tab and chart hover for one result card
//! - DisplayNotification: The transient status-bar notice

use datachat_conductor::{
    ConductorMessage, ConductorState, HoverState, LayoutDirective, Message, MessageId,
    MessageRole, NotifyLevel, ProgressStage, ResultRenderer, ResultTab, ResultView, Row,
    TableMetadata, TableView,
};

/// Input placeholder when questions can be asked
pub const PLACEHOLDER_READY: &str = "Ask a question about your data...";

/// Input placeholder when the project has no tables
pub const PLACEHOLDER_NO_DATA: &str = "Upload CSV files to start asking questions...";

/// A rendered conversation message
#[derive(Clone, Debug)]
pub struct DisplayMessage {
    /// Unique message ID
    pub id: MessageId,
    /// Who sent this message
    pub role: DisplayRole,
    /// The message content
    pub content: String,
    /// What is drawn below the content
    pub body: DisplayBody,
}

impl DisplayMessage {
    /// Display form of a transcript message, rendering its result if any
    pub fn from_message(message: Message, renderer: &ResultRenderer) -> Self {
        let body = match &message.result {
            Some(result) => DisplayBody::Result(Box::new(ResultState::new(
                renderer.render(result),
            ))),
            None => DisplayBody::Text,
        };
        Self {
            id: message.id,
            role: message.role.into(),
            content: message.content,
            body,
        }
    }

    /// A local notice with a table under it
    pub fn system_table(content: impl Into<String>, table: TableView) -> Self {
        Self {
            id: MessageId::new(),
            role: DisplayRole::System,
            content: content.into(),
            body: DisplayBody::Table(table),
        }
    }

    /// A local notice
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role: DisplayRole::System,
            content: content.into(),
            body: DisplayBody::Text,
        }
    }

    /// Rendered result, if this message carries one with rows
    pub fn card(&self) -> Option<&ResultState> {
        match &self.body {
            DisplayBody::Result(state) if state.is_populated() => Some(state),
            _ => None,
        }
    }

    fn card_mut(&mut self) -> Option<&mut ResultState> {
        match &mut self.body {
            DisplayBody::Result(state) if state.is_populated() => Some(state),
            _ => None,
        }
    }
}

/// Display role for messages
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayRole {
    /// User input
    User,
    /// The analysis agent
    Assistant,
    /// Local notice (tables, previews)
    System,
}

impl From<MessageRole> for DisplayRole {
    fn from(role: MessageRole) -> Self {
        match role {
            MessageRole::User => DisplayRole::User,
            MessageRole::Assistant => DisplayRole::Assistant,
        }
    }
}

impl DisplayRole {
    /// Get the prefix for this role
    pub fn prefix(&self) -> &'static str {
        match self {
            DisplayRole::User => "You: ",
            DisplayRole::Assistant => "Agent: ",
            DisplayRole::System => "",
        }
    }
}

/// What a message shows beneath its text
#[derive(Clone, Debug)]
pub enum DisplayBody {
    /// Nothing
    Text,
    /// A query result
    Result(Box<ResultState>),
    /// A plain table (table listing, preview)
    Table(TableView),
}

/// A rendered result plus the user's view of it
#[derive(Clone, Debug)]
pub struct ResultState {
    /// The view model
    pub view: ResultView,
    /// Selected tab
    pub tab: ResultTab,
    /// Chart hover emphasis
    pub hover: HoverState,
}

impl ResultState {
    /// State for a freshly rendered view, on its default tab
    pub fn new(view: ResultView) -> Self {
        let tab = match &view {
            ResultView::Populated(card) => card.default_tab,
            ResultView::Empty { .. } => ResultTab::Table,
        };
        Self {
            view,
            tab,
            hover: HoverState::default(),
        }
    }

    fn is_populated(&self) -> bool {
        matches!(self.view, ResultView::Populated(_))
    }

    /// Select the next tab, wrapping around
    pub fn cycle_tab(&mut self) {
        if let ResultView::Populated(card) = &self.view {
            self.tab = card.next_tab(self.tab);
            self.hover.clear();
        }
    }
}

/// A notification to display
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayNotification {
    /// Notification level
    pub level: NotifyLevel,
    /// Message content
    pub message: String,
}

/// The full display state for the TUI
#[derive(Debug)]
pub struct DisplayState {
    /// Conversation messages and local notices
    pub messages: Vec<DisplayMessage>,
    /// Conductor state
    pub conductor_state: ConductorState,
    /// Whether the project has tables
    pub has_data: bool,
    /// The input line, as the Conductor last set it
    pub input: String,
    /// Progress stages; empty when nothing is pending
    pub progress: Vec<ProgressStage>,
    /// Pending notification (if any)
    pub notification: Option<DisplayNotification>,
    /// Message the transcript should bring into view
    pub scroll_request: Option<MessageId>,
    /// Set once the Conductor says goodbye
    pub quit: bool,
    renderer: ResultRenderer,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self::new(ResultRenderer::default())
    }
}

impl DisplayState {
    /// Create a new display state rendering results with `renderer`
    pub fn new(renderer: ResultRenderer) -> Self {
        Self {
            messages: Vec::new(),
            conductor_state: ConductorState::Idle,
            has_data: false,
            input: String::new(),
            progress: Vec::new(),
            notification: None,
            scroll_request: None,
            quit: false,
            renderer,
        }
    }

    /// Apply a ConductorMessage to update display state
    pub fn apply_message(&mut self, msg: ConductorMessage) {
        match msg {
            ConductorMessage::Message { message } => {
                self.messages
                    .push(DisplayMessage::from_message(message, &self.renderer));
            }

            // Input and availability
            ConductorMessage::InputBuffer { text } => {
                self.input = text;
            }
            ConductorMessage::DataAvailability { has_data } => {
                self.has_data = has_data;
            }

            ConductorMessage::Progress { stages } => {
                self.progress = stages;
            }

            // Project data
            ConductorMessage::Tables { tables } => {
                let notice = tables_notice(&tables);
                self.push_notice(notice);
            }
            ConductorMessage::Preview { table_name, rows } => {
                let notice = preview_notice(&table_name, &rows);
                self.push_notice(notice);
            }

            // Session control
            ConductorMessage::State { state } => {
                self.conductor_state = state;
            }
            ConductorMessage::Notify { level, message } => {
                self.notification = Some(DisplayNotification { level, message });
            }
            ConductorMessage::Layout { directive } => match directive {
                LayoutDirective::ScrollToMessage { message_id } => {
                    self.scroll_request = Some(message_id);
                }
                // The input line always has focus
                LayoutDirective::FocusInput => {}
            },
            ConductorMessage::Quit { message } => {
                self.quit = true;
                if let Some(message) = message {
                    self.notification = Some(DisplayNotification {
                        level: NotifyLevel::Info,
                        message,
                    });
                }
            }
        }
    }

    fn push_notice(&mut self, notice: DisplayMessage) {
        self.scroll_request = Some(notice.id.clone());
        self.messages.push(notice);
    }

    /// Clear the notification
    pub fn clear_notification(&mut self) {
        self.notification = None;
    }

    /// Take the pending scroll request
    pub fn take_scroll_request(&mut self) -> Option<MessageId> {
        self.scroll_request.take()
    }

    /// True when a typed question would be accepted
    pub fn is_input_enabled(&self) -> bool {
        self.has_data && self.conductor_state == ConductorState::Idle
    }

    /// True while a question is in flight
    pub fn is_submitting(&self) -> bool {
        self.conductor_state == ConductorState::Submitting
    }

    /// Placeholder for an empty input line
    pub fn placeholder(&self) -> &'static str {
        if self.has_data {
            PLACEHOLDER_READY
        } else {
            PLACEHOLDER_NO_DATA
        }
    }

    /// Starter questions are offered only before the first message
    pub fn examples_visible(&self) -> bool {
        self.messages.is_empty() && self.has_data
    }

    /// The newest populated result card
    pub fn latest_card(&self) -> Option<&ResultState> {
        self.messages.iter().rev().find_map(DisplayMessage::card)
    }

    fn latest_card_mut(&mut self) -> Option<&mut ResultState> {
        self.messages.iter_mut().rev().find_map(DisplayMessage::card_mut)
    }

    /// Cycle the newest card's tab; false when there is no card
    pub fn cycle_tab(&mut self) -> bool {
        match self.latest_card_mut() {
            Some(state) => {
                state.cycle_tab();
                true
            }
            None => false,
        }
    }

    /// Step hover emphasis on the newest card's chart, when it is showing
    pub fn step_hover(&mut self, forward: bool) -> bool {
        let Some(state) = self.latest_card_mut() else {
            return false;
        };
        if state.tab != ResultTab::Chart {
            return false;
        }
        let ResultView::Populated(card) = &state.view else {
            return false;
        };
        match &card.chart {
            Some(chart) => {
                state.hover.step(chart, forward);
                true
            }
            None => false,
        }
    }

    /// Activate recommendation `index` of the newest card
    pub fn activate_recommendation(&self, index: usize) -> bool {
        let Some(state) = self.latest_card() else {
            return false;
        };
        match &state.view {
            ResultView::Populated(card) => self.renderer.activate(&card.recommendations, index),
            ResultView::Empty { .. } => false,
        }
    }
}

// ============================================================================
// Local notices
// ============================================================================

fn tables_notice(tables: &[TableMetadata]) -> DisplayMessage {
    if tables.is_empty() {
        return DisplayMessage::system("No tables in this project yet.");
    }
    let table = TableView {
        columns: vec!["table".to_string(), "file".to_string(), "columns".to_string()],
        rows: tables
            .iter()
            .map(|t| {
                vec![
                    t.table_name.clone(),
                    t.original_name.clone(),
                    t.columns.join(", "),
                ]
            })
            .collect(),
        truncation_note: None,
    };
    let content = match tables.len() {
        1 => "1 table in this project".to_string(),
        n => format!("{n} tables in this project"),
    };
    DisplayMessage::system_table(content, table)
}

fn preview_notice(table_name: &str, rows: &[Row]) -> DisplayMessage {
    if rows.is_empty() {
        return DisplayMessage::system(format!("{table_name} has no rows"));
    }
    let columns: Vec<String> = rows
        .first()
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default();
    let table = TableView::build(rows, &columns, rows.len(), rows.len());
    DisplayMessage::system_table(format!("Preview of {table_name}"), table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use datachat_conductor::{QueryResult, RequeryHandle};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tokio::sync::mpsc;

    fn result(value: serde_json::Value) -> QueryResult {
        serde_json::from_value(value).unwrap()
    }

    fn chart_result() -> QueryResult {
        result(json!({
            "sql": "SELECT category, count(*) FROM t GROUP BY 1",
            "data": [{"category": "A", "count": 3}, {"category": "B", "count": 1}],
            "rowCount": 2,
            "chartSuggestion": {"type": "bar", "xAxis": "category", "yAxis": "count"},
            "recommendations": [
                {"question": "Which category grew?", "description": "Trend", "type": "trend"}
            ],
            "summary": "",
            "executionTime": 12
        }))
    }

    fn assistant(result: QueryResult) -> ConductorMessage {
        ConductorMessage::Message {
            message: Message::assistant_with_result(result),
        }
    }

    #[test]
    fn test_display_role_from_message_role() {
        assert_eq!(DisplayRole::from(MessageRole::User), DisplayRole::User);
        assert_eq!(DisplayRole::from(MessageRole::Assistant), DisplayRole::Assistant);
    }

    #[test]
    fn test_display_role_prefix() {
        assert_eq!(DisplayRole::User.prefix(), "You: ");
        assert_eq!(DisplayRole::Assistant.prefix(), "Agent: ");
        assert_eq!(DisplayRole::System.prefix(), "");
    }

    #[test]
    fn test_result_opens_on_default_tab() {
        let mut display = DisplayState::default();
        display.apply_message(assistant(chart_result()));

        let card = display.latest_card().unwrap();
        assert_eq!(card.tab, ResultTab::Chart);
        assert_eq!(display.messages[0].content, "Found 2 results in 12ms");
    }

    #[test]
    fn test_failure_has_no_card() {
        let mut display = DisplayState::default();
        display.apply_message(ConductorMessage::Message {
            message: Message::assistant("Table not found"),
        });
        assert!(display.latest_card().is_none());
        assert!(!display.cycle_tab());
    }

    #[test]
    fn test_cycle_tab_wraps() {
        let mut display = DisplayState::default();
        display.apply_message(assistant(chart_result()));

        let tabs: Vec<ResultTab> = (0..3)
            .map(|_| {
                display.cycle_tab();
                display.latest_card().unwrap().tab
            })
            .collect();
        assert_eq!(tabs, vec![ResultTab::Query, ResultTab::Table, ResultTab::Chart]);
    }

    #[test]
    fn test_hover_only_on_chart_tab() {
        let mut display = DisplayState::default();
        display.apply_message(assistant(chart_result()));

        assert!(display.step_hover(true));
        assert_eq!(display.latest_card().unwrap().hover.bar, Some(0));

        // Leaving the chart tab drops the emphasis
        display.cycle_tab();
        assert_eq!(display.latest_card().unwrap().hover, HoverState::default());
        assert!(!display.step_hover(true));
    }

    #[test]
    fn test_recommendation_activation_sends_requery() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let renderer = ResultRenderer::default().with_requery(RequeryHandle::new(tx));
        let mut display = DisplayState::new(renderer);
        display.apply_message(assistant(chart_result()));

        assert!(display.activate_recommendation(0));
        assert!(!display.activate_recommendation(5));
        assert_eq!(rx.try_recv().unwrap().question, "Which category grew?");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_input_enabled_requires_data_and_idle() {
        let mut display = DisplayState::default();
        assert!(!display.is_input_enabled());
        assert_eq!(display.placeholder(), PLACEHOLDER_NO_DATA);

        display.apply_message(ConductorMessage::DataAvailability { has_data: true });
        assert!(display.is_input_enabled());
        assert_eq!(display.placeholder(), PLACEHOLDER_READY);

        display.apply_message(ConductorMessage::State {
            state: ConductorState::Submitting,
        });
        assert!(!display.is_input_enabled());
    }

    #[test]
    fn test_examples_hidden_after_first_message() {
        let mut display = DisplayState::default();
        display.apply_message(ConductorMessage::DataAvailability { has_data: true });
        assert!(display.examples_visible());

        display.apply_message(ConductorMessage::Message {
            message: Message::user("hello"),
        });
        assert!(!display.examples_visible());
    }

    #[test]
    fn test_tables_become_notice() {
        let mut display = DisplayState::default();
        let table: TableMetadata = serde_json::from_value(json!({
            "id": "t1",
            "projectId": "p1",
            "tableName": "sales",
            "originalName": "sales.csv",
            "columns": ["region", "amount"]
        }))
        .unwrap();
        display.apply_message(ConductorMessage::Tables {
            tables: vec![table],
        });

        let notice = display.messages[0].clone();
        assert_eq!(notice.role, DisplayRole::System);
        assert_eq!(notice.content, "1 table in this project");
        let DisplayBody::Table(view) = &notice.body else {
            panic!("expected a table");
        };
        assert_eq!(view.rows, vec![vec!["sales", "sales.csv", "region, amount"]]);
        assert_eq!(display.take_scroll_request(), Some(notice.id));
    }

    #[test]
    fn test_empty_preview_is_plain_notice() {
        let mut display = DisplayState::default();
        display.apply_message(ConductorMessage::Preview {
            table_name: "sales".to_string(),
            rows: Vec::new(),
        });
        assert_eq!(display.messages[0].content, "sales has no rows");
        assert!(matches!(display.messages[0].body, DisplayBody::Text));
    }

    #[test]
    fn test_layout_and_quit() {
        let mut display = DisplayState::default();
        let id = MessageId::new();
        display.apply_message(ConductorMessage::Layout {
            directive: LayoutDirective::ScrollToMessage {
                message_id: id.clone(),
            },
        });
        assert_eq!(display.take_scroll_request(), Some(id));
        assert_eq!(display.take_scroll_request(), None);

        display.apply_message(ConductorMessage::Quit { message: None });
        assert!(display.quit);
        assert!(display.notification.is_none());
    }
}
