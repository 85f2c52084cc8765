//! Conductor - The Conversation Controller
//!
//! The Conductor owns one conversation with the analysis service:
//! - The append-only transcript of questions and answers
//! - The Idle → Submitting → Idle state machine
//! - The simulated progress stages shown while a question is in flight
//! - Re-queries coming back from the Result Renderer
//! - The `/tables` and `/preview` collaborator commands
//!
//! # Design Philosophy
//!
//! The Conductor is UI-agnostic. It communicates through:
//! - `ConductorMessage`: Commands sent TO the UI surface
//! - `SurfaceEvent`: Events received FROM the UI surface
//!
//! # Cooperative Loop
//!
//! ```text
//! submit()  ── user message recorded, remote call spawned ──┐
//!                                                            │ Completion { epoch, outcome }
//! poll()    ◄── drains completions, re-queries, progress ────┘
//! ```
//!
//! A remote failure never escapes: it becomes an assistant message. After
//! [`Conductor::teardown`] the epoch moves on, so a response that arrives
//! late is dropped instead of being applied to a closed conversation.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::backend::{AnalysisBackend, BackendError};
use crate::config::ConductorConfig;
use crate::events::{SurfaceEvent, SurfaceType};
use crate::messages::{
    ConductorMessage, ConductorState, LayoutDirective, MessageId, NotifyLevel, RejectReason,
    SubmitOutcome,
};
use crate::progress::{Clock, ProgressIndicator, ProgressStage, SystemClock};
use crate::query::QueryResult;
use crate::render::{RequeryHandle, RequeryRequest, ResultRenderer};
use crate::session::{Message, Session};

/// Example questions offered on an empty transcript
pub const EXAMPLE_QUESTIONS: [&str; 4] = [
    "Show me all records from the first table",
    "What are the total counts by category?",
    "Find records where amount is greater than 100",
    "List customers who have orders",
];

/// Text shown for `/help`
pub const HELP_TEXT: &str =
    "Commands: /tables lists the project's tables, /preview <table> shows sample rows, /help";

/// Result of one spawned query, tagged with the epoch it was issued in
#[derive(Debug)]
struct Completion {
    epoch: u64,
    outcome: Result<QueryResult, BackendError>,
}

/// The outstanding remote call
struct InFlight {
    epoch: u64,
    handle: JoinHandle<()>,
    started: Instant,
}

/// The Conductor - conversation controller for one project
pub struct Conductor<B: AnalysisBackend, C: Clock = SystemClock> {
    config: ConductorConfig,
    project_id: String,
    backend: Arc<B>,
    session: Session,
    state: ConductorState,
    has_data: bool,
    input_buffer: String,
    progress: ProgressIndicator<C>,
    tx: mpsc::Sender<ConductorMessage>,
    surface_type: Option<SurfaceType>,

    /// Bumped on teardown; completions from an older epoch are stale
    epoch: u64,
    in_flight: Option<InFlight>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
    requery_tx: mpsc::UnboundedSender<RequeryRequest>,
    requery_rx: mpsc::UnboundedReceiver<RequeryRequest>,
}

impl<B: AnalysisBackend + 'static> Conductor<B, SystemClock> {
    /// Create a new Conductor driven by the wall clock
    pub fn new(backend: B, config: ConductorConfig, tx: mpsc::Sender<ConductorMessage>) -> Self {
        Self::with_clock(backend, config, tx, SystemClock)
    }
}

impl<B: AnalysisBackend + 'static, C: Clock> Conductor<B, C> {
    /// Create a new Conductor with an injected clock for the progress stages
    pub fn with_clock(
        backend: B,
        config: ConductorConfig,
        tx: mpsc::Sender<ConductorMessage>,
        clock: C,
    ) -> Self {
        let project_id = config.project_id.clone().unwrap_or_default();
        let progress = ProgressIndicator::new(clock, config.progress_interval);
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let (requery_tx, requery_rx) = mpsc::unbounded_channel();

        Self {
            session: Session::new(project_id.clone()),
            project_id,
            backend: Arc::new(backend),
            config,
            state: ConductorState::Idle,
            has_data: false,
            input_buffer: String::new(),
            progress,
            tx,
            surface_type: None,
            epoch: 0,
            in_flight: None,
            completion_tx,
            completion_rx,
            requery_tx,
            requery_rx,
        }
    }

    // ============================================
    // Accessors
    // ============================================

    /// Current state
    pub fn state(&self) -> ConductorState {
        self.state
    }

    /// The transcript
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Whether the project has data to ask about
    pub fn has_data(&self) -> bool {
        self.has_data
    }

    /// Current input text
    pub fn input_buffer(&self) -> &str {
        &self.input_buffer
    }

    /// Snapshot of the progress stages; empty while idle
    pub fn progress_stages(&self) -> &[ProgressStage] {
        self.progress.stages()
    }

    /// Project the conversation is about
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Effective configuration
    pub fn config(&self) -> &ConductorConfig {
        &self.config
    }

    /// Surface that announced itself, if any
    pub fn surface_type(&self) -> Option<&SurfaceType> {
        self.surface_type.as_ref()
    }

    /// Sender for re-query requests; each one is treated like a typed question
    pub fn requery_handle(&self) -> RequeryHandle {
        RequeryHandle::new(self.requery_tx.clone())
    }

    /// Result renderer wired back to this conversation
    pub fn renderer(&self) -> ResultRenderer {
        ResultRenderer::from_config(&self.config).with_requery(self.requery_handle())
    }

    // ============================================
    // Surface Events
    // ============================================

    /// Handle an event from a UI surface
    pub async fn handle_event(&mut self, event: SurfaceEvent) -> anyhow::Result<()> {
        if self.state == ConductorState::TornDown {
            tracing::debug!(?event, "Event ignored after teardown");
            return Ok(());
        }

        match event {
            SurfaceEvent::Connected { surface_type } => {
                tracing::info!(surface = surface_type.name(), "Surface connected");
                self.surface_type = Some(surface_type);

                // Bring the new surface up to date
                self.send(ConductorMessage::State { state: self.state })
                    .await;
                self.send(ConductorMessage::DataAvailability {
                    has_data: self.has_data,
                })
                .await;
                self.send(ConductorMessage::InputBuffer {
                    text: self.input_buffer.clone(),
                })
                .await;
                self.send_progress().await;
                for message in self.session.messages().to_vec() {
                    self.send(ConductorMessage::Message { message }).await;
                }

                if self.backend.health_check().await {
                    self.refresh_data_availability().await;
                } else {
                    tracing::warn!(
                        backend = self.backend.name(),
                        api_url = %self.config.api_url,
                        "Analysis service is not reachable"
                    );
                    self.notify(
                        NotifyLevel::Warning,
                        &format!("Analysis service at {} is not reachable", self.config.api_url),
                    )
                    .await;
                }
            }

            SurfaceEvent::Teardown => {
                self.teardown().await;
            }

            SurfaceEvent::InputChanged { text } => {
                self.input_buffer = text;
            }

            SurfaceEvent::Submit => {
                self.submit_input().await;
            }

            SurfaceEvent::SubmitQuestion { question }
            | SurfaceEvent::RecommendationActivated { question } => {
                self.submit(&question).await;
            }

            SurfaceEvent::ExampleSelected { question } => {
                self.set_input(question).await;
            }

            SurfaceEvent::DataAvailabilityChanged { has_data } => {
                self.set_has_data(has_data).await;
            }

            SurfaceEvent::TablesRequested => {
                self.list_tables().await;
            }

            SurfaceEvent::PreviewRequested { table_name } => {
                self.preview_table(&table_name).await;
            }
        }

        Ok(())
    }

    // ============================================
    // Submission
    // ============================================

    /// Submit a question.
    ///
    /// Rejections record nothing and send nothing.
    pub async fn submit(&mut self, question: &str) -> SubmitOutcome {
        let question = question.trim();

        let rejection = if self.state == ConductorState::TornDown {
            Some(RejectReason::TornDown)
        } else if question.is_empty() {
            Some(RejectReason::EmptyQuestion)
        } else if self.state == ConductorState::Submitting {
            Some(RejectReason::AlreadySubmitting)
        } else if !self.has_data {
            Some(RejectReason::NoData)
        } else {
            None
        };
        if let Some(reason) = rejection {
            tracing::debug!(reason = reason.description(), "Submission rejected");
            return SubmitOutcome::Rejected(reason);
        }

        let id = self.record(Message::user(question)).await;
        self.set_input(String::new()).await;
        self.set_state(ConductorState::Submitting).await;
        if self.progress.set_active(true) {
            self.send_progress().await;
        }

        let backend = Arc::clone(&self.backend);
        let completions = self.completion_tx.clone();
        let epoch = self.epoch;
        let project_id = self.project_id.clone();
        let owned_question = question.to_string();
        let handle = tokio::spawn(async move {
            let outcome = backend.submit_query(&project_id, &owned_question).await;
            // Receiver gone means the Conductor was dropped
            let _ = completions.send(Completion { epoch, outcome });
        });
        self.in_flight = Some(InFlight {
            epoch,
            handle,
            started: Instant::now(),
        });

        tracing::info!(
            project = %self.project_id,
            backend = self.backend.name(),
            "Question submitted"
        );
        SubmitOutcome::Accepted(id)
    }

    /// Submit the input buffer, or run it as a slash command.
    ///
    /// Returns `None` when the input was a command.
    pub async fn submit_input(&mut self) -> Option<SubmitOutcome> {
        let text = self.input_buffer.trim().to_string();
        if let Some(command) = text.strip_prefix('/') {
            let mut parts = command.split_whitespace();
            let name = parts.next().unwrap_or_default().to_string();
            let args: Vec<String> = parts.map(str::to_string).collect();
            self.set_input(String::new()).await;
            self.handle_command(&name, &args).await;
            return None;
        }
        Some(self.submit(&text).await)
    }

    /// Handle a slash command
    async fn handle_command(&mut self, command: &str, args: &[String]) {
        match command {
            "help" => {
                self.notify(NotifyLevel::Info, HELP_TEXT).await;
            }
            "tables" => {
                self.list_tables().await;
            }
            "preview" => {
                let table_name = args.join(" ");
                self.preview_table(&table_name).await;
            }
            _ => {
                self.notify(
                    NotifyLevel::Warning,
                    &format!("Unknown command: /{command}"),
                )
                .await;
            }
        }
    }

    // ============================================
    // Cooperative Step
    // ============================================

    /// Apply whatever has happened since the last call.
    ///
    /// Returns true if anything changed. Call this from the surface's loop.
    pub async fn poll(&mut self) -> bool {
        let mut changed = false;

        // Snapshot before draining: a task that finished without reporting is lost
        let finished = self
            .in_flight
            .as_ref()
            .is_some_and(|f| f.handle.is_finished());

        while let Ok(completion) = self.completion_rx.try_recv() {
            changed |= self.apply_completion(completion).await;
        }

        if finished {
            if let Some(in_flight) = self.in_flight.as_ref() {
                tracing::warn!("Query task ended without a response");
                let completion = Completion {
                    epoch: in_flight.epoch,
                    outcome: Err(BackendError::Task(
                        "request task ended unexpectedly".to_string(),
                    )),
                };
                changed |= self.apply_completion(completion).await;
            }
        }

        while let Ok(request) = self.requery_rx.try_recv() {
            tracing::debug!(question = %request.question, "Re-query requested");
            changed |= self.submit(&request.question).await.is_accepted();
        }

        if self.progress.update() {
            self.send_progress().await;
            changed = true;
        }

        changed
    }

    /// Wait until the outstanding question resolves, then apply it
    pub async fn wait_for_response(&mut self) -> bool {
        if let Some(in_flight) = self.in_flight.as_mut() {
            // Join errors surface as a lost task in poll()
            let _ = (&mut in_flight.handle).await;
        }
        self.poll().await
    }

    /// Apply one completion; stale ones are dropped
    async fn apply_completion(&mut self, completion: Completion) -> bool {
        if completion.epoch != self.epoch || self.state != ConductorState::Submitting {
            tracing::warn!(
                completion_epoch = completion.epoch,
                epoch = self.epoch,
                state = ?self.state,
                "Discarding stale query response"
            );
            return false;
        }

        let elapsed = self
            .in_flight
            .take()
            .map(|f| f.started.elapsed())
            .unwrap_or_default();

        let message = match completion.outcome {
            Ok(result) => {
                tracing::info!(
                    row_count = result.row_count,
                    elapsed_ms = result.elapsed_ms,
                    round_trip_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                    "Question answered"
                );
                Message::assistant_with_result(result)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Query failed");
                Message::assistant(e.user_message())
            }
        };

        self.record(message).await;
        if self.progress.set_active(false) {
            self.send_progress().await;
        }
        self.set_state(ConductorState::Idle).await;
        true
    }

    // ============================================
    // Data Availability
    // ============================================

    /// Set the externally supplied data-availability flag
    pub async fn set_has_data(&mut self, has_data: bool) {
        if self.has_data == has_data {
            return;
        }
        self.has_data = has_data;
        tracing::debug!(has_data, "Data availability changed");
        self.send(ConductorMessage::DataAvailability { has_data })
            .await;
    }

    /// Ask the service whether the project has tables.
    ///
    /// On failure the flag is left as it was.
    pub async fn refresh_data_availability(&mut self) -> bool {
        if self.project_id.is_empty() {
            self.notify(NotifyLevel::Warning, "No project selected").await;
            return self.has_data;
        }

        match self.backend.has_data(&self.project_id).await {
            Ok(has_data) => self.set_has_data(has_data).await,
            Err(e) => {
                tracing::warn!(error = %e, "Could not check project data");
                self.notify(
                    NotifyLevel::Warning,
                    &format!("Could not load project tables: {}", e.user_message()),
                )
                .await;
            }
        }
        self.has_data
    }

    // ============================================
    // Collaborator Commands
    // ============================================

    async fn list_tables(&mut self) {
        match self.backend.list_project_tables(&self.project_id).await {
            Ok(tables) => {
                self.set_has_data(!tables.is_empty()).await;
                self.send(ConductorMessage::Tables { tables }).await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Listing tables failed");
                self.notify(NotifyLevel::Error, &e.user_message()).await;
            }
        }
    }

    async fn preview_table(&mut self, table_name: &str) {
        let table_name = table_name.trim();
        if table_name.is_empty() {
            self.notify(NotifyLevel::Warning, "Usage: /preview <table>")
                .await;
            return;
        }

        match self
            .backend
            .preview_table(&self.project_id, table_name, self.config.preview_limit)
            .await
        {
            Ok(rows) => {
                self.send(ConductorMessage::Preview {
                    table_name: table_name.to_string(),
                    rows,
                })
                .await;
            }
            Err(e) => {
                tracing::warn!(error = %e, table = table_name, "Preview failed");
                self.notify(NotifyLevel::Error, &e.user_message()).await;
            }
        }
    }

    // ============================================
    // Teardown
    // ============================================

    /// Close the conversation; any response still on its way is ignored
    pub async fn teardown(&mut self) {
        if self.state == ConductorState::TornDown {
            return;
        }
        self.epoch += 1;
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.handle.abort();
        }
        if self.progress.set_active(false) {
            self.send_progress().await;
        }
        self.set_state(ConductorState::TornDown).await;
        self.send(ConductorMessage::Quit { message: None }).await;
        tracing::info!(messages = self.session.len(), "Conversation closed");
    }

    // ============================================
    // Helpers
    // ============================================

    /// Append to the transcript and scroll surfaces to it
    async fn record(&mut self, message: Message) -> MessageId {
        let id = self.session.push(message.clone());
        self.send(ConductorMessage::Message { message }).await;
        self.send(ConductorMessage::Layout {
            directive: LayoutDirective::ScrollToMessage {
                message_id: id.clone(),
            },
        })
        .await;
        id
    }

    async fn set_input(&mut self, text: String) {
        self.input_buffer = text;
        self.send(ConductorMessage::InputBuffer {
            text: self.input_buffer.clone(),
        })
        .await;
    }

    async fn send_progress(&self) {
        self.send(ConductorMessage::Progress {
            stages: self.progress.stages().to_vec(),
        })
        .await;
    }

    async fn set_state(&mut self, state: ConductorState) {
        tracing::debug!(from = ?self.state, to = ?state, "State transition");
        self.state = state;
        self.send(ConductorMessage::State { state }).await;
    }

    /// Send notification
    async fn notify(&self, level: NotifyLevel, message: &str) {
        self.send(ConductorMessage::Notify {
            level,
            message: message.to_string(),
        })
        .await;
    }

    /// Send a message to the UI surface
    async fn send(&self, msg: ConductorMessage) {
        if let Err(e) = self.tx.send(msg).await {
            tracing::warn!("Failed to send message to surface: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::MessageRole;
    use crate::query::{Row, TableMetadata};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    struct MockBackend {
        fail: bool,
    }

    #[async_trait]
    impl AnalysisBackend for MockBackend {
        fn name(&self) -> &str {
            "Mock"
        }

        async fn health_check(&self) -> bool {
            true
        }

        async fn submit_query(
            &self,
            _project_id: &str,
            _question: &str,
        ) -> Result<QueryResult, BackendError> {
            if self.fail {
                return Err(BackendError::Status {
                    status: 500,
                    message: Some("Table not found".to_string()),
                });
            }
            Ok(QueryResult {
                query_text: "SELECT 1".to_string(),
                rows: Vec::new(),
                row_count: 3,
                chart_suggestion: Default::default(),
                recommendations: Vec::new(),
                summary: String::new(),
                elapsed_ms: 7,
            })
        }

        async fn list_project_tables(
            &self,
            _project_id: &str,
        ) -> Result<Vec<TableMetadata>, BackendError> {
            Ok(Vec::new())
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

    fn conductor(fail: bool) -> (Conductor<MockBackend>, mpsc::Receiver<ConductorMessage>) {
        let (tx, rx) = mpsc::channel(256);
        let mut config = ConductorConfig::default();
        config.project_id = Some("p1".to_string());
        (Conductor::new(MockBackend { fail }, config, tx), rx)
    }

    #[tokio::test]
    async fn test_conductor_creation() {
        let (conductor, _rx) = conductor(false);
        assert_eq!(conductor.state(), ConductorState::Idle);
        assert!(!conductor.has_data());
        assert_eq!(conductor.project_id(), "p1");
    }

    #[tokio::test]
    async fn test_submit_without_data_is_rejected() {
        let (mut conductor, _rx) = conductor(false);
        assert_eq!(
            conductor.submit("hello").await,
            SubmitOutcome::Rejected(RejectReason::NoData)
        );
        assert!(conductor.session().is_empty());
    }

    #[tokio::test]
    async fn test_success_records_headline() {
        let (mut conductor, _rx) = conductor(false);
        conductor.set_has_data(true).await;

        assert!(conductor.submit("  count rows  ").await.is_accepted());
        assert_eq!(conductor.state(), ConductorState::Submitting);
        assert_eq!(conductor.session().messages()[0].content, "count rows");

        assert!(conductor.wait_for_response().await);
        let reply = conductor.session().last().unwrap();
        assert_eq!(reply.role, MessageRole::Assistant);
        assert_eq!(reply.content, "Found 3 results in 7ms");
        assert!(reply.result.is_some());
        assert_eq!(conductor.state(), ConductorState::Idle);
        assert!(conductor.progress_stages().is_empty());
    }

    #[tokio::test]
    async fn test_failure_becomes_message() {
        let (mut conductor, _rx) = conductor(true);
        conductor.set_has_data(true).await;
        conductor.submit("q").await;
        conductor.wait_for_response().await;

        let reply = conductor.session().last().unwrap();
        assert_eq!(reply.content, "Table not found");
        assert!(reply.result.is_none());
    }

    #[tokio::test]
    async fn test_slash_command_is_not_a_question() {
        let (mut conductor, mut rx) = conductor(false);
        conductor.set_has_data(true).await;
        conductor
            .handle_event(SurfaceEvent::InputChanged {
                text: "/help".to_string(),
            })
            .await
            .unwrap();
        conductor.handle_event(SurfaceEvent::Submit).await.unwrap();

        assert!(conductor.session().is_empty());
        let mut saw_help = false;
        while let Ok(msg) = rx.try_recv() {
            if let ConductorMessage::Notify { message, .. } = msg {
                saw_help |= message == HELP_TEXT;
            }
        }
        assert!(saw_help);
    }

    #[tokio::test]
    async fn test_teardown_is_final() {
        let (mut conductor, _rx) = conductor(false);
        conductor.set_has_data(true).await;
        conductor.teardown().await;

        assert_eq!(conductor.state(), ConductorState::TornDown);
        assert_eq!(
            conductor.submit("q").await,
            SubmitOutcome::Rejected(RejectReason::TornDown)
        );
    }
}
