//! Conductor Client
//!
//! Thin wrapper around the Conductor for TUI integration.
//! This client embeds the Conductor directly (no network between them) and
//! provides a convenient interface for sending events and receiving messages.
//!
//! # Architecture
//!
//! The TUI is a "thin client" - it doesn't contain any business logic.
//! All orchestration happens in the Conductor. The TUI's job is:
//! 1. Convert terminal events to SurfaceEvents
//! 2. Send SurfaceEvents to Conductor
//! 3. Receive ConductorMessages
//! 4. Render display state based on messages

use tokio::sync::mpsc;

use datachat_conductor::{
    AnalysisBackend, Conductor, ConductorConfig, ConductorMessage, ConductorState, HttpBackend,
    ResultRenderer, SurfaceEvent, SurfaceType,
};

/// Capacity of the Conductor -> TUI channel
const CHANNEL_CAPACITY: usize = 256;

/// Client for communicating with the embedded Conductor
pub struct ConductorClient<B: AnalysisBackend + 'static = HttpBackend> {
    /// The embedded Conductor instance
    conductor: Conductor<B>,
    /// Receiver for messages from Conductor
    rx: mpsc::Receiver<ConductorMessage>,
}

impl ConductorClient<HttpBackend> {
    /// Create a client talking to the configured analysis service
    pub fn new(config: ConductorConfig) -> anyhow::Result<Self> {
        let backend = HttpBackend::from_config(&config)?;
        Ok(Self::with_backend(backend, config))
    }
}

impl<B: AnalysisBackend + 'static> ConductorClient<B> {
    /// Create a client over any backend
    pub fn with_backend(backend: B, config: ConductorConfig) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let conductor = Conductor::new(backend, config, tx);
        Self { conductor, rx }
    }

    /// Connect this surface to the Conductor
    pub async fn connect(&mut self) -> anyhow::Result<()> {
        self.send_event(SurfaceEvent::Connected {
            surface_type: SurfaceType::Tui,
        })
        .await
    }

    /// Report the new input line
    pub async fn input_changed(&mut self, text: String) -> anyhow::Result<()> {
        self.send_event(SurfaceEvent::InputChanged { text }).await
    }

    /// Submit the current input line
    pub async fn submit(&mut self) -> anyhow::Result<()> {
        self.send_event(SurfaceEvent::Submit).await
    }

    /// Fill the input line with a starter question
    pub async fn select_example(&mut self, question: &str) -> anyhow::Result<()> {
        self.send_event(SurfaceEvent::ExampleSelected {
            question: question.to_string(),
        })
        .await
    }

    /// Tear the conversation down
    pub async fn teardown(&mut self) -> anyhow::Result<()> {
        self.send_event(SurfaceEvent::Teardown).await
    }

    /// Apply completions, re-queries and progress ticks (must be called regularly)
    pub async fn poll(&mut self) -> bool {
        self.conductor.poll().await
    }

    /// Wait for the in-flight question to resolve
    pub async fn wait_for_response(&mut self) -> bool {
        self.conductor.wait_for_response().await
    }

    /// Receive all pending messages from the Conductor (non-blocking)
    pub fn recv_all(&mut self) -> Vec<ConductorMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Get the current Conductor state
    pub fn state(&self) -> ConductorState {
        self.conductor.state()
    }

    /// Renderer wired to this Conductor's re-query channel
    pub fn renderer(&self) -> ResultRenderer {
        self.conductor.renderer()
    }

    /// Active project
    pub fn project_id(&self) -> &str {
        self.conductor.project_id()
    }

    /// Send raw surface event to Conductor
    pub async fn send_event(&mut self, event: SurfaceEvent) -> anyhow::Result<()> {
        self.conductor.handle_event(event).await
    }
}
