//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin display client:
//! - Event loop (keyboard, mouse, resize)
//! - ConductorClient for orchestration
//! - DisplayState for rendering
//!
//! The App:
//! 1. Converts terminal events to SurfaceEvents
//! 2. Sends events to the embedded Conductor via ConductorClient
//! 3. Receives ConductorMessages and updates DisplayState
//! 4. Renders based on DisplayState

use std::io;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};
use futures::StreamExt;
use ratatui::backend::Backend;
use ratatui::Terminal;

use datachat_conductor::{AnalysisBackend, ConductorConfig, HttpBackend, EXAMPLE_QUESTIONS};

use crate::conductor_client::ConductorClient;
use crate::display::DisplayState;
use crate::ui::{self, ViewState};

/// How often the Conductor is polled when the terminal is quiet
const TICK: Duration = Duration::from_millis(50);

/// Lines moved per mouse wheel step
const WHEEL_LINES: isize = 3;

/// Main application state
pub struct App<B: AnalysisBackend + 'static = HttpBackend> {
    // === Core State ===
    /// Is the app still running?
    running: bool,

    // === Conductor Integration ===
    /// Client for communicating with the embedded Conductor
    conductor: ConductorClient<B>,
    /// Display state derived from ConductorMessages
    display: DisplayState,

    // === View State ===
    view: ViewState,
}

impl App<HttpBackend> {
    /// Create the app against the configured analysis service
    pub fn new(config: ConductorConfig) -> anyhow::Result<Self> {
        Ok(Self::with_client(ConductorClient::new(config)?))
    }
}

impl<B: AnalysisBackend + 'static> App<B> {
    /// Create the app over an existing client
    pub fn with_client(conductor: ConductorClient<B>) -> Self {
        let display = DisplayState::new(conductor.renderer());
        let view = ViewState {
            project: conductor.project_id().to_string(),
            ..ViewState::default()
        };
        Self {
            running: true,
            conductor,
            display,
            view,
        }
    }

    /// Display state, for inspection
    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    /// Whether the event loop is still running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Main event loop
    pub async fn run<T: Backend>(&mut self, terminal: &mut Terminal<T>) -> anyhow::Result<()> {
        let mut event_stream = EventStream::new();
        let mut ticker = tokio::time::interval(TICK);

        self.connect().await?;
        self.render(terminal)?;

        while self.running {
            tokio::select! {
                biased;

                // Terminal events first
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        // Only handle Press events (not Release or Repeat)
                        Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                            self.handle_key(key).await?;
                        }
                        Some(Ok(Event::Mouse(mouse))) => match mouse.kind {
                            MouseEventKind::ScrollUp => self.view.transcript.scroll(WHEEL_LINES),
                            MouseEventKind::ScrollDown => self.view.transcript.scroll(-WHEEL_LINES),
                            _ => {}
                        },
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::warn!(error = %e, "Terminal event error");
                        }
                        None => {
                            tracing::info!("Terminal event stream closed");
                            self.conductor.teardown().await?;
                        }
                    }
                }

                _ = ticker.tick() => {}
            }

            self.step().await;
            self.render(terminal)?;
        }

        Ok(())
    }

    /// Announce the surface and apply the Conductor's greeting state
    pub async fn connect(&mut self) -> anyhow::Result<()> {
        self.conductor.connect().await?;
        self.process_conductor_messages();
        Ok(())
    }

    /// Poll the Conductor and apply everything it sent
    pub async fn step(&mut self) {
        self.conductor.poll().await;
        self.process_conductor_messages();
        if self.display.quit {
            self.running = false;
        }
    }

    /// Process all pending messages from the Conductor
    fn process_conductor_messages(&mut self) {
        for msg in self.conductor.recv_all() {
            self.display.apply_message(msg);
        }
        if let Some(id) = self.display.take_scroll_request() {
            self.view.scroll_target = Some(id);
        }
    }

    /// Draw one frame
    pub fn render<T: Backend>(&mut self, terminal: &mut Terminal<T>) -> io::Result<()> {
        terminal.draw(|frame| ui::draw(frame, &self.display, &mut self.view))?;
        Ok(())
    }

    /// Handle keyboard input
    pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<()> {
        self.display.clear_notification();

        match key.code {
            // Quit
            KeyCode::Esc => self.conductor.teardown().await?,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.conductor.teardown().await?;
            }

            // Submit
            KeyCode::Enter => {
                self.view.transcript.scroll_to_bottom();
                self.conductor.submit().await?;
            }

            // Result card
            KeyCode::Tab => {
                self.display.cycle_tab();
            }
            KeyCode::Left => {
                self.display.step_hover(false);
            }
            KeyCode::Right => {
                self.display.step_hover(true);
            }
            KeyCode::Char(c @ '1'..='9') if key.modifiers.contains(KeyModifiers::ALT) => {
                let index = c as usize - '1' as usize;
                self.display.activate_recommendation(index);
            }

            // Starter questions
            KeyCode::F(n @ 1..=4) => {
                if self.display.examples_visible() {
                    if let Some(question) = EXAMPLE_QUESTIONS.get(usize::from(n - 1)) {
                        self.conductor.select_example(question).await?;
                    }
                }
            }

            // Typing
            KeyCode::Char(c) => {
                let mut text = self.display.input.clone();
                text.push(c);
                if self.accepts_input(&text) {
                    self.set_input(text).await?;
                }
            }
            KeyCode::Backspace => {
                let mut text = self.display.input.clone();
                if text.pop().is_some() && !self.display.is_submitting() {
                    self.set_input(text).await?;
                }
            }

            // Conversation scrolling
            KeyCode::PageUp => {
                let page = self.view.transcript.page();
                self.view.transcript.scroll(page);
            }
            KeyCode::PageDown => {
                let page = self.view.transcript.page();
                self.view.transcript.scroll(-page);
            }
            KeyCode::End if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.view.transcript.scroll_to_bottom();
            }

            _ => {}
        }

        Ok(())
    }

    /// Typing is locked while submitting; without data only commands
    /// can be typed
    fn accepts_input(&self, text: &str) -> bool {
        !self.display.is_submitting() && (self.display.has_data || text.starts_with('/'))
    }

    /// The Conductor owns the input line; the echo keeps the display in step
    async fn set_input(&mut self, text: String) -> anyhow::Result<()> {
        self.display.input.clone_from(&text);
        self.conductor.input_changed(text).await
    }
}
