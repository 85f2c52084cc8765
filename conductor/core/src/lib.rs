//! Conductor Core - Headless Conversation Engine for datachat
//!
//! This crate holds everything about asking questions of a project's data
//! that does not involve a terminal: the remote analysis client, the
//! conversation state machine, the simulated progress stages and the
//! surface-agnostic result view model. The TUI is one surface; the test
//! suite drives the same Conductor headless.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        UI Surfaces                               │
//! │        ┌──────────────────┐        ┌────────────────────┐        │
//! │        │   TUI (ratatui)  │        │  Headless / tests  │        │
//! │        └────────┬─────────┘        └─────────┬──────────┘        │
//! │                 └──────────────┬─────────────┘                   │
//! │                     SurfaceEvent (up)                            │
//! │                   ConductorMessage (down)                        │
//! └────────────────────────────────┼─────────────────────────────────┘
//!                                  │
//! ┌────────────────────────────────┼─────────────────────────────────┐
//! │                       CONDUCTOR CORE                             │
//! │  ┌─────────────────────────────┴──────────────────────────────┐  │
//! │  │                         Conductor                          │  │
//! │  │  ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌────────────┐  │  │
//! │  │  │ Session  │  │ Progress │  │  Result  │  │  Backend   │  │  │
//! │  │  │          │  │Indicator │  │ Renderer │  │   (HTTP)   │  │  │
//! │  │  └──────────┘  └──────────┘  └──────────┘  └────────────┘  │  │
//! │  └────────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Conductor`]: Owns the transcript and the Idle/Submitting state machine
//! - [`ConductorMessage`]: Messages sent from Conductor to UI surfaces
//! - [`SurfaceEvent`]: Events sent from UI surfaces to Conductor
//! - [`QueryResult`]: One answer from the analysis service
//! - [`ResultRenderer`]: Turns a result into tabs, table, chart and recommendations
//! - [`ProgressIndicator`]: Timer-driven stages shown while waiting
//!
//! # Quick Start
//!
//! ```ignore
//! use datachat_conductor::{
//!     load_config, Conductor, HttpBackend, SurfaceEvent, SurfaceType,
//! };
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let (tx, mut rx) = mpsc::channel(100);
//!
//!     let config = load_config()?;
//!     let backend = HttpBackend::from_config(&config)?;
//!     let mut conductor = Conductor::new(backend, config, tx);
//!
//!     conductor
//!         .handle_event(SurfaceEvent::Connected {
//!             surface_type: SurfaceType::Headless,
//!         })
//!         .await?;
//!     conductor
//!         .handle_event(SurfaceEvent::SubmitQuestion {
//!             question: "What are the total counts by category?".to_string(),
//!         })
//!         .await?;
//!     conductor.wait_for_response().await;
//!
//!     while let Ok(msg) = rx.try_recv() {
//!         // Render message
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`backend`]: Analysis service abstraction and its HTTP client
//! - [`conductor`]: Main Conductor struct
//! - [`config`]: Layered configuration (defaults, file, environment, CLI)
//! - [`events`]: Events from UI surfaces to Conductor
//! - [`messages`]: Messages from Conductor to UI surfaces
//! - [`progress`]: Simulated progress stages with an injectable clock
//! - [`query`]: Wire types returned by the analysis service
//! - [`render`]: Surface-agnostic result view model
//! - [`session`]: The append-only transcript
//!
//! # No TUI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework.

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod conductor;
pub mod config;
pub mod events;
pub mod messages;
pub mod progress;
pub mod query;
pub mod render;
pub mod session;

// Re-exports for convenience
pub use backend::{AnalysisBackend, BackendError, HttpBackend, GENERIC_FAILURE_MESSAGE};
pub use conductor::{Conductor, EXAMPLE_QUESTIONS, HELP_TEXT};
pub use events::{SurfaceEvent, SurfaceType};
pub use messages::{
    ConductorMessage, ConductorState, LayoutDirective, MessageId, MessageRole, NotifyLevel,
    RejectReason, SessionId, SubmitOutcome,
};
pub use progress::{
    Clock, ManualClock, ProgressIndicator, ProgressStage, StageStatus, SystemClock,
    DEFAULT_STAGE_INTERVAL, PROGRESS_HEADER, STAGE_LABELS,
};
pub use query::{
    ChartKind, ChartSuggestion, Project, QueryResult, Recommendation, RecommendationCategory, Row,
    TableMetadata,
};
pub use render::{
    ChartView, HoverState, RecommendationPanel, RequeryHandle, RequeryRequest, ResultCard,
    ResultRenderer, ResultTab, ResultView, TableView,
};
pub use session::{Message, Session};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, ConductorConfig, ConductorToml,
    ConfigError, ConfigOverrides, ConfigSource,
};
