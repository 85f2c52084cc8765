//! Conductor Messages
//!
//! Messages sent from the Conductor to UI surfaces. A surface renders the
//! transcript, the progress indicator and the input line purely from these
//! messages; it never decides on its own whether a question may be sent.
//!
//! # Design Philosophy
//!
//! The Conductor owns the conversation. Surfaces are renderers that report
//! what the user did ([`crate::events::SurfaceEvent`]) and display what they
//! are told. This keeps the whole submit/resolve lifecycle testable without
//! a terminal.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::progress::ProgressStage;
use crate::query::{Row, TableMetadata};
use crate::session::Message;

/// Messages from Conductor to UI Surface
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ConductorMessage {
    // ============================================
    // Conversation Messages
    // ============================================
    /// A message was appended to the transcript
    Message {
        /// The appended message
        message: Message,
    },

    // ============================================
    // Input / Availability
    // ============================================
    /// Replace the surface's input line
    InputBuffer {
        /// New input text
        text: String,
    },

    /// Whether the active project has any data to query
    DataAvailability {
        /// True when at least one table is attached
        has_data: bool,
    },

    // ============================================
    // Progress
    // ============================================
    /// Progress indicator snapshot; empty when inactive
    Progress {
        /// Stages in display order
        stages: Vec<ProgressStage>,
    },

    // ============================================
    // Project Data
    // ============================================
    /// Tables attached to the active project
    Tables {
        /// Table metadata
        tables: Vec<TableMetadata>,
    },

    /// Sample rows of one table
    Preview {
        /// Table name
        table_name: String,
        /// Sample rows
        rows: Vec<Row>,
    },

    // ============================================
    // Session Control
    // ============================================
    /// Conductor state changed
    State {
        /// New state
        state: ConductorState,
    },

    /// Transient notification
    Notify {
        /// Severity
        level: NotifyLevel,
        /// Body text
        message: String,
    },

    /// Layout instruction for the surface
    Layout {
        /// What to do
        directive: LayoutDirective,
    },

    /// The conversation was torn down; the surface should exit
    Quit {
        /// Optional parting message
        message: Option<String>,
    },
}

/// Message identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    /// Generate a new unique message ID
    pub fn new() -> Self {
        Self(format!("msg_{}", Uuid::new_v4().simple()))
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generate a new unique session ID
    pub fn new() -> Self {
        Self(format!("session_{}", Uuid::new_v4().simple()))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Who sent a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageRole {
    /// The person asking questions
    User,
    /// The analysis agent
    Assistant,
}

/// Layout directives for the surface
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum LayoutDirective {
    /// Focus the input field
    FocusInput,
    /// Bring a message into view
    ScrollToMessage {
        /// The message ID to scroll to
        message_id: MessageId,
    },
}

/// Notification levels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyLevel {
    /// Informational
    Info,
    /// Warning
    Warning,
    /// Error
    Error,
}

/// Conductor operational states
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConductorState {
    /// Ready for a question
    Idle,
    /// Exactly one question is in flight
    Submitting,
    /// The conversation was torn down; nothing more will happen
    TornDown,
}

impl ConductorState {
    /// Human-readable description
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Idle => "Ready",
            Self::Submitting => "Analyzing...",
            Self::TornDown => "Closed",
        }
    }
}

/// Why a submission was refused
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// The question was empty after trimming
    EmptyQuestion,
    /// Another question is still in flight
    AlreadySubmitting,
    /// The project has no tables to query
    NoData,
    /// The conversation was torn down
    TornDown,
}

impl RejectReason {
    /// Human-readable description
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::EmptyQuestion => "Question is empty",
            Self::AlreadySubmitting => "A question is already being answered",
            Self::NoData => "Upload data before asking questions",
            Self::TornDown => "Conversation is closed",
        }
    }
}

/// Result of a submit attempt
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The question was recorded and sent; carries the user message's ID
    Accepted(MessageId),
    /// Nothing happened
    Rejected(RejectReason),
}

impl SubmitOutcome {
    /// True if the submission was accepted
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}
