//! Surface Events
//!
//! Events sent from UI surfaces to the Conductor. Surfaces report what the
//! user did; the Conductor decides whether anything happens.

use serde::{Deserialize, Serialize};

/// Events from UI Surface to Conductor
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum SurfaceEvent {
    // ============================================
    // Connection Events
    // ============================================
    /// Surface connected to Conductor
    Connected {
        /// Surface type identifier
        surface_type: SurfaceType,
    },

    /// Surface is going away; tear the conversation down
    Teardown,

    // ============================================
    // Input Events
    // ============================================
    /// The input line changed
    InputChanged {
        /// Full input text
        text: String,
    },

    /// User pressed submit on the current input line
    Submit,

    /// Submit a specific question, as if typed and submitted
    SubmitQuestion {
        /// The question
        question: String,
    },

    /// User picked one of the starter example questions (fills the input only)
    ExampleSelected {
        /// The example question
        question: String,
    },

    /// User activated a follow-up recommendation
    RecommendationActivated {
        /// The recommendation's question
        question: String,
    },

    // ============================================
    // Project Data
    // ============================================
    /// The embedding surface knows the data availability
    DataAvailabilityChanged {
        /// True when the project has tables
        has_data: bool,
    },

    /// Ask the service which tables the project holds
    TablesRequested,

    /// Ask the service for sample rows of a table
    PreviewRequested {
        /// Table name
        table_name: String,
    },
}

/// Type of UI surface
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceType {
    /// Terminal UI (ratatui/crossterm)
    Tui,
    /// Headless (for testing/automation)
    Headless,
}

impl SurfaceType {
    /// Human-readable name
    pub fn name(&self) -> &str {
        match self {
            Self::Tui => "Terminal",
            Self::Headless => "Headless",
        }
    }
}
