//! Progress Indicator
//!
//! A fixed sequence of labelled stages shown while a question is in flight.
//! The stages are simulated: they advance on a timer, not on anything the
//! service reports.
//!
//! # Lifecycle
//!
//! ```text
//! set_active(true)   stage 0 active, the rest pending, deadline armed
//! update()           one stage completes per elapsed interval, stops at the last
//! set_active(false)  stages cleared, deadline disarmed
//! ```
//!
//! The indicator never sleeps or spawns; the owner calls [`ProgressIndicator::update`]
//! from its cooperative loop and the injected [`Clock`] decides whether a
//! deadline has passed.

mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Stage labels, in order
pub const STAGE_LABELS: [&str; 4] = [
    "Analyzing schema",
    "Detecting relationships",
    "Composing query",
    "Executing query",
];

/// Header shown above the stages
pub const PROGRESS_HEADER: &str = "Agent is thinking...";

/// Default time between stage advances
pub const DEFAULT_STAGE_INTERVAL: Duration = Duration::from_millis(800);

/// Status of one stage
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageStatus {
    /// Not reached yet
    Pending,
    /// In progress
    Active,
    /// Done
    Complete,
}

/// One labelled stage
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressStage {
    /// Position in the sequence
    pub id: usize,
    /// Stage label
    pub label: String,
    /// Current status
    pub status: StageStatus,
}

impl ProgressStage {
    /// Label with the status suffix surfaces display
    pub fn display_label(&self) -> String {
        match self.status {
            StageStatus::Pending => self.label.clone(),
            StageStatus::Active => format!("{}...", self.label),
            StageStatus::Complete => format!("{} ✓", self.label),
        }
    }
}

/// Timer-driven stage sequence
pub struct ProgressIndicator<C: Clock> {
    clock: C,
    interval: Duration,
    labels: Vec<String>,
    stages: Vec<ProgressStage>,
    /// Index of the active stage while engaged
    current: usize,
    /// When the next stage advance is due; `None` when inactive or at the last stage
    next_advance: Option<Instant>,
    engaged: bool,
    /// Bumped on every activation and deactivation
    generation: u64,
}

impl<C: Clock> ProgressIndicator<C> {
    /// Indicator with the standard four stages
    pub fn new(clock: C, interval: Duration) -> Self {
        Self::with_labels(clock, interval, STAGE_LABELS.iter().map(|s| (*s).to_string()))
    }

    /// Indicator with custom stage labels
    pub fn with_labels(
        clock: C,
        interval: Duration,
        labels: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            clock,
            interval,
            labels: labels.into_iter().collect(),
            stages: Vec::new(),
            current: 0,
            next_advance: None,
            engaged: false,
            generation: 0,
        }
    }

    /// Feed the "request outstanding" signal.
    ///
    /// Returns true if the stage snapshot changed.
    pub fn set_active(&mut self, active: bool) -> bool {
        if active == self.engaged {
            return false;
        }
        self.engaged = active;
        self.generation += 1;

        if active {
            self.stages = self
                .labels
                .iter()
                .enumerate()
                .map(|(id, label)| ProgressStage {
                    id,
                    label: label.clone(),
                    status: if id == 0 {
                        StageStatus::Active
                    } else {
                        StageStatus::Pending
                    },
                })
                .collect();
            self.current = 0;
            self.next_advance =
                (self.stages.len() > 1).then(|| self.clock.now() + self.interval);
        } else {
            self.stages.clear();
            self.current = 0;
            self.next_advance = None;
        }
        true
    }

    /// Advance past every deadline that has elapsed.
    ///
    /// Returns true if any stage changed. Inert while inactive.
    pub fn update(&mut self) -> bool {
        let now = self.clock.now();
        let mut changed = false;

        while let Some(deadline) = self.next_advance {
            if now < deadline {
                break;
            }
            let next = self.current + 1;
            self.stages[self.current].status = StageStatus::Complete;
            self.stages[next].status = StageStatus::Active;
            self.current = next;
            changed = true;

            self.next_advance = (next + 1 < self.stages.len()).then(|| deadline + self.interval);
        }

        changed
    }

    /// Whether a request is outstanding
    pub fn is_active(&self) -> bool {
        self.engaged
    }

    /// Current stages; empty when inactive
    pub fn stages(&self) -> &[ProgressStage] {
        &self.stages
    }

    /// Index of the active stage, if any
    pub fn active_stage(&self) -> Option<usize> {
        (self.engaged && !self.stages.is_empty()).then_some(self.current)
    }

    /// Activation counter
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Stage interval
    pub fn interval(&self) -> Duration {
        self.interval
    }
}
