//! Follow-up recommendations
//!
//! Activating an entry sends a [`RequeryRequest`] to whoever holds the
//! receiving end (the Conductor). The panel itself never submits anything.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::query::{Recommendation, RecommendationCategory};

/// Panel heading
pub const RECOMMENDATIONS_TITLE: &str = "Recommended Next Steps";

/// Ask the Conductor to submit a new question
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequeryRequest {
    /// The question to submit
    pub question: String,
}

/// Accent color for a recommendation category
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CategoryColor {
    /// Insight
    Yellow,
    /// Drill-down
    Blue,
    /// Comparison
    Purple,
    /// Trend
    Green,
    /// Anomaly
    Red,
    /// Unknown category
    Neutral,
}

/// How a category is decorated
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CategoryStyle {
    /// Short label
    pub label: &'static str,
    /// Icon glyph
    pub icon: &'static str,
    /// Accent color
    pub color: CategoryColor,
}

impl CategoryStyle {
    /// Decoration for a category
    pub fn for_category(category: RecommendationCategory) -> Self {
        let (icon, color) = match category {
            RecommendationCategory::Insight => ("💡", CategoryColor::Yellow),
            RecommendationCategory::DrillDown => ("🔍", CategoryColor::Blue),
            RecommendationCategory::Comparison => ("⇄", CategoryColor::Purple),
            RecommendationCategory::Trend => ("📈", CategoryColor::Green),
            RecommendationCategory::Anomaly => ("⚠", CategoryColor::Red),
            RecommendationCategory::Other => ("✦", CategoryColor::Neutral),
        };
        Self {
            label: category.label(),
            icon,
            color,
        }
    }
}

/// One actionable entry
#[derive(Clone, Debug, PartialEq)]
pub struct RecommendationEntry {
    /// Question submitted on activation
    pub question: String,
    /// Why it is worth asking
    pub description: String,
    /// Decoration
    pub style: CategoryStyle,
}

/// The recommendations shown under a result
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecommendationPanel {
    /// Entries in service order
    pub entries: Vec<RecommendationEntry>,
}

impl RecommendationPanel {
    /// Build the panel
    pub fn build(recommendations: &[Recommendation]) -> Self {
        Self {
            entries: recommendations
                .iter()
                .map(|rec| RecommendationEntry {
                    question: rec.question.clone(),
                    description: rec.description.clone(),
                    style: CategoryStyle::for_category(rec.category),
                })
                .collect(),
        }
    }

    /// Whether the panel should be drawn at all
    pub fn is_visible(&self) -> bool {
        !self.entries.is_empty()
    }
}

/// Sends re-query requests on behalf of recommendation panels
#[derive(Clone, Debug)]
pub struct RequeryHandle {
    tx: mpsc::UnboundedSender<RequeryRequest>,
}

impl RequeryHandle {
    /// Wrap the Conductor's re-query sender
    pub fn new(tx: mpsc::UnboundedSender<RequeryRequest>) -> Self {
        Self { tx }
    }

    /// Activate entry `index` of `panel`.
    ///
    /// Returns false if there is no such entry or nobody is listening.
    pub fn activate(&self, panel: &RecommendationPanel, index: usize) -> bool {
        let Some(entry) = panel.entries.get(index) else {
            debug!(index, "No recommendation at index");
            return false;
        };
        let request = RequeryRequest {
            question: entry.question.clone(),
        };
        if self.tx.send(request).is_err() {
            warn!("Re-query receiver dropped, recommendation ignored");
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rec(question: &str, category: RecommendationCategory) -> Recommendation {
        Recommendation {
            question: question.to_string(),
            description: format!("about {question}"),
            category,
        }
    }

    #[test]
    fn test_empty_panel_is_hidden() {
        assert!(!RecommendationPanel::build(&[]).is_visible());
    }

    #[test]
    fn test_category_styles() {
        let style = CategoryStyle::for_category(RecommendationCategory::Anomaly);
        assert_eq!(style.color, CategoryColor::Red);
        assert_eq!(style.label, "Anomaly");
        assert_eq!(
            CategoryStyle::for_category(RecommendationCategory::DrillDown).color,
            CategoryColor::Blue
        );

        let other = CategoryStyle::for_category(RecommendationCategory::Other);
        assert_eq!(other.color, CategoryColor::Neutral);
        assert_eq!(other.icon, "✦");
    }

    #[test]
    fn test_activate_sends_question() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = RequeryHandle::new(tx);
        let panel = RecommendationPanel::build(&[
            rec("Show by month", RecommendationCategory::Trend),
            rec("Compare with last year", RecommendationCategory::Comparison),
        ]);

        assert!(handle.activate(&panel, 1));
        assert_eq!(
            rx.try_recv().unwrap(),
            RequeryRequest {
                question: "Compare with last year".to_string()
            }
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_activate_out_of_range() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = RequeryHandle::new(tx);
        let panel = RecommendationPanel::build(&[rec("a", RecommendationCategory::Insight)]);

        assert!(!handle.activate(&panel, 3));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_activate_without_receiver() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let handle = RequeryHandle::new(tx);
        let panel = RecommendationPanel::build(&[rec("a", RecommendationCategory::Insight)]);
        assert!(!handle.activate(&panel, 0));
    }
}
