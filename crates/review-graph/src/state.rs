//! Review state threaded through every pipeline node
//!
//! A flat record: the diff under review plus one optional text slot per
//! feedback field. `None` means "not yet run"; `Some("")` means the node ran
//! and produced nothing. The executor collects one [`ReviewUpdate`] per node
//! and applies it here; each field may be written once per run.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ReviewError;

/// Feedback fields of the review state, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewField {
    Summary,
    Critique,
    Suggestions,
    SecurityFeedback,
    ArchitectureFeedback,
    TestCoverageFeedback,
    UiFeedback,
    DependencyFeedback,
    PerformanceFeedback,
    ReadabilityFeedback,
}

impl ReviewField {
    pub const ALL: [ReviewField; 10] = [
        ReviewField::Summary,
        ReviewField::Critique,
        ReviewField::Suggestions,
        ReviewField::SecurityFeedback,
        ReviewField::ArchitectureFeedback,
        ReviewField::TestCoverageFeedback,
        ReviewField::UiFeedback,
        ReviewField::DependencyFeedback,
        ReviewField::PerformanceFeedback,
        ReviewField::ReadabilityFeedback,
    ];

    /// Field name as used in JSON output and logs.
    pub fn name(&self) -> &'static str {
        match self {
            ReviewField::Summary => "summary",
            ReviewField::Critique => "critique",
            ReviewField::Suggestions => "suggestions",
            ReviewField::SecurityFeedback => "security_feedback",
            ReviewField::ArchitectureFeedback => "architecture_feedback",
            ReviewField::TestCoverageFeedback => "test_coverage_feedback",
            ReviewField::UiFeedback => "ui_feedback",
            ReviewField::DependencyFeedback => "dependency_feedback",
            ReviewField::PerformanceFeedback => "performance_feedback",
            ReviewField::ReadabilityFeedback => "readability_feedback",
        }
    }

    /// Fixed report label.
    pub fn label(&self) -> &'static str {
        match self {
            ReviewField::Summary => "🧠 Commit Summary:",
            ReviewField::Critique => "🧪 Critique:",
            ReviewField::Suggestions => "💡 Suggestions:",
            ReviewField::SecurityFeedback => "🔐 Security:",
            ReviewField::ArchitectureFeedback => "🏛️ Architecture:",
            ReviewField::TestCoverageFeedback => "✅ Test Coverage:",
            ReviewField::UiFeedback => "🎨 UI:",
            ReviewField::DependencyFeedback => "📦 Dependencies:",
            ReviewField::PerformanceFeedback => "⚡ Performance:",
            ReviewField::ReadabilityFeedback => "📖 Readability:",
        }
    }
}

impl fmt::Display for ReviewField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single field write produced by one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewUpdate {
    pub field: ReviewField,
    pub value: String,
}

impl ReviewUpdate {
    pub fn new(field: ReviewField, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

/// Shared record for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewState {
    diff: String,
    summary: Option<String>,
    critique: Option<String>,
    suggestions: Option<String>,
    security_feedback: Option<String>,
    architecture_feedback: Option<String>,
    test_coverage_feedback: Option<String>,
    ui_feedback: Option<String>,
    dependency_feedback: Option<String>,
    performance_feedback: Option<String>,
    readability_feedback: Option<String>,
}

impl ReviewState {
    /// Create a fresh state for a diff.
    ///
    /// Returns `None` when the diff is empty or whitespace-only; there is
    /// nothing to review and no node may run. The diff is stored verbatim.
    pub fn for_diff(diff: impl Into<String>) -> Option<Self> {
        let diff = diff.into();
        if diff.trim().is_empty() {
            return None;
        }
        Some(Self {
            diff,
            summary: None,
            critique: None,
            suggestions: None,
            security_feedback: None,
            architecture_feedback: None,
            test_coverage_feedback: None,
            ui_feedback: None,
            dependency_feedback: None,
            performance_feedback: None,
            readability_feedback: None,
        })
    }

    /// The diff under review.
    pub fn diff(&self) -> &str {
        &self.diff
    }

    /// Current value of a field, `None` when it has not been written.
    pub fn get(&self, field: ReviewField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    /// Field value for rendering: unset fields read as empty text.
    pub fn text(&self, field: ReviewField) -> &str {
        self.get(field).unwrap_or("")
    }

    pub fn is_set(&self, field: ReviewField) -> bool {
        self.slot(field).is_some()
    }

    /// Apply one node's write. Fields are write-once per run.
    pub(crate) fn apply_update(&mut self, update: ReviewUpdate) -> Result<(), ReviewError> {
        let slot = self.slot_mut(update.field);
        if slot.is_some() {
            return Err(ReviewError::StateConflict {
                field: update.field,
            });
        }
        *slot = Some(update.value);
        Ok(())
    }

    /// Apply a wave of updates in field order, so the result does not depend
    /// on the order in which concurrent nodes finished.
    pub(crate) fn apply_updates(&mut self, mut updates: Vec<ReviewUpdate>) -> Result<(), ReviewError> {
        updates.sort_by_key(|u| u.field);
        for update in updates {
            self.apply_update(update)?;
        }
        Ok(())
    }

    fn slot(&self, field: ReviewField) -> &Option<String> {
        match field {
            ReviewField::Summary => &self.summary,
            ReviewField::Critique => &self.critique,
            ReviewField::Suggestions => &self.suggestions,
            ReviewField::SecurityFeedback => &self.security_feedback,
            ReviewField::ArchitectureFeedback => &self.architecture_feedback,
            ReviewField::TestCoverageFeedback => &self.test_coverage_feedback,
            ReviewField::UiFeedback => &self.ui_feedback,
            ReviewField::DependencyFeedback => &self.dependency_feedback,
            ReviewField::PerformanceFeedback => &self.performance_feedback,
            ReviewField::ReadabilityFeedback => &self.readability_feedback,
        }
    }

    fn slot_mut(&mut self, field: ReviewField) -> &mut Option<String> {
        match field {
            ReviewField::Summary => &mut self.summary,
            ReviewField::Critique => &mut self.critique,
            ReviewField::Suggestions => &mut self.suggestions,
            ReviewField::SecurityFeedback => &mut self.security_feedback,
            ReviewField::ArchitectureFeedback => &mut self.architecture_feedback,
            ReviewField::TestCoverageFeedback => &mut self.test_coverage_feedback,
            ReviewField::UiFeedback => &mut self.ui_feedback,
            ReviewField::DependencyFeedback => &mut self.dependency_feedback,
            ReviewField::PerformanceFeedback => &mut self.performance_feedback,
            ReviewField::ReadabilityFeedback => &mut self.readability_feedback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_diff_has_no_state() {
        assert!(ReviewState::for_diff("").is_none());
        assert!(ReviewState::for_diff("  \n\t \n").is_none());
    }

    #[test]
    fn test_fresh_state_fields_unset() {
        let state = ReviewState::for_diff("+fn main() {}\n").unwrap();
        assert_eq!(state.diff(), "+fn main() {}\n");
        for field in ReviewField::ALL {
            assert!(!state.is_set(field), "{field} should start unset");
            assert_eq!(state.get(field), None);
            assert_eq!(state.text(field), "");
        }
    }

    #[test]
    fn test_unset_distinguishable_from_empty() {
        let mut state = ReviewState::for_diff("diff").unwrap();
        state
            .apply_update(ReviewUpdate::new(ReviewField::Critique, ""))
            .unwrap();

        assert_eq!(state.get(ReviewField::Critique), Some(""));
        assert_eq!(state.get(ReviewField::Summary), None);
        assert_eq!(state.text(ReviewField::Critique), state.text(ReviewField::Summary));
    }

    #[test]
    fn test_fields_are_write_once() {
        let mut state = ReviewState::for_diff("diff").unwrap();
        state
            .apply_update(ReviewUpdate::new(ReviewField::Summary, "first"))
            .unwrap();

        let err = state
            .apply_update(ReviewUpdate::new(ReviewField::Summary, "second"))
            .unwrap_err();
        assert!(matches!(
            err,
            ReviewError::StateConflict {
                field: ReviewField::Summary
            }
        ));
        assert_eq!(state.get(ReviewField::Summary), Some("first"));
    }

    #[test]
    fn test_apply_updates_is_order_independent() {
        let updates = vec![
            ReviewUpdate::new(ReviewField::ArchitectureFeedback, "arch"),
            ReviewUpdate::new(ReviewField::SecurityFeedback, "sec"),
        ];
        let mut reversed = updates.clone();
        reversed.reverse();

        let mut a = ReviewState::for_diff("diff").unwrap();
        let mut b = a.clone();
        a.apply_updates(updates).unwrap();
        b.apply_updates(reversed).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.get(ReviewField::SecurityFeedback), Some("sec"));
        assert_eq!(a.get(ReviewField::ArchitectureFeedback), Some("arch"));
    }

    #[test]
    fn test_field_names_and_labels() {
        assert_eq!(ReviewField::TestCoverageFeedback.name(), "test_coverage_feedback");
        assert_eq!(ReviewField::Summary.label(), "🧠 Commit Summary:");
        assert_eq!(ReviewField::Suggestions.to_string(), "suggestions");
    }
}
