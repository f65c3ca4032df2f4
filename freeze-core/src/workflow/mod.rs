//! Guided freeze workflow, in its anonymous (device-local) and authenticated (durable) forms.

mod anonymous;
mod authenticated;
mod checklist;
mod machine;

pub use anonymous::{AnonymousFlow, NoopTelemetry, TelemetrySink};
pub use authenticated::{AuthenticatedFlow, ConfirmOutcome, IssueReport};
pub use checklist::{Checklist, CHECKLIST_ITEMS};
pub use machine::StepView;

use crate::models::WorkflowStep;

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("cannot {action} while on the {step} step")]
    InvalidTransition {
        step: WorkflowStep,
        action: &'static str,
    },

    #[error("checklist incomplete: {remaining} item(s) not ready")]
    ChecklistIncomplete { remaining: usize },

    #[error("failed to save progress, please try again")]
    Persistence(#[source] anyhow::Error),
}

impl WorkflowError {
    /// Persistence failures leave the workflow where it was, so retrying is safe.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}
