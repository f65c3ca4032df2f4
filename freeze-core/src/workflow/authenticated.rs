use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Checklist, StepView, WorkflowError};
use crate::models::{
    ActivityAction, ActivitySource, Bureau, BureauStatus, IssueType, NewActivity, NewFreezeIssue,
    WorkflowState, WorkflowStep,
};
use crate::store::FreezeStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueReport {
    pub issue_type: IssueType,
    #[serde(default)]
    pub issue_details: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfirmOutcome {
    pub next_step: WorkflowStep,
    pub status: BureauStatus,
    /// False when the bureau was already frozen and no activity entry was written.
    pub newly_frozen: bool,
}

/// Workflow for a signed-in user. Every transition is written durably before
/// the in-memory step moves; on failure the flow stays where it was.
pub struct AuthenticatedFlow<'a, S: FreezeStore + ?Sized> {
    store: &'a S,
    user_id: Uuid,
    state: WorkflowState,
    statuses: Vec<BureauStatus>,
}

impl<'a, S: FreezeStore + ?Sized> AuthenticatedFlow<'a, S> {
    /// Loads durable progress and positions the flow at its entry step.
    pub fn load(store: &'a S, user_id: Uuid, requested: Option<Bureau>) -> Result<Self, WorkflowError> {
        let progress = store
            .workflow_progress(user_id)
            .map_err(WorkflowError::Persistence)?;
        let statuses = store
            .bureau_statuses(user_id)
            .map_err(WorkflowError::Persistence)?;

        let mut flow = Self {
            store,
            user_id,
            state: progress.map(|p| p.state()).unwrap_or_default(),
            statuses,
        };
        let entry = flow.state.entry_step(requested, |b| flow.is_frozen(b));
        flow.state.navigate(entry);
        Ok(flow)
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn statuses(&self) -> &[BureauStatus] {
        &self.statuses
    }

    pub fn current_step(&self) -> WorkflowStep {
        self.state.current_step
    }

    pub fn is_frozen(&self, bureau: Bureau) -> bool {
        self.statuses
            .iter()
            .any(|s| s.bureau == bureau && s.is_frozen())
    }

    pub fn step_views(&self) -> Vec<StepView> {
        self.state.step_views(|b| self.is_frozen(b))
    }

    pub fn complete_checklist(&mut self, checklist: &Checklist) -> Result<WorkflowStep, WorkflowError> {
        let mut next = self.state.clone();
        let step = next.complete_checklist(checklist)?;
        self.save_progress(&next)?;
        self.state = next;
        Ok(step)
    }

    /// Records the freeze at `bureau`. The `frozen` activity entry is only
    /// written when the durable status was not already frozen.
    pub fn confirm(&mut self, bureau: Bureau) -> Result<ConfirmOutcome, WorkflowError> {
        let now = Utc::now();
        let mut next = self.state.clone();
        let next_step = next.confirm(bureau, now)?;

        let transition = self
            .store
            .freeze_bureau(self.user_id, bureau, now)
            .map_err(WorkflowError::Persistence)?;
        self.replace_status(transition.status.clone());

        self.save_progress(&next)?;
        self.state = next;
        tracing::info!(user_id = %self.user_id, %bureau, newly_frozen = transition.newly_frozen, "Freeze confirmed");

        Ok(ConfirmOutcome {
            next_step,
            status: transition.status,
            newly_frozen: transition.newly_frozen,
        })
    }

    /// Advances past `bureau` after a reported issue; its status is left untouched.
    pub fn skip(&mut self, bureau: Bureau, report: IssueReport) -> Result<WorkflowStep, WorkflowError> {
        let mut next = self.state.clone();
        let step = next.skip(bureau, Utc::now())?;

        self.store
            .insert_freeze_issue(
                &NewFreezeIssue {
                    user_id: Some(self.user_id),
                    session_id: None,
                    bureau,
                    issue_type: report.issue_type,
                    issue_details: report.issue_details,
                    source: Some(ActivitySource::FreezeWorkflow.as_str().to_string()),
                }
                .sanitized(),
            )
            .map_err(WorkflowError::Persistence)?;
        self.store
            .insert_activity(
                self.user_id,
                &NewActivity::new(bureau, ActivityAction::IssueReported, ActivitySource::FreezeWorkflow),
            )
            .map_err(WorkflowError::Persistence)?;

        self.save_progress(&next)?;
        self.state = next;
        tracing::info!(user_id = %self.user_id, %bureau, "Bureau skipped after issue");
        Ok(step)
    }

    /// Moves the pointer only; nothing is written.
    pub fn navigate(&mut self, step: WorkflowStep) {
        self.state.navigate(step);
    }

    fn save_progress(&self, state: &WorkflowState) -> Result<(), WorkflowError> {
        self.store
            .upsert_workflow_progress(self.user_id, state)
            .map(|_| ())
            .map_err(|e| {
                tracing::error!(user_id = %self.user_id, error = %e, "Failed to save workflow progress");
                WorkflowError::Persistence(e)
            })
    }

    fn replace_status(&mut self, status: BureauStatus) {
        self.statuses.retain(|s| s.bureau != status.bureau);
        self.statuses.push(status);
        self.statuses.sort_by_key(|s| s.bureau);
    }
}
