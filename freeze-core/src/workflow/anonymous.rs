use chrono::Utc;

use super::{Checklist, WorkflowError};
use crate::db::Database;
use crate::local::{KeyValueStore, LocalSource, LocalWorkflowState, LocalWorkflowStore};
use crate::models::{Bureau, FreezeEvent, IssueType, NewFreezeIssue, WorkflowStep};
use crate::session::session_id;

/// Best-effort side channel for anonymous telemetry. Delivery is at most once
/// and carries no ordering guarantee relative to workflow transitions.
pub trait TelemetrySink {
    fn freeze(&self, event: FreezeEvent);
    fn issue(&self, issue: NewFreezeIssue);
}

pub struct NoopTelemetry;

impl TelemetrySink for NoopTelemetry {
    fn freeze(&self, _event: FreezeEvent) {}
    fn issue(&self, _issue: NewFreezeIssue) {}
}

impl TelemetrySink for Database {
    fn freeze(&self, event: FreezeEvent) {
        if let Err(e) = self.record_freeze_event(&event) {
            tracing::warn!(error = %e, bureau = %event.bureau, "Dropped freeze event");
        }
    }

    fn issue(&self, issue: NewFreezeIssue) {
        if let Err(e) = self.insert_freeze_issue(&issue) {
            tracing::warn!(error = %e, bureau = %issue.bureau, "Dropped freeze issue");
        }
    }
}

/// Workflow driven entirely from device-local storage. Every transition is
/// written back before the call returns.
pub struct AnonymousFlow<'a, K: KeyValueStore> {
    local: &'a LocalWorkflowStore<K>,
    telemetry: &'a dyn TelemetrySink,
    state: LocalWorkflowState,
}

impl<'a, K: KeyValueStore> AnonymousFlow<'a, K> {
    /// Resumes the direct flow, discarding saved state from any other source.
    pub fn start_direct(local: &'a LocalWorkflowStore<K>, telemetry: &'a dyn TelemetrySink) -> Self {
        let state = local
            .load_direct()
            .filter(|s| s.source == LocalSource::Direct)
            .unwrap_or_else(LocalWorkflowState::direct);
        Self::resume(local, telemetry, state)
    }

    /// Resumes the breach flow for `code`; progress saved for a different code is not reused.
    pub fn start_breach(
        local: &'a LocalWorkflowStore<K>,
        telemetry: &'a dyn TelemetrySink,
        code: &str,
    ) -> Self {
        let code = code.trim().to_uppercase();
        let state = local
            .load_breach()
            .filter(|s| s.source.breach_code() == Some(code.as_str()))
            .unwrap_or_else(|| LocalWorkflowState::breach(code));
        Self::resume(local, telemetry, state)
    }

    fn resume(
        local: &'a LocalWorkflowStore<K>,
        telemetry: &'a dyn TelemetrySink,
        mut state: LocalWorkflowState,
    ) -> Self {
        let progress = &state.progress;
        let step = progress.resume_step(|b| progress.bureau_completed(b));
        state.progress.current_step = step;
        let flow = Self {
            local,
            telemetry,
            state,
        };
        flow.persist();
        flow
    }

    pub fn state(&self) -> &LocalWorkflowState {
        &self.state
    }

    pub fn current_step(&self) -> WorkflowStep {
        self.state.progress.current_step
    }

    pub fn complete_checklist(&mut self, checklist: &Checklist) -> Result<WorkflowStep, WorkflowError> {
        let step = self.state.progress.complete_checklist(checklist)?;
        self.persist();
        Ok(step)
    }

    pub fn confirm(&mut self, bureau: Bureau) -> Result<WorkflowStep, WorkflowError> {
        let step = self.state.progress.confirm(bureau, Utc::now())?;
        self.persist();
        tracing::debug!(%bureau, next = %step, "Anonymous freeze confirmed");

        self.telemetry.freeze(FreezeEvent {
            breach_code: self.state.source.breach_code().map(str::to_string),
            bureau,
            session_id: session_id(self.local.kv()),
        });
        Ok(step)
    }

    pub fn skip(
        &mut self,
        bureau: Bureau,
        issue_type: IssueType,
        details: Option<String>,
    ) -> Result<WorkflowStep, WorkflowError> {
        let step = self.state.progress.skip(bureau, Utc::now())?;
        self.persist();
        tracing::debug!(%bureau, next = %step, "Anonymous bureau skipped");

        self.telemetry.issue(
            NewFreezeIssue {
                user_id: None,
                session_id: Some(session_id(self.local.kv())),
                bureau,
                issue_type,
                issue_details: details,
                source: Some(
                    self.state
                        .source
                        .breach_code()
                        .unwrap_or("direct")
                        .to_string(),
                ),
            }
            .sanitized(),
        );
        Ok(step)
    }

    pub fn navigate(&mut self, step: WorkflowStep) {
        self.state.progress.navigate(step);
        self.persist();
    }

    fn persist(&self) {
        self.local.save(&self.state);
    }
}
