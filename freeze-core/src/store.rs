//! The persistence collaborator seen by the workflow and the migrator.
//!
//! [`Database`] is the production implementation; tests wrap it to inject
//! failures at specific writes.

use anyhow::Result;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::Database;
use crate::models::{
    ActivityLogEntry, Bureau, BureauStatus, FreezeIssue, FreezeTransition,
    FreezeWorkflowProgress, NewActivity, NewFreezeIssue, WorkflowState,
};

pub trait FreezeStore {
    fn bureau_statuses(&self, user_id: Uuid) -> Result<Vec<BureauStatus>>;

    /// Marks `bureau` frozen and, only on a real transition, appends the
    /// `frozen` activity entry. Both writes land or neither does.
    fn freeze_bureau(&self, user_id: Uuid, bureau: Bureau, at: DateTime<Utc>) -> Result<FreezeTransition>;

    fn workflow_progress(&self, user_id: Uuid) -> Result<Option<FreezeWorkflowProgress>>;

    /// Upsert keyed on user_id.
    fn upsert_workflow_progress(
        &self,
        user_id: Uuid,
        state: &WorkflowState,
    ) -> Result<FreezeWorkflowProgress>;

    /// Pure insert, no natural key.
    fn insert_activity(&self, user_id: Uuid, entry: &NewActivity) -> Result<ActivityLogEntry>;

    fn insert_freeze_issue(&self, input: &NewFreezeIssue) -> Result<FreezeIssue>;
}

impl FreezeStore for Database {
    fn bureau_statuses(&self, user_id: Uuid) -> Result<Vec<BureauStatus>> {
        self.get_bureau_statuses(user_id)
    }

    fn freeze_bureau(&self, user_id: Uuid, bureau: Bureau, at: DateTime<Utc>) -> Result<FreezeTransition> {
        Database::freeze_bureau(self, user_id, bureau, at)
    }

    fn workflow_progress(&self, user_id: Uuid) -> Result<Option<FreezeWorkflowProgress>> {
        self.get_workflow_progress(user_id)
    }

    fn upsert_workflow_progress(
        &self,
        user_id: Uuid,
        state: &WorkflowState,
    ) -> Result<FreezeWorkflowProgress> {
        Database::upsert_workflow_progress(self, user_id, state)
    }

    fn insert_activity(&self, user_id: Uuid, entry: &NewActivity) -> Result<ActivityLogEntry> {
        Database::insert_activity(self, user_id, entry)
    }

    fn insert_freeze_issue(&self, input: &NewFreezeIssue) -> Result<FreezeIssue> {
        Database::insert_freeze_issue(self, input)
    }
}
