#![allow(dead_code)]

use std::cell::RefCell;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use freeze_core::models::{
    ActivityLogEntry, Bureau, BureauStatus, FreezeIssue, FreezeTransition,
    FreezeWorkflowProgress, NewActivity, NewFreezeIssue, WorkflowState,
};
use freeze_core::{Database, FreezeStore};
use uuid::Uuid;

/// A write that [`FlakyStore`] can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Write {
    Status(Bureau),
    Progress,
    Activity(Bureau),
    Issue,
}

/// Wraps a real database and fails selected writes on demand.
pub struct FlakyStore {
    pub db: Database,
    failing: RefCell<Vec<Write>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            db: Database::open_memory().expect("in-memory database"),
            failing: RefCell::new(Vec::new()),
        }
    }

    pub fn fail(&self, write: Write) {
        self.failing.borrow_mut().push(write);
    }

    pub fn heal(&self) {
        self.failing.borrow_mut().clear();
    }

    fn check(&self, write: Write) -> Result<()> {
        if self.failing.borrow().contains(&write) {
            bail!("injected failure on {write:?}");
        }
        Ok(())
    }
}

impl FreezeStore for FlakyStore {
    fn bureau_statuses(&self, user_id: Uuid) -> Result<Vec<BureauStatus>> {
        self.db.get_bureau_statuses(user_id)
    }

    /// A failing activity write aborts the whole freeze, as the real transaction does.
    fn freeze_bureau(&self, user_id: Uuid, bureau: Bureau, at: DateTime<Utc>) -> Result<FreezeTransition> {
        self.check(Write::Status(bureau))?;
        let was_frozen = self
            .db
            .get_bureau_status(user_id, bureau)?
            .is_some_and(|s| s.is_frozen());
        if !was_frozen {
            self.check(Write::Activity(bureau))?;
        }
        self.db.freeze_bureau(user_id, bureau, at)
    }

    fn workflow_progress(&self, user_id: Uuid) -> Result<Option<FreezeWorkflowProgress>> {
        self.db.get_workflow_progress(user_id)
    }

    fn upsert_workflow_progress(
        &self,
        user_id: Uuid,
        state: &WorkflowState,
    ) -> Result<FreezeWorkflowProgress> {
        self.check(Write::Progress)?;
        self.db.upsert_workflow_progress(user_id, state)
    }

    fn insert_activity(&self, user_id: Uuid, entry: &NewActivity) -> Result<ActivityLogEntry> {
        self.check(Write::Activity(entry.bureau))?;
        self.db.insert_activity(user_id, entry)
    }

    fn insert_freeze_issue(&self, input: &NewFreezeIssue) -> Result<FreezeIssue> {
        self.check(Write::Issue)?;
        self.db.insert_freeze_issue(input)
    }
}
