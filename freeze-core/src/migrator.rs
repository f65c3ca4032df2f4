//! Moves anonymous, device-local workflow progress into durable per-user records
//! once the user authenticates.
//!
//! Runs at most once per migrator instance. Failures are logged and swallowed:
//! the device keeps its local state and the next bootstrap tries again. A bureau
//! that is already frozen durably is never re-frozen, so re-running after a
//! partial failure converges without duplicate `frozen` activity.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::local::{KeyValueStore, LocalSource, LocalWorkflowState, LocalWorkflowStore};
use crate::models::{Bureau, FreezeStatus};
use crate::store::FreezeStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MigrationOutcome {
    /// This migrator has already run; nothing was attempted.
    AlreadyRan,
    NothingToMigrate,
    /// Only a direct-key state from another source was found; it is left in place.
    Ineligible,
    /// Durable records written and local state cleared. `frozen` lists the
    /// bureaus that transitioned to frozen during this run.
    Migrated { frozen: Vec<Bureau> },
    /// A write failed; local state was kept for the next attempt.
    Failed { reason: String },
}

impl MigrationOutcome {
    /// Whether the device no longer holds migratable state.
    pub fn local_cleared(&self) -> bool {
        matches!(self, Self::Migrated { .. })
    }
}

pub struct WorkflowMigrator<'a, K: KeyValueStore, S: FreezeStore + ?Sized> {
    local: &'a LocalWorkflowStore<K>,
    store: &'a S,
    has_run: AtomicBool,
}

impl<'a, K: KeyValueStore, S: FreezeStore + ?Sized> WorkflowMigrator<'a, K, S> {
    pub fn new(local: &'a LocalWorkflowStore<K>, store: &'a S) -> Self {
        Self {
            local,
            store,
            has_run: AtomicBool::new(false),
        }
    }

    /// Reconciles local progress for `user_id`. Never returns an error.
    pub fn run(&self, user_id: Uuid) -> MigrationOutcome {
        if self.has_run.swap(true, Ordering::SeqCst) {
            return MigrationOutcome::AlreadyRan;
        }

        let Some(state) = self.pending() else {
            return match self.local.load_direct() {
                Some(_) => {
                    tracing::debug!(%user_id, "Local freeze state is not from the direct flow, skipping");
                    MigrationOutcome::Ineligible
                }
                None => MigrationOutcome::NothingToMigrate,
            };
        };

        match self.apply(user_id, &state) {
            Ok(frozen) => {
                if let Err(e) = self.local.clear_all() {
                    tracing::warn!(%user_id, error = %e, "Migrated but could not clear local state");
                }
                tracing::info!(%user_id, ?frozen, "Anonymous workflow migrated");
                MigrationOutcome::Migrated { frozen }
            }
            Err(e) => {
                tracing::warn!(%user_id, error = %format!("{e:#}"), "Workflow migration failed, will retry");
                MigrationOutcome::Failed {
                    reason: format!("{e:#}"),
                }
            }
        }
    }

    /// Breach-sourced state wins; a direct-key state is only eligible when its source is direct.
    fn pending(&self) -> Option<LocalWorkflowState> {
        self.local.load_breach().or_else(|| {
            self.local
                .load_direct()
                .filter(|s| s.source == LocalSource::Direct)
        })
    }

    fn apply(&self, user_id: Uuid, state: &LocalWorkflowState) -> Result<Vec<Bureau>> {
        let current: HashMap<Bureau, FreezeStatus> = self
            .store
            .bureau_statuses(user_id)
            .context("reading bureau statuses")?
            .into_iter()
            .map(|s| (s.bureau, s.status))
            .collect();

        self.store
            .upsert_workflow_progress(user_id, &state.progress)
            .context("saving workflow progress")?;

        let now = Utc::now();
        let mut frozen = Vec::new();
        for bureau in Bureau::ALL {
            if !state.progress.bureau_completed(bureau) {
                continue;
            }
            if current.get(&bureau) == Some(&FreezeStatus::Frozen) {
                continue;
            }

            let transition = self
                .store
                .freeze_bureau(user_id, bureau, now)
                .with_context(|| format!("freezing {bureau}"))?;
            if transition.newly_frozen {
                frozen.push(bureau);
            }
        }
        Ok(frozen)
    }
}
