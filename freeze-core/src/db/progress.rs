use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use super::{format_timestamp, get_enum, get_opt_timestamp, get_timestamp, get_uuid, Database};
use crate::models::{FreezeWorkflowProgress, WorkflowState, WorkflowStep};

fn row_to_progress(row: &Row<'_>) -> rusqlite::Result<FreezeWorkflowProgress> {
    Ok(FreezeWorkflowProgress {
        id: get_uuid(row, 0)?,
        user_id: get_uuid(row, 1)?,
        current_step: get_enum(row, 2, WorkflowStep::from_str)?,
        checklist_completed: row.get(3)?,
        equifax_completed: row.get(4)?,
        transunion_completed: row.get(5)?,
        experian_completed: row.get(6)?,
        completed_at: get_opt_timestamp(row, 7)?,
        updated_at: get_timestamp(row, 8)?,
    })
}

impl Database {
    pub fn get_workflow_progress(&self, user_id: Uuid) -> Result<Option<FreezeWorkflowProgress>> {
        self.with_connection(|conn| {
            let progress = conn
                .query_row(
                    "SELECT id, user_id, current_step, checklist_completed, equifax_completed,
                            transunion_completed, experian_completed, completed_at, updated_at
                     FROM freeze_workflow_progress WHERE user_id = ?1",
                    params![user_id.to_string()],
                    row_to_progress,
                )
                .optional()?;
            Ok(progress)
        })
    }

    /// Upsert on the user_id natural key; every column is overwritten from `state`.
    pub fn upsert_workflow_progress(
        &self,
        user_id: Uuid,
        state: &WorkflowState,
    ) -> Result<FreezeWorkflowProgress> {
        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO freeze_workflow_progress
                    (id, user_id, current_step, checklist_completed, equifax_completed,
                     transunion_completed, experian_completed, completed_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(user_id) DO UPDATE SET
                    current_step = excluded.current_step,
                    checklist_completed = excluded.checklist_completed,
                    equifax_completed = excluded.equifax_completed,
                    transunion_completed = excluded.transunion_completed,
                    experian_completed = excluded.experian_completed,
                    completed_at = excluded.completed_at,
                    updated_at = excluded.updated_at",
                params![
                    Uuid::new_v4().to_string(),
                    user_id.to_string(),
                    state.current_step.as_str(),
                    state.checklist_completed,
                    state.equifax_completed,
                    state.transunion_completed,
                    state.experian_completed,
                    state.completed_at.map(format_timestamp),
                    format_timestamp(Utc::now()),
                ],
            )?;
            Ok(())
        })?;

        self.get_workflow_progress(user_id)?
            .ok_or_else(|| anyhow::anyhow!("workflow progress vanished after upsert"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_progress_is_none() {
        let db = Database::open_memory().unwrap();
        assert!(db.get_workflow_progress(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn upsert_overwrites_existing_row() {
        let db = Database::open_memory().unwrap();
        let user = Uuid::new_v4();

        let mut state = WorkflowState {
            current_step: WorkflowStep::Equifax,
            checklist_completed: true,
            ..Default::default()
        };
        let first = db.upsert_workflow_progress(user, &state).unwrap();

        state.current_step = WorkflowStep::Transunion;
        state.equifax_completed = true;
        let second = db.upsert_workflow_progress(user, &state).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.state(), state);
    }
}
