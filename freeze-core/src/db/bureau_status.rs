use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{
    format_timestamp, get_enum, get_opt_timestamp, get_timestamp, get_uuid, insert_entry, Database,
};
use crate::models::{
    ActivityAction, ActivitySource, Bureau, BureauStatus, BureauStatusUpsert, FreezeStatus,
    FreezeTransition, NewActivity,
};

const COLUMNS: &str =
    "id, user_id, bureau, status, status_updated_at, frozen_date, notes";

fn row_to_status(row: &Row<'_>) -> rusqlite::Result<BureauStatus> {
    Ok(BureauStatus {
        id: get_uuid(row, 0)?,
        user_id: get_uuid(row, 1)?,
        bureau: get_enum(row, 2, Bureau::from_str)?,
        status: get_enum(row, 3, FreezeStatus::from_str)?,
        status_updated_at: get_timestamp(row, 4)?,
        frozen_date: get_opt_timestamp(row, 5)?,
        notes: row.get(6)?,
    })
}

pub(crate) fn find_status(
    conn: &Connection,
    user_id: Uuid,
    bureau: Bureau,
) -> rusqlite::Result<Option<BureauStatus>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM bureau_status WHERE user_id = ?1 AND bureau = ?2"),
        params![user_id.to_string(), bureau.as_str()],
        row_to_status,
    )
    .optional()
}

/// Upsert on the (user_id, bureau) natural key. Notes survive the update.
pub(crate) fn upsert_status(
    conn: &Connection,
    user_id: Uuid,
    input: &BureauStatusUpsert,
) -> Result<BureauStatus> {
    conn.execute(
        "INSERT INTO bureau_status (id, user_id, bureau, status, status_updated_at, frozen_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(user_id, bureau) DO UPDATE SET
            status = excluded.status,
            status_updated_at = excluded.status_updated_at,
            frozen_date = excluded.frozen_date",
        params![
            Uuid::new_v4().to_string(),
            user_id.to_string(),
            input.bureau.as_str(),
            input.status.as_str(),
            format_timestamp(input.status_updated_at),
            input.frozen_date.map(format_timestamp),
        ],
    )?;

    find_status(conn, user_id, input.bureau)?
        .ok_or_else(|| anyhow::anyhow!("bureau status vanished after upsert"))
}

impl Database {
    pub fn get_bureau_statuses(&self, user_id: Uuid) -> Result<Vec<BureauStatus>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM bureau_status WHERE user_id = ?1"
            ))?;
            let mut statuses = stmt
                .query_map(params![user_id.to_string()], row_to_status)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            statuses.sort_by_key(|s| s.bureau);
            Ok(statuses)
        })
    }

    pub fn get_bureau_status(&self, user_id: Uuid, bureau: Bureau) -> Result<Option<BureauStatus>> {
        self.with_connection(|conn| Ok(find_status(conn, user_id, bureau)?))
    }

    pub fn upsert_bureau_status(
        &self,
        user_id: Uuid,
        input: &BureauStatusUpsert,
    ) -> Result<BureauStatus> {
        self.with_connection(|conn| upsert_status(conn, user_id, input))
    }

    /// Marks `bureau` frozen as of `at`. The `frozen` activity entry is written
    /// in the same transaction, and only when the prior status was not frozen.
    pub fn freeze_bureau(
        &self,
        user_id: Uuid,
        bureau: Bureau,
        at: DateTime<Utc>,
    ) -> Result<FreezeTransition> {
        self.with_transaction(|tx| {
            let was_frozen = find_status(tx, user_id, bureau)?.is_some_and(|s| s.is_frozen());
            let status = upsert_status(tx, user_id, &BureauStatusUpsert::frozen(bureau, at))?;
            if !was_frozen {
                insert_entry(
                    tx,
                    user_id,
                    &NewActivity::new(bureau, ActivityAction::Frozen, ActivitySource::FreezeWorkflow),
                )?;
            }
            Ok(FreezeTransition {
                status,
                newly_frozen: !was_frozen,
            })
        })
    }
}
