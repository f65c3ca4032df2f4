use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use super::{format_timestamp, get_enum, get_timestamp, get_uuid, Database};
use crate::models::{ActivityAction, ActivityLogEntry, ActivitySource, Bureau, NewActivity};

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<ActivityLogEntry> {
    Ok(ActivityLogEntry {
        id: get_uuid(row, 0)?,
        user_id: get_uuid(row, 1)?,
        bureau: get_enum(row, 2, Bureau::from_str)?,
        action: get_enum(row, 3, ActivityAction::from_str)?,
        source: get_enum(row, 4, ActivitySource::from_str)?,
        created_at: get_timestamp(row, 5)?,
    })
}

// Append-only: activity entries are never updated or deleted.
pub(crate) fn insert_entry(
    conn: &Connection,
    user_id: Uuid,
    entry: &NewActivity,
) -> rusqlite::Result<ActivityLogEntry> {
    let created = ActivityLogEntry {
        id: Uuid::new_v4(),
        user_id,
        bureau: entry.bureau,
        action: entry.action,
        source: entry.source,
        created_at: Utc::now(),
    };
    conn.execute(
        "INSERT INTO activity_log (id, user_id, bureau, action, source, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            created.id.to_string(),
            user_id.to_string(),
            created.bureau.as_str(),
            created.action.as_str(),
            created.source.as_str(),
            format_timestamp(created.created_at),
        ],
    )?;
    Ok(created)
}

impl Database {
    pub fn insert_activity(&self, user_id: Uuid, entry: &NewActivity) -> Result<ActivityLogEntry> {
        self.with_connection(|conn| Ok(insert_entry(conn, user_id, entry)?))
    }

    /// Activity for a user, newest first.
    pub fn get_activity(&self, user_id: Uuid, limit: u32) -> Result<Vec<ActivityLogEntry>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, bureau, action, source, created_at
                 FROM activity_log
                 WHERE user_id = ?1
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT ?2",
            )?;
            let entries = stmt
                .query_map(params![user_id.to_string(), limit], row_to_entry)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(entries)
        })
    }

    pub fn count_activity(
        &self,
        user_id: Uuid,
        bureau: Bureau,
        action: ActivityAction,
    ) -> Result<usize> {
        self.with_connection(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM activity_log WHERE user_id = ?1 AND bureau = ?2 AND action = ?3",
                params![user_id.to_string(), bureau.as_str(), action.as_str()],
                |row| row.get(0),
            )?;
            Ok(count as usize)
        })
    }
}
