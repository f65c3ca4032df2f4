use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{
    format_date, format_timestamp, get_date, get_enum, get_opt_timestamp, get_timestamp, get_uuid,
    Database,
};
use crate::models::{Bureau, CreateThawReminderInput, ThawReminder};

const COLUMNS: &str = "id, user_id, bureau, thaw_start_date, thaw_end_date, set_at_bureau, \
                       reminder_sent, created_at, cancelled_at";

fn row_to_reminder(row: &Row<'_>) -> rusqlite::Result<ThawReminder> {
    Ok(ThawReminder {
        id: get_uuid(row, 0)?,
        user_id: get_uuid(row, 1)?,
        bureau: get_enum(row, 2, Bureau::from_str)?,
        thaw_start_date: get_date(row, 3)?,
        thaw_end_date: get_date(row, 4)?,
        set_at_bureau: row.get(5)?,
        reminder_sent: row.get(6)?,
        created_at: get_timestamp(row, 7)?,
        cancelled_at: get_opt_timestamp(row, 8)?,
    })
}

pub(crate) fn insert_reminder(
    conn: &Connection,
    user_id: Uuid,
    input: &CreateThawReminderInput,
) -> rusqlite::Result<ThawReminder> {
    let reminder = ThawReminder {
        id: Uuid::new_v4(),
        user_id,
        bureau: input.bureau,
        thaw_start_date: input.thaw_start_date,
        thaw_end_date: input.thaw_end_date,
        set_at_bureau: input.set_at_bureau,
        reminder_sent: false,
        created_at: Utc::now(),
        cancelled_at: None,
    };
    conn.execute(
        "INSERT INTO thaw_reminders
            (id, user_id, bureau, thaw_start_date, thaw_end_date, set_at_bureau, reminder_sent, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
        params![
            reminder.id.to_string(),
            user_id.to_string(),
            reminder.bureau.as_str(),
            format_date(reminder.thaw_start_date),
            format_date(reminder.thaw_end_date),
            reminder.set_at_bureau,
            format_timestamp(reminder.created_at),
        ],
    )?;
    Ok(reminder)
}

/// Soft-deletes one uncancelled reminder owned by `user_id`. Returns false if none matched.
pub(crate) fn cancel_reminder(
    conn: &Connection,
    user_id: Uuid,
    reminder_id: Uuid,
    at: DateTime<Utc>,
) -> rusqlite::Result<bool> {
    let updated = conn.execute(
        "UPDATE thaw_reminders SET cancelled_at = ?3
         WHERE id = ?1 AND user_id = ?2 AND cancelled_at IS NULL",
        params![reminder_id.to_string(), user_id.to_string(), format_timestamp(at)],
    )?;
    Ok(updated > 0)
}

pub(crate) fn cancel_bureau_reminders(
    conn: &Connection,
    user_id: Uuid,
    bureau: Bureau,
    at: DateTime<Utc>,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE thaw_reminders SET cancelled_at = ?3
         WHERE user_id = ?1 AND bureau = ?2 AND cancelled_at IS NULL",
        params![user_id.to_string(), bureau.as_str(), format_timestamp(at)],
    )
}

pub(crate) fn find_reminder(
    conn: &Connection,
    user_id: Uuid,
    reminder_id: Uuid,
) -> rusqlite::Result<Option<ThawReminder>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM thaw_reminders WHERE id = ?1 AND user_id = ?2"),
        params![reminder_id.to_string(), user_id.to_string()],
        row_to_reminder,
    )
    .optional()
}

impl Database {
    pub fn insert_thaw_reminder(
        &self,
        user_id: Uuid,
        input: &CreateThawReminderInput,
    ) -> Result<ThawReminder> {
        self.with_connection(|conn| Ok(insert_reminder(conn, user_id, input)?))
    }

    /// Uncancelled reminders ordered by start date. Expired ones are included;
    /// filtering by date is the resolver's job.
    pub fn get_thaw_reminders(&self, user_id: Uuid) -> Result<Vec<ThawReminder>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM thaw_reminders
                 WHERE user_id = ?1 AND cancelled_at IS NULL
                 ORDER BY thaw_start_date ASC, created_at ASC"
            ))?;
            let reminders = stmt
                .query_map(params![user_id.to_string()], row_to_reminder)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(reminders)
        })
    }

    pub fn get_thaw_reminder(&self, user_id: Uuid, reminder_id: Uuid) -> Result<Option<ThawReminder>> {
        self.with_connection(|conn| Ok(find_reminder(conn, user_id, reminder_id)?))
    }

    pub fn cancel_thaw_reminder(&self, user_id: Uuid, reminder_id: Uuid) -> Result<bool> {
        self.with_connection(|conn| Ok(cancel_reminder(conn, user_id, reminder_id, Utc::now())?))
    }
}
