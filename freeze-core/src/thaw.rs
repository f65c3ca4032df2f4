//! Unfreeze and temporary-lift bookkeeping. Each operation is one transaction.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::db::{self as sql, Database};
use crate::models::{
    ActivityAction, ActivitySource, Bureau, BureauStatus, BureauStatusUpsert,
    CreateThawReminderInput, NewActivity, ThawReminder,
};

#[derive(Debug, thiserror::Error)]
pub enum ThawError {
    #[error("end date {end} is before start date {start}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },

    #[error("select at least one bureau")]
    NoBureaus,

    #[error("thaw reminder {0} not found")]
    NotFound(Uuid),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

fn check_window(start: NaiveDate, end: NaiveDate) -> Result<(), ThawError> {
    if end < start {
        return Err(ThawError::InvalidWindow { start, end });
    }
    Ok(())
}

/// Permanently lifts the freeze at `bureau`, cancelling any live reminders for it.
pub fn unfreeze(db: &Database, user_id: Uuid, bureau: Bureau) -> Result<BureauStatus, ThawError> {
    let now = Utc::now();
    let status = db.with_transaction(|tx| {
        let cancelled = sql::cancel_bureau_reminders(tx, user_id, bureau, now)?;
        let status = sql::upsert_status(tx, user_id, &BureauStatusUpsert::not_frozen(bureau, now))?;
        sql::insert_entry(
            tx,
            user_id,
            &NewActivity::new(bureau, ActivityAction::Unfrozen, ActivitySource::ManualUpdate),
        )?;
        tracing::debug!(%user_id, %bureau, cancelled, "Cancelled reminders on unfreeze");
        Ok(status)
    })?;
    tracing::info!(%user_id, %bureau, "Bureau unfrozen");
    Ok(status)
}

/// Records a lift the user already performed at the bureau.
pub fn log_temporary_thaw(
    db: &Database,
    user_id: Uuid,
    bureau: Bureau,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<ThawReminder, ThawError> {
    check_window(start, end)?;
    let reminder = db.with_transaction(|tx| {
        let reminder = sql::insert_reminder(
            tx,
            user_id,
            &CreateThawReminderInput {
                bureau,
                thaw_start_date: start,
                thaw_end_date: end,
                set_at_bureau: true,
            },
        )?;
        sql::insert_entry(
            tx,
            user_id,
            &NewActivity::new(bureau, ActivityAction::ThawScheduled, ActivitySource::ManualUpdate),
        )?;
        Ok(reminder)
    })?;
    tracing::info!(%user_id, %bureau, %start, %end, "Temporary thaw logged");
    Ok(reminder)
}

/// Schedules self-reminders (not lifts at the bureau) for each of `bureaus`.
pub fn schedule_thaw(
    db: &Database,
    user_id: Uuid,
    bureaus: &[Bureau],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<ThawReminder>, ThawError> {
    if bureaus.is_empty() {
        return Err(ThawError::NoBureaus);
    }
    check_window(start, end)?;

    let mut unique = bureaus.to_vec();
    unique.sort();
    unique.dedup();

    let reminders = db.with_transaction(|tx| {
        let mut created = Vec::with_capacity(unique.len());
        for bureau in &unique {
            created.push(sql::insert_reminder(
                tx,
                user_id,
                &CreateThawReminderInput {
                    bureau: *bureau,
                    thaw_start_date: start,
                    thaw_end_date: end,
                    set_at_bureau: false,
                },
            )?);
            sql::insert_entry(
                tx,
                user_id,
                &NewActivity::new(*bureau, ActivityAction::ThawScheduled, ActivitySource::ScheduledThaw),
            )?;
        }
        Ok(created)
    })?;
    tracing::info!(%user_id, count = reminders.len(), "Thaw reminders scheduled");
    Ok(reminders)
}

/// Soft-deletes a live reminder owned by `user_id`.
pub fn cancel_thaw(db: &Database, user_id: Uuid, reminder_id: Uuid) -> Result<ThawReminder, ThawError> {
    let now = Utc::now();
    let reminder = db.with_transaction(|tx| {
        if !sql::cancel_reminder(tx, user_id, reminder_id, now)? {
            return Ok(None);
        }
        let reminder = sql::find_reminder(tx, user_id, reminder_id)?;
        if let Some(r) = &reminder {
            sql::insert_entry(
                tx,
                user_id,
                &NewActivity::new(r.bureau, ActivityAction::ThawCancelled, ActivitySource::ScheduledThaw),
            )?;
        }
        Ok(reminder)
    })?;
    reminder.ok_or(ThawError::NotFound(reminder_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, d).unwrap()
    }

    #[test]
    fn inverted_window_is_rejected() {
        let db = Database::open_memory().unwrap();
        let err = log_temporary_thaw(&db, Uuid::new_v4(), Bureau::Equifax, date(5), date(4)).unwrap_err();
        assert!(matches!(err, ThawError::InvalidWindow { .. }));
    }

    #[test]
    fn schedule_requires_a_bureau_and_dedups() {
        let db = Database::open_memory().unwrap();
        let user = Uuid::new_v4();
        assert!(matches!(
            schedule_thaw(&db, user, &[], date(1), date(2)),
            Err(ThawError::NoBureaus)
        ));

        let created = schedule_thaw(
            &db,
            user,
            &[Bureau::Experian, Bureau::Equifax, Bureau::Experian],
            date(1),
            date(2),
        )
        .unwrap();
        assert_eq!(created.len(), 2);
        assert!(created.iter().all(|r| !r.set_at_bureau));
        assert_eq!(
            db.count_activity(user, Bureau::Experian, ActivityAction::ThawScheduled).unwrap(),
            1
        );
    }

    #[test]
    fn unfreeze_cancels_live_reminders() {
        let db = Database::open_memory().unwrap();
        let user = Uuid::new_v4();
        db.upsert_bureau_status(user, &BureauStatusUpsert::frozen(Bureau::Transunion, Utc::now()))
            .unwrap();
        log_temporary_thaw(&db, user, Bureau::Transunion, date(1), date(3)).unwrap();
        schedule_thaw(&db, user, &[Bureau::Equifax], date(1), date(3)).unwrap();

        let status = unfreeze(&db, user, Bureau::Transunion).unwrap();

        assert!(!status.is_frozen());
        let live = db.get_thaw_reminders(user).unwrap();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].bureau, Bureau::Equifax);
        assert_eq!(
            db.count_activity(user, Bureau::Transunion, ActivityAction::Unfrozen).unwrap(),
            1
        );
    }

    #[test]
    fn cancelling_twice_is_not_found() {
        let db = Database::open_memory().unwrap();
        let user = Uuid::new_v4();
        let reminder = log_temporary_thaw(&db, user, Bureau::Equifax, date(1), date(2)).unwrap();

        let cancelled = cancel_thaw(&db, user, reminder.id).unwrap();
        assert!(cancelled.is_cancelled());
        assert!(matches!(
            cancel_thaw(&db, user, reminder.id),
            Err(ThawError::NotFound(_))
        ));
        assert_eq!(
            db.count_activity(user, Bureau::Equifax, ActivityAction::ThawCancelled).unwrap(),
            1
        );
    }
}
