//! Derives what a bureau looks like to the user from its stored status and thaw windows.
//!
//! Priority is by urgency: `ThawActive` beats `ThawScheduled` beats `Frozen`.
//! How many reminders overlap, or which was created first, does not matter.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Bureau, BureauStatus, EffectiveStatus, FreezeStatus, ThawReminder};

/// Effective status of `bureau`. `reminders` may hold rows for any bureau.
pub fn resolve(
    status: Option<&BureauStatus>,
    reminders: &[ThawReminder],
    bureau: Bureau,
    today: NaiveDate,
) -> EffectiveStatus {
    match status {
        Some(s) if s.status == FreezeStatus::Frozen => {}
        _ => return EffectiveStatus::NotFrozen,
    }

    let mut live = reminders
        .iter()
        .filter(|r| r.bureau == bureau && !r.is_cancelled() && !r.is_expired(today))
        .peekable();

    if live.peek().is_none() {
        return EffectiveStatus::Frozen;
    }

    if live.any(|r| r.set_at_bureau && r.covers(today)) {
        EffectiveStatus::ThawActive
    } else {
        EffectiveStatus::ThawScheduled
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BureauSummary {
    pub bureau: Bureau,
    pub status: Option<BureauStatus>,
    pub effective_status: EffectiveStatus,
    /// Live (uncancelled, unexpired) reminders for this bureau.
    pub reminders: Vec<ThawReminder>,
}

/// Summary for every bureau in fixed order.
pub fn resolve_all(
    statuses: &[BureauStatus],
    reminders: &[ThawReminder],
    today: NaiveDate,
) -> Vec<BureauSummary> {
    Bureau::ALL
        .into_iter()
        .map(|bureau| {
            let status = statuses.iter().find(|s| s.bureau == bureau);
            BureauSummary {
                bureau,
                status: status.cloned(),
                effective_status: resolve(status, reminders, bureau, today),
                reminders: reminders
                    .iter()
                    .filter(|r| r.bureau == bureau && !r.is_cancelled() && !r.is_expired(today))
                    .cloned()
                    .collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn frozen(bureau: Bureau) -> BureauStatus {
        BureauStatus {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            bureau,
            status: FreezeStatus::Frozen,
            status_updated_at: Utc::now(),
            frozen_date: Some(Utc::now()),
            notes: None,
        }
    }

    fn reminder(bureau: Bureau, start: NaiveDate, end: NaiveDate, at_bureau: bool) -> ThawReminder {
        ThawReminder {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            bureau,
            thaw_start_date: start,
            thaw_end_date: end,
            set_at_bureau: at_bureau,
            reminder_sent: false,
            created_at: Utc::now(),
            cancelled_at: None,
        }
    }

    #[test]
    fn end_date_is_inclusive() {
        let today = NaiveDate::from_ymd_opt(2026, 5, 10).unwrap();
        let status = frozen(Bureau::Equifax);
        let r = reminder(Bureau::Equifax, today - Duration::days(3), today, true);
        assert_eq!(
            resolve(Some(&status), &[r], Bureau::Equifax, today),
            EffectiveStatus::ThawActive
        );
    }

    #[test]
    fn future_lift_at_bureau_is_only_scheduled() {
        let today = NaiveDate::from_ymd_opt(2026, 5, 10).unwrap();
        let status = frozen(Bureau::Experian);
        let r = reminder(
            Bureau::Experian,
            today + Duration::days(1),
            today + Duration::days(2),
            true,
        );
        assert_eq!(
            resolve(Some(&status), &[r], Bureau::Experian, today),
            EffectiveStatus::ThawScheduled
        );
    }

    #[test]
    fn summary_covers_every_bureau_in_order() {
        let today = NaiveDate::from_ymd_opt(2026, 5, 10).unwrap();
        let statuses = vec![frozen(Bureau::Transunion)];
        let summary = resolve_all(&statuses, &[], today);
        let effective: Vec<_> = summary.iter().map(|s| (s.bureau, s.effective_status)).collect();
        assert_eq!(
            effective,
            vec![
                (Bureau::Equifax, EffectiveStatus::NotFrozen),
                (Bureau::Transunion, EffectiveStatus::Frozen),
                (Bureau::Experian, EffectiveStatus::NotFrozen),
            ]
        );
    }
}
