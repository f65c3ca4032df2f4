use speculate2::speculate;

speculate! {
    use chrono::{Duration, NaiveDate, Utc};
    use freeze_core::models::{Bureau, BureauStatus, EffectiveStatus, FreezeStatus, ThawReminder};
    use freeze_core::resolver::resolve;
    use uuid::Uuid;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn status(bureau: Bureau, status: FreezeStatus) -> BureauStatus {
        BureauStatus {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            bureau,
            status,
            status_updated_at: Utc::now(),
            frozen_date: None,
            notes: None,
        }
    }

    fn reminder(bureau: Bureau, start: i64, end: i64, set_at_bureau: bool) -> ThawReminder {
        ThawReminder {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            bureau,
            thaw_start_date: today() + Duration::days(start),
            thaw_end_date: today() + Duration::days(end),
            set_at_bureau,
            reminder_sent: false,
            created_at: Utc::now(),
            cancelled_at: None,
        }
    }

    describe "a bureau that is not frozen" {
        it "is not_frozen without a status row" {
            let reminders = vec![reminder(Bureau::Equifax, -1, 1, true)];
            assert_eq!(resolve(None, &reminders, Bureau::Equifax, today()), EffectiveStatus::NotFrozen);
        }

        it "ignores active lifts when the stored status is not_frozen" {
            let s = status(Bureau::Equifax, FreezeStatus::NotFrozen);
            let reminders = vec![
                reminder(Bureau::Equifax, -1, 1, true),
                reminder(Bureau::Equifax, 2, 4, false),
            ];
            assert_eq!(resolve(Some(&s), &reminders, Bureau::Equifax, today()), EffectiveStatus::NotFrozen);
        }
    }

    describe "a frozen bureau" {
        it "is frozen with no reminders" {
            let s = status(Bureau::Experian, FreezeStatus::Frozen);
            assert_eq!(resolve(Some(&s), &[], Bureau::Experian, today()), EffectiveStatus::Frozen);
        }

        it "is thaw_active when a bureau lift covers today among other reminders" {
            let s = status(Bureau::Experian, FreezeStatus::Frozen);
            let reminders = vec![
                reminder(Bureau::Experian, 3, 5, false),
                reminder(Bureau::Experian, 10, 12, true),
                reminder(Bureau::Experian, 0, 0, true),
                reminder(Bureau::Experian, -9, -5, true),
            ];
            assert_eq!(resolve(Some(&s), &reminders, Bureau::Experian, today()), EffectiveStatus::ThawActive);
        }

        it "is thaw_scheduled for a self reminder covering today" {
            let s = status(Bureau::Experian, FreezeStatus::Frozen);
            let reminders = vec![reminder(Bureau::Experian, -1, 1, false)];
            assert_eq!(resolve(Some(&s), &reminders, Bureau::Experian, today()), EffectiveStatus::ThawScheduled);
        }

        it "lets the bureau lift win when windows overlap" {
            let s = status(Bureau::Transunion, FreezeStatus::Frozen);
            let reminders = vec![
                reminder(Bureau::Transunion, -2, 2, false),
                reminder(Bureau::Transunion, -1, 1, true),
            ];
            assert_eq!(resolve(Some(&s), &reminders, Bureau::Transunion, today()), EffectiveStatus::ThawActive);
        }

        it "treats expired reminders as absent" {
            let s = status(Bureau::Equifax, FreezeStatus::Frozen);
            let reminders = vec![
                reminder(Bureau::Equifax, -10, -1, true),
                reminder(Bureau::Equifax, -3, -1, false),
            ];
            assert_eq!(resolve(Some(&s), &reminders, Bureau::Equifax, today()), EffectiveStatus::Frozen);
        }

        it "treats cancelled reminders as absent" {
            let s = status(Bureau::Equifax, FreezeStatus::Frozen);
            let mut cancelled = reminder(Bureau::Equifax, -1, 1, true);
            cancelled.cancelled_at = Some(Utc::now());
            assert_eq!(resolve(Some(&s), &[cancelled], Bureau::Equifax, today()), EffectiveStatus::Frozen);
        }

        it "ignores reminders for other bureaus" {
            let s = status(Bureau::Equifax, FreezeStatus::Frozen);
            let reminders = vec![reminder(Bureau::Transunion, -1, 1, true)];
            assert_eq!(resolve(Some(&s), &reminders, Bureau::Equifax, today()), EffectiveStatus::Frozen);
        }
    }
}
