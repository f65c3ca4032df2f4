use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::bureau::{Bureau, FreezeStatus};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BureauStatus {
    pub id: Uuid,
    pub user_id: Uuid,
    pub bureau: Bureau,
    pub status: FreezeStatus,
    pub status_updated_at: DateTime<Utc>,
    pub frozen_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl BureauStatus {
    pub fn is_frozen(&self) -> bool {
        self.status == FreezeStatus::Frozen
    }
}

/// Result of marking a bureau frozen.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FreezeTransition {
    pub status: BureauStatus,
    /// False when the bureau was already frozen and no activity entry was written.
    pub newly_frozen: bool,
}

/// Upsert payload keyed on (user_id, bureau).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BureauStatusUpsert {
    pub bureau: Bureau,
    pub status: FreezeStatus,
    pub status_updated_at: DateTime<Utc>,
    pub frozen_date: Option<DateTime<Utc>>,
}

impl BureauStatusUpsert {
    pub fn frozen(bureau: Bureau, at: DateTime<Utc>) -> Self {
        Self {
            bureau,
            status: FreezeStatus::Frozen,
            status_updated_at: at,
            frozen_date: Some(at),
        }
    }

    pub fn not_frozen(bureau: Bureau, at: DateTime<Utc>) -> Self {
        Self {
            bureau,
            status: FreezeStatus::NotFrozen,
            status_updated_at: at,
            frozen_date: None,
        }
    }
}

/// A temporary-lift window. Both dates are inclusive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThawReminder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub bureau: Bureau,
    pub thaw_start_date: NaiveDate,
    pub thaw_end_date: NaiveDate,
    /// True when the lift was actually performed at the bureau,
    /// false for a reminder the user scheduled for themselves.
    pub set_at_bureau: bool,
    pub reminder_sent: bool,
    pub created_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl ThawReminder {
    pub fn is_cancelled(&self) -> bool {
        self.cancelled_at.is_some()
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.thaw_end_date < today
    }

    pub fn covers(&self, today: NaiveDate) -> bool {
        self.thaw_start_date <= today && today <= self.thaw_end_date
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateThawReminderInput {
    pub bureau: Bureau,
    pub thaw_start_date: NaiveDate,
    pub thaw_end_date: NaiveDate,
    #[serde(default)]
    pub set_at_bureau: bool,
}
