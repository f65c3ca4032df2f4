use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::bureau::Bureau;

/// Append-only audit record of a bureau state transition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityLogEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub bureau: Bureau,
    pub action: ActivityAction,
    pub source: ActivitySource,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Frozen,
    Unfrozen,
    ThawScheduled,
    ThawCancelled,
    IssueReported,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Frozen => "frozen",
            Self::Unfrozen => "unfrozen",
            Self::ThawScheduled => "thaw_scheduled",
            Self::ThawCancelled => "thaw_cancelled",
            Self::IssueReported => "issue_reported",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "frozen" => Some(Self::Frozen),
            "unfrozen" => Some(Self::Unfrozen),
            "thaw_scheduled" => Some(Self::ThawScheduled),
            "thaw_cancelled" => Some(Self::ThawCancelled),
            "issue_reported" => Some(Self::IssueReported),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivitySource {
    FreezeWorkflow,
    ManualUpdate,
    ScheduledThaw,
}

impl ActivitySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FreezeWorkflow => "freeze_workflow",
            Self::ManualUpdate => "manual_update",
            Self::ScheduledThaw => "scheduled_thaw",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "freeze_workflow" => Some(Self::FreezeWorkflow),
            "manual_update" => Some(Self::ManualUpdate),
            "scheduled_thaw" => Some(Self::ScheduledThaw),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewActivity {
    pub bureau: Bureau,
    pub action: ActivityAction,
    pub source: ActivitySource,
}

impl NewActivity {
    pub fn new(bureau: Bureau, action: ActivityAction, source: ActivitySource) -> Self {
        Self {
            bureau,
            action,
            source,
        }
    }
}
