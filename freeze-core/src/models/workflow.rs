use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::bureau::Bureau;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    #[default]
    Checklist,
    Equifax,
    Transunion,
    Experian,
    Complete,
}

impl WorkflowStep {
    pub const ALL: [WorkflowStep; 5] = [
        WorkflowStep::Checklist,
        WorkflowStep::Equifax,
        WorkflowStep::Transunion,
        WorkflowStep::Experian,
        WorkflowStep::Complete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checklist => "checklist",
            Self::Equifax => "equifax",
            Self::Transunion => "transunion",
            Self::Experian => "experian",
            Self::Complete => "complete",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "checklist" => Some(Self::Checklist),
            "equifax" => Some(Self::Equifax),
            "transunion" => Some(Self::Transunion),
            "experian" => Some(Self::Experian),
            "complete" => Some(Self::Complete),
            _ => None,
        }
    }
}

impl std::fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Bureau> for WorkflowStep {
    fn from(bureau: Bureau) -> Self {
        match bureau {
            Bureau::Equifax => Self::Equifax,
            Bureau::Transunion => Self::Transunion,
            Bureau::Experian => Self::Experian,
        }
    }
}

/// Step pointer and completion flags shared by the local and durable copies of a workflow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowState {
    pub current_step: WorkflowStep,
    pub checklist_completed: bool,
    pub equifax_completed: bool,
    pub transunion_completed: bool,
    pub experian_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl WorkflowState {
    pub fn bureau_completed(&self, bureau: Bureau) -> bool {
        match bureau {
            Bureau::Equifax => self.equifax_completed,
            Bureau::Transunion => self.transunion_completed,
            Bureau::Experian => self.experian_completed,
        }
    }

    pub fn set_bureau_completed(&mut self, bureau: Bureau, completed: bool) {
        match bureau {
            Bureau::Equifax => self.equifax_completed = completed,
            Bureau::Transunion => self.transunion_completed = completed,
            Bureau::Experian => self.experian_completed = completed,
        }
    }

    pub fn completed_bureaus(&self) -> Vec<Bureau> {
        Bureau::ALL
            .into_iter()
            .filter(|b| self.bureau_completed(*b))
            .collect()
    }
}

/// Durable, one-per-user counterpart of [`WorkflowState`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FreezeWorkflowProgress {
    pub id: Uuid,
    pub user_id: Uuid,
    pub current_step: WorkflowStep,
    pub checklist_completed: bool,
    pub equifax_completed: bool,
    pub transunion_completed: bool,
    pub experian_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl FreezeWorkflowProgress {
    pub fn state(&self) -> WorkflowState {
        WorkflowState {
            current_step: self.current_step,
            checklist_completed: self.checklist_completed,
            equifax_completed: self.equifax_completed,
            transunion_completed: self.transunion_completed,
            experian_completed: self.experian_completed,
            completed_at: self.completed_at,
        }
    }
}
