//! The linear freeze workflow: checklist, equifax, transunion, experian, complete.
//!
//! Only `confirm` marks a bureau completed. `skip` advances without touching the
//! bureau, and `navigate` moves the pointer without touching any flag.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::checklist::Checklist;
use super::WorkflowError;
use crate::models::{Bureau, WorkflowState, WorkflowStep};

impl WorkflowStep {
    pub fn index(self) -> usize {
        match self {
            Self::Checklist => 0,
            Self::Equifax => 1,
            Self::Transunion => 2,
            Self::Experian => 3,
            Self::Complete => 4,
        }
    }

    /// The step after `self`; `Complete` is its own successor.
    pub fn next(self) -> Self {
        Self::ALL
            .get(self.index() + 1)
            .copied()
            .unwrap_or(Self::Complete)
    }

    pub fn prev(self) -> Self {
        match self.index() {
            0 => Self::Checklist,
            i => Self::ALL[i - 1],
        }
    }

    pub fn bureau(self) -> Option<Bureau> {
        match self {
            Self::Equifax => Some(Bureau::Equifax),
            Self::Transunion => Some(Bureau::Transunion),
            Self::Experian => Some(Bureau::Experian),
            Self::Checklist | Self::Complete => None,
        }
    }
}

/// How a step should be drawn in a stepper header.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct StepView {
    pub step: WorkflowStep,
    pub current: bool,
    pub completed: bool,
    /// A bureau step behind the pointer that is not done.
    pub skipped: bool,
}

impl WorkflowState {
    pub fn complete_checklist(&mut self, checklist: &Checklist) -> Result<WorkflowStep, WorkflowError> {
        if self.current_step != WorkflowStep::Checklist {
            return Err(WorkflowError::InvalidTransition {
                step: self.current_step,
                action: "complete the checklist",
            });
        }
        if !checklist.is_complete() {
            return Err(WorkflowError::ChecklistIncomplete {
                remaining: checklist.remaining(),
            });
        }

        self.checklist_completed = true;
        self.current_step = WorkflowStep::Equifax;
        Ok(self.current_step)
    }

    /// Marks `bureau` completed and advances. Confirming an already completed
    /// bureau is allowed and simply advances again.
    pub fn confirm(&mut self, bureau: Bureau, now: DateTime<Utc>) -> Result<WorkflowStep, WorkflowError> {
        self.ensure_on(bureau, "confirm a freeze")?;
        self.set_bureau_completed(bureau, true);
        Ok(self.advance(now))
    }

    /// Advances past `bureau` after an issue, leaving its completion flag alone.
    pub fn skip(&mut self, bureau: Bureau, now: DateTime<Utc>) -> Result<WorkflowStep, WorkflowError> {
        self.ensure_on(bureau, "skip a bureau")?;
        Ok(self.advance(now))
    }

    pub fn navigate(&mut self, step: WorkflowStep) {
        self.current_step = step;
    }

    /// Where a re-entered workflow should land. A finished workflow with any
    /// bureau not done resumes at the first such bureau in fixed order.
    pub fn resume_step(&self, is_done: impl Fn(Bureau) -> bool) -> WorkflowStep {
        if self.current_step != WorkflowStep::Complete {
            return self.current_step;
        }
        Bureau::ALL
            .into_iter()
            .find(|b| !is_done(*b))
            .map(WorkflowStep::from)
            .unwrap_or(WorkflowStep::Complete)
    }

    /// Entry point honouring an explicit bureau request before the resume rule.
    pub fn entry_step(
        &self,
        requested: Option<Bureau>,
        is_done: impl Fn(Bureau) -> bool,
    ) -> WorkflowStep {
        match requested {
            Some(bureau) => bureau.into(),
            None => self.resume_step(is_done),
        }
    }

    pub fn step_views(&self, is_done: impl Fn(Bureau) -> bool) -> Vec<StepView> {
        let current = self.current_step.index();
        WorkflowStep::ALL
            .into_iter()
            .map(|step| {
                let completed = match step {
                    WorkflowStep::Checklist => self.checklist_completed,
                    WorkflowStep::Complete => Bureau::ALL.iter().all(|b| is_done(*b)),
                    _ => step.bureau().is_some_and(&is_done),
                };
                let skipped = step.index() < current
                    && step.bureau().is_some_and(|b| !is_done(b));
                StepView {
                    step,
                    current: step.index() == current,
                    completed,
                    skipped,
                }
            })
            .collect()
    }

    fn ensure_on(&self, bureau: Bureau, action: &'static str) -> Result<(), WorkflowError> {
        if self.current_step.bureau() == Some(bureau) {
            Ok(())
        } else {
            Err(WorkflowError::InvalidTransition {
                step: self.current_step,
                action,
            })
        }
    }

    fn advance(&mut self, now: DateTime<Utc>) -> WorkflowStep {
        let next = self.current_step.next();
        self.current_step = next;
        if next == WorkflowStep::Complete {
            self.completed_at = Some(now);
        }
        next
    }
}
