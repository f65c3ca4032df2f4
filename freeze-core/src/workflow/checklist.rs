use serde::{Deserialize, Serialize};

/// What the user needs at hand before visiting the first bureau.
pub const CHECKLIST_ITEMS: [&str; 7] = [
    "Social Security Number (SSN)",
    "Date of birth",
    "Current mailing address",
    "Email address",
    "Phone number",
    "Government-issued ID",
    "Answers to identity verification questions",
];

/// Client-local readiness gate for leaving the checklist step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checklist {
    ready: [bool; CHECKLIST_ITEMS.len()],
}

impl Checklist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all_ready() -> Self {
        Self {
            ready: [true; CHECKLIST_ITEMS.len()],
        }
    }

    /// Builds a checklist from positional flags; missing positions count as not ready.
    pub fn from_flags(flags: &[bool]) -> Self {
        let mut checklist = Self::new();
        for (slot, flag) in checklist.ready.iter_mut().zip(flags) {
            *slot = *flag;
        }
        checklist
    }

    /// Returns false if `index` is out of range.
    pub fn mark(&mut self, index: usize, ready: bool) -> bool {
        match self.ready.get_mut(index) {
            Some(slot) => {
                *slot = ready;
                true
            }
            None => false,
        }
    }

    pub fn remaining(&self) -> usize {
        self.ready.iter().filter(|r| !**r).count()
    }

    pub fn is_complete(&self) -> bool {
        self.remaining() == 0
    }
}
