use serde::{Deserialize, Serialize};

/// One of the three nationwide credit reporting agencies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Bureau {
    Equifax,
    Transunion,
    Experian,
}

impl Bureau {
    /// Fixed priority order used whenever a resume point or migration order is needed.
    pub const ALL: [Bureau; 3] = [Bureau::Equifax, Bureau::Transunion, Bureau::Experian];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equifax => "equifax",
            Self::Transunion => "transunion",
            Self::Experian => "experian",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "equifax" => Some(Self::Equifax),
            "transunion" => Some(Self::Transunion),
            "experian" => Some(Self::Experian),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Equifax => "Equifax",
            Self::Transunion => "TransUnion",
            Self::Experian => "Experian",
        }
    }

    pub fn freeze_url(&self) -> &'static str {
        match self {
            Self::Equifax => "https://www.equifax.com/personal/credit-report-services/credit-freeze/",
            Self::Transunion => "https://www.transunion.com/credit-freeze",
            Self::Experian => "https://www.experian.com/freeze/center.html",
        }
    }
}

impl std::fmt::Display for Bureau {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw stored freeze status. `NotFrozen` covers both "never set" and "explicitly reverted".
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FreezeStatus {
    Frozen,
    NotFrozen,
}

impl FreezeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Frozen => "frozen",
            Self::NotFrozen => "not_frozen",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "frozen" => Some(Self::Frozen),
            "not_frozen" => Some(Self::NotFrozen),
            _ => None,
        }
    }
}

/// Displayed state of a bureau once thaw windows are taken into account.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EffectiveStatus {
    Frozen,
    NotFrozen,
    ThawScheduled,
    ThawActive,
}

impl EffectiveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Frozen => "frozen",
            Self::NotFrozen => "not_frozen",
            Self::ThawScheduled => "thaw_scheduled",
            Self::ThawActive => "thaw_active",
        }
    }

    /// True when the stored freeze is in place, whether or not a thaw window touches it.
    pub fn is_protected(&self) -> bool {
        !matches!(self, Self::NotFrozen)
    }
}
