use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::bureau::Bureau;

pub const MAX_BREACH_CODE_LEN: usize = 50;
pub const MAX_SESSION_ID_LEN: usize = 100;
pub const MAX_ISSUE_DETAILS_LEN: usize = 1000;
pub const MAX_ISSUE_SOURCE_LEN: usize = 50;

/// A breach-notification campaign that users can arrive through.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BreachCode {
    pub code: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub date: &'static str,
    pub records_affected: Option<&'static str>,
    pub data_exposed: &'static [&'static str],
}

pub const BREACH_CODES: &[BreachCode] = &[
    BreachCode {
        code: "ACME2024",
        name: "Acme Corp Data Breach",
        description: "In September 2024, Acme Corp disclosed that an unauthorized party accessed \
                      customer databases containing personal information.",
        date: "September 2024",
        records_affected: Some("2.4 million"),
        data_exposed: &["Social Security Numbers", "Names", "Addresses", "Phone Numbers"],
    },
    BreachCode {
        code: "HEALTH2024",
        name: "National Health Network Breach",
        description: "In November 2024, National Health Network reported unauthorized access to \
                      patient and member records.",
        date: "November 2024",
        records_affected: Some("5.1 million"),
        data_exposed: &[
            "Social Security Numbers",
            "Names",
            "Dates of Birth",
            "Addresses",
            "Insurance Information",
        ],
    },
    BreachCode {
        code: "BANK2024",
        name: "First Federal Bank Incident",
        description: "In January 2025, First Federal Bank notified customers of a breach through \
                      a compromised third-party vendor.",
        date: "January 2025",
        records_affected: Some("890,000"),
        data_exposed: &[
            "Social Security Numbers",
            "Names",
            "Account Numbers",
            "Addresses",
            "Phone Numbers",
        ],
    },
];

impl BreachCode {
    /// Case-insensitive lookup in the campaign catalogue.
    pub fn find(code: &str) -> Option<&'static BreachCode> {
        BREACH_CODES
            .iter()
            .find(|b| b.code.eq_ignore_ascii_case(code.trim()))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum VisitSource {
    #[default]
    Direct,
    Homepage,
}

impl VisitSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Homepage => "homepage",
        }
    }

    /// Unknown sources collapse to `Direct`.
    pub fn from_str_or_default(s: Option<&str>) -> Self {
        match s {
            Some("homepage") => Self::Homepage,
            _ => Self::Direct,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreachVisit {
    pub id: Uuid,
    pub breach_code: String,
    pub source: VisitSource,
    pub created_at: DateTime<Utc>,
}

/// Anonymous freeze telemetry, correlated only by the device session id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FreezeEvent {
    pub breach_code: Option<String>,
    pub bureau: Bureau,
    pub session_id: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    AccountAccess,
    IdentityVerification,
    SiteError,
    AskedToPay,
    Confused,
    Other,
}

impl IssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccountAccess => "account_access",
            Self::IdentityVerification => "identity_verification",
            Self::SiteError => "site_error",
            Self::AskedToPay => "asked_to_pay",
            Self::Confused => "confused",
            Self::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "account_access" => Some(Self::AccountAccess),
            "identity_verification" => Some(Self::IdentityVerification),
            "site_error" => Some(Self::SiteError),
            "asked_to_pay" => Some(Self::AskedToPay),
            "confused" => Some(Self::Confused),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreezeIssue {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub session_id: Option<String>,
    pub bureau: Bureau,
    pub issue_type: IssueType,
    pub issue_details: Option<String>,
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFreezeIssue {
    pub user_id: Option<Uuid>,
    pub session_id: Option<String>,
    pub bureau: Bureau,
    pub issue_type: IssueType,
    pub issue_details: Option<String>,
    pub source: Option<String>,
}

impl NewFreezeIssue {
    /// Trims free-text fields to their stored limits; an over-long source is dropped.
    pub fn sanitized(mut self) -> Self {
        self.issue_details = self
            .issue_details
            .filter(|d| !d.trim().is_empty())
            .map(|d| d.chars().take(MAX_ISSUE_DETAILS_LEN).collect());
        self.source = self
            .source
            .filter(|s| !s.is_empty() && s.len() <= MAX_ISSUE_SOURCE_LEN);
        self
    }
}
