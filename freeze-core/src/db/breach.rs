use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{format_timestamp, Database};
use crate::models::{BreachVisit, FreezeEvent, FreezeIssue, NewFreezeIssue, VisitSource};

pub(crate) fn insert_issue(conn: &Connection, input: &NewFreezeIssue) -> rusqlite::Result<FreezeIssue> {
    let issue = FreezeIssue {
        id: Uuid::new_v4(),
        user_id: input.user_id,
        session_id: input.session_id.clone(),
        bureau: input.bureau,
        issue_type: input.issue_type,
        issue_details: input.issue_details.clone(),
        source: input.source.clone(),
        created_at: Utc::now(),
    };
    conn.execute(
        "INSERT INTO freeze_issues
            (id, user_id, session_id, bureau, issue_type, issue_details, source, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            issue.id.to_string(),
            issue.user_id.map(|u| u.to_string()),
            issue.session_id,
            issue.bureau.as_str(),
            issue.issue_type.as_str(),
            issue.issue_details,
            issue.source,
            format_timestamp(issue.created_at),
        ],
    )?;
    Ok(issue)
}

impl Database {
    pub fn insert_breach_visit(&self, breach_code: &str, source: VisitSource) -> Result<BreachVisit> {
        let visit = BreachVisit {
            id: Uuid::new_v4(),
            breach_code: breach_code.to_uppercase(),
            source,
            created_at: Utc::now(),
        };
        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO breach_visits (id, breach_code, source, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    visit.id.to_string(),
                    visit.breach_code,
                    visit.source.as_str(),
                    format_timestamp(visit.created_at),
                ],
            )?;
            Ok(())
        })?;
        Ok(visit)
    }

    pub fn count_breach_visits(&self, breach_code: &str) -> Result<usize> {
        self.with_connection(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM breach_visits WHERE breach_code = ?1",
                params![breach_code.to_uppercase()],
                |row| row.get(0),
            )?;
            Ok(count as usize)
        })
    }

    /// Records anonymous freeze telemetry. Returns false when the
    /// (session, bureau, breach code) triple was already recorded.
    pub fn record_freeze_event(&self, event: &FreezeEvent) -> Result<bool> {
        self.with_connection(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO breach_freeze_events (id, breach_code, bureau, session_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    Uuid::new_v4().to_string(),
                    event.breach_code.as_deref().unwrap_or_default(),
                    event.bureau.as_str(),
                    event.session_id,
                    format_timestamp(Utc::now()),
                ],
            )?;
            Ok(inserted > 0)
        })
    }

    pub fn count_freeze_events(&self, session_id: &str) -> Result<usize> {
        self.with_connection(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM breach_freeze_events WHERE session_id = ?1",
                params![session_id],
                |row| row.get(0),
            )?;
            Ok(count as usize)
        })
    }

    pub fn insert_freeze_issue(&self, input: &NewFreezeIssue) -> Result<FreezeIssue> {
        self.with_connection(|conn| Ok(insert_issue(conn, input)?))
    }

    pub fn count_freeze_issues(&self, user_id: Uuid) -> Result<usize> {
        self.with_connection(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM freeze_issues WHERE user_id = ?1",
                params![user_id.to_string()],
                |row| row.get(0),
            )?;
            Ok(count as usize)
        })
    }
}
