//! Unauthenticated endpoints: breach-code lookup and anonymous telemetry.
//!
//! Telemetry writes are best effort. Once the input validates the caller gets
//! 204 whether or not the row was stored.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use freeze_core::models::{
    BreachCode, Bureau, FreezeEvent, IssueType, NewFreezeIssue, VisitSource, MAX_BREACH_CODE_LEN,
    MAX_SESSION_ID_LEN,
};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub code: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct VisitRequest {
    pub breach_code: String,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FreezeEventRequest {
    #[serde(default)]
    pub breach_code: Option<String>,
    pub bureau: Bureau,
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct FreezeIssueRequest {
    pub bureau: Bureau,
    pub issue_type: IssueType,
    pub session_id: String,
    #[serde(default)]
    pub issue_details: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

fn check_code(code: &str) -> Result<&str, ApiError> {
    let code = code.trim();
    if code.is_empty() || code.len() > MAX_BREACH_CODE_LEN {
        return Err(ApiError::BadRequest("invalid breach code".into()));
    }
    Ok(code)
}

fn check_session(session_id: &str) -> Result<(), ApiError> {
    if session_id.is_empty() || session_id.len() > MAX_SESSION_ID_LEN {
        return Err(ApiError::BadRequest("session_id required".into()));
    }
    Ok(())
}

pub async fn validate(
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> Result<Json<ValidateResponse>, ApiError> {
    let Json(body) = payload?;
    let code = check_code(&body.code)?;
    let breach = BreachCode::find(code)
        .ok_or_else(|| ApiError::NotFound(format!("unknown breach code: {code}")))?;

    Ok(Json(ValidateResponse {
        code: breach.code,
        name: breach.name,
    }))
}

pub async fn visit(
    State(state): State<AppState>,
    payload: Result<Json<VisitRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(body) = payload?;
    let code = check_code(&body.breach_code)?;
    if BreachCode::find(code).is_none() {
        return Err(ApiError::BadRequest("unknown breach code".into()));
    }

    let source = VisitSource::from_str_or_default(body.source.as_deref());
    if let Err(e) = state.db.insert_breach_visit(code, source) {
        tracing::warn!(error = %e, code, "Breach visit not recorded");
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/freeze-events: Duplicates for the same session, bureau and code are ignored.
pub async fn freeze_event(
    State(state): State<AppState>,
    payload: Result<Json<FreezeEventRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(body) = payload?;
    check_session(&body.session_id)?;

    let event = FreezeEvent {
        breach_code: body
            .breach_code
            .filter(|code| !code.is_empty() && code.len() <= MAX_BREACH_CODE_LEN),
        bureau: body.bureau,
        session_id: body.session_id,
    };
    match state.db.record_freeze_event(&event) {
        Ok(false) => tracing::debug!(bureau = %event.bureau, "Duplicate freeze event ignored"),
        Ok(true) => {}
        Err(e) => tracing::warn!(error = %e, bureau = %event.bureau, "Freeze event not recorded"),
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn freeze_issue(
    State(state): State<AppState>,
    payload: Result<Json<FreezeIssueRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(body) = payload?;
    check_session(&body.session_id)?;

    let issue = NewFreezeIssue {
        user_id: None,
        session_id: Some(body.session_id),
        bureau: body.bureau,
        issue_type: body.issue_type,
        issue_details: body.issue_details,
        source: body.source,
    }
    .sanitized();
    if let Err(e) = state.db.insert_freeze_issue(&issue) {
        tracing::warn!(error = %e, bureau = %issue.bureau, "Freeze issue not recorded");
    }
    Ok(StatusCode::NO_CONTENT)
}
