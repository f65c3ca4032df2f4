use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use freeze_core::models::{ActivityLogEntry, Bureau, BureauStatus, ThawReminder};
use freeze_core::resolver::{self, BureauSummary};
use freeze_core::thaw;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{parse_bureau, ApiError, AppState, AuthUser};

const DEFAULT_HISTORY_LIMIT: u32 = 50;
const MAX_HISTORY_LIMIT: u32 = 200;

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub bureaus: Vec<BureauSummary>,
    /// Bureaus currently frozen, scheduled to thaw, or thawed at the bureau.
    pub protected: usize,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ThawWindow {
    pub thaw_start_date: NaiveDate,
    pub thaw_end_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleThawRequest {
    pub bureaus: Vec<Bureau>,
    pub thaw_start_date: NaiveDate,
    pub thaw_end_date: NaiveDate,
}

pub async fn dashboard(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Dashboard>, ApiError> {
    let statuses = state.db.get_bureau_statuses(user_id)?;
    let reminders = state.db.get_thaw_reminders(user_id)?;
    let bureaus = resolver::resolve_all(&statuses, &reminders, Utc::now().date_naive());
    let protected = bureaus
        .iter()
        .filter(|b| b.effective_status.is_protected())
        .count();

    Ok(Json(Dashboard { bureaus, protected }))
}

/// GET /api/history: Activity entries, newest first.
pub async fn history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<ActivityLogEntry>>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);
    Ok(Json(state.db.get_activity(user_id, limit)?))
}

pub async fn unfreeze(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(bureau): Path<String>,
) -> Result<Json<BureauStatus>, ApiError> {
    let bureau = parse_bureau(&bureau)?;
    Ok(Json(thaw::unfreeze(&state.db, user_id, bureau)?))
}

/// POST /api/bureaus/{bureau}/thaw: A temporary lift the user already set up at the bureau.
pub async fn log_thaw(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(bureau): Path<String>,
    payload: Result<Json<ThawWindow>, JsonRejection>,
) -> Result<(StatusCode, Json<ThawReminder>), ApiError> {
    let bureau = parse_bureau(&bureau)?;
    let Json(window) = payload?;
    let reminder = thaw::log_temporary_thaw(
        &state.db,
        user_id,
        bureau,
        window.thaw_start_date,
        window.thaw_end_date,
    )?;
    Ok((StatusCode::CREATED, Json(reminder)))
}

pub async fn schedule_thaws(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<ScheduleThawRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Vec<ThawReminder>>), ApiError> {
    let Json(body) = payload?;
    let reminders = thaw::schedule_thaw(
        &state.db,
        user_id,
        &body.bureaus,
        body.thaw_start_date,
        body.thaw_end_date,
    )?;
    Ok((StatusCode::CREATED, Json(reminders)))
}

pub async fn cancel_thaw(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ThawReminder>, ApiError> {
    let id = Uuid::parse_str(&id).map_err(|_| ApiError::BadRequest(format!("invalid reminder id: {id}")))?;
    Ok(Json(thaw::cancel_thaw(&state.db, user_id, id)?))
}
