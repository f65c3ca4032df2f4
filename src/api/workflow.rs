use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use freeze_core::local::{LocalWorkflowStore, MemoryStore, BREACH_STATE_KEY, DIRECT_STATE_KEY};
use freeze_core::models::{BureauStatus, WorkflowState, WorkflowStep};
use freeze_core::workflow::{AuthenticatedFlow, Checklist, ConfirmOutcome, IssueReport, StepView};
use freeze_core::{MigrationOutcome, WorkflowMigrator};
use serde::{Deserialize, Serialize};

use super::{parse_bureau, ApiError, AppState, AuthUser};

#[derive(Debug, Deserialize)]
pub struct WorkflowQuery {
    pub bureau: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WorkflowView {
    pub progress: WorkflowState,
    pub steps: Vec<StepView>,
    pub statuses: Vec<BureauStatus>,
}

#[derive(Debug, Serialize)]
pub struct StepResponse {
    pub next_step: WorkflowStep,
}

#[derive(Debug, Deserialize)]
pub struct ChecklistRequest {
    pub ready: Vec<bool>,
}

/// The device's raw local workflow keys. Either may be absent.
#[derive(Debug, Default, Deserialize)]
pub struct MigrateRequest {
    #[serde(default)]
    pub breach_workflow_state: Option<serde_json::Value>,
    #[serde(default)]
    pub freeze_flow_state: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct MigrateResponse {
    #[serde(flatten)]
    pub outcome: MigrationOutcome,
    /// Whether the device should drop its local workflow keys.
    pub clear_local: bool,
}

/// GET /api/workflow: Progress positioned at its entry step. `?bureau=` deep-links to a bureau.
pub async fn show(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<WorkflowQuery>,
) -> Result<Json<WorkflowView>, ApiError> {
    let requested = query.bureau.as_deref().map(parse_bureau).transpose()?;
    let flow = AuthenticatedFlow::load(&state.db, user_id, requested)?;

    Ok(Json(WorkflowView {
        progress: flow.state().clone(),
        steps: flow.step_views(),
        statuses: flow.statuses().to_vec(),
    }))
}

pub async fn complete_checklist(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<ChecklistRequest>, JsonRejection>,
) -> Result<Json<StepResponse>, ApiError> {
    let Json(body) = payload?;
    let mut flow = AuthenticatedFlow::load(&state.db, user_id, None)?;
    let next_step = flow.complete_checklist(&Checklist::from_flags(&body.ready))?;
    Ok(Json(StepResponse { next_step }))
}

/// POST /api/workflow/confirm/{bureau}: The user reports the freeze is in place.
pub async fn confirm(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(bureau): Path<String>,
) -> Result<Json<ConfirmOutcome>, ApiError> {
    let bureau = parse_bureau(&bureau)?;
    let mut flow = AuthenticatedFlow::load(&state.db, user_id, Some(bureau))?;
    Ok(Json(flow.confirm(bureau)?))
}

pub async fn skip(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(bureau): Path<String>,
    payload: Result<Json<IssueReport>, JsonRejection>,
) -> Result<Json<StepResponse>, ApiError> {
    let bureau = parse_bureau(&bureau)?;
    let Json(report) = payload?;
    let mut flow = AuthenticatedFlow::load(&state.db, user_id, Some(bureau))?;
    let next_step = flow.skip(bureau, report)?;
    Ok(Json(StepResponse { next_step }))
}

/// POST /api/workflow/migrate: Reconciles posted anonymous state into the user's records.
pub async fn migrate(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<MigrateRequest>, JsonRejection>,
) -> Result<Json<MigrateResponse>, ApiError> {
    let Json(body) = payload?;
    let values = [
        (BREACH_STATE_KEY, body.breach_workflow_state),
        (DIRECT_STATE_KEY, body.freeze_flow_state),
    ]
    .into_iter()
    .filter_map(|(key, value)| value.map(|v| (key, v.to_string())));

    let local = LocalWorkflowStore::new(MemoryStore::with_values(values));
    let outcome = WorkflowMigrator::new(&local, &state.db).run(user_id);
    let clear_local = outcome.local_cleared();

    Ok(Json(MigrateResponse { outcome, clear_local }))
}
