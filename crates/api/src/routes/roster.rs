use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use shiftboard_db::models::{Employee, Modification, MonthlyStats, RosterSnapshot};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::ApiError,
    extractors::{actor::Actor, tenant::TenantId},
    state::AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCellRequest {
    #[validate(length(min = 1))]
    pub employee_id: String,
    /// Either a column index into the merged headers or a date label.
    pub date_index: Option<usize>,
    pub date: Option<String>,
    #[serde(default)]
    pub new_shift: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateCellResponse {
    pub modification: Option<Modification>,
}

#[derive(Debug, Deserialize)]
pub struct ModificationQuery {
    pub month: Option<String>,
    pub employee_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ModificationResponse {
    pub modifications: Vec<Modification>,
    pub stats: Option<MonthlyStats>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddEmployeeRequest {
    #[validate(length(min = 1, max = 64))]
    pub employee_id: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub team: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateEmployeeRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub team: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReactivateEmployeeRequest {
    #[validate(length(min = 1, max = 100))]
    pub team: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TeamRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteTeamResponse {
    pub moved: usize,
}

pub async fn display(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
) -> Result<Json<RosterSnapshot>, ApiError> {
    let display = state.roster.display(tenant_id).await?;
    Ok(Json(display.as_ref().clone()))
}

pub async fn source(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
) -> Result<Json<RosterSnapshot>, ApiError> {
    Ok(Json(state.roster.source(tenant_id).await?))
}

pub async fn overrides(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
) -> Result<Json<RosterSnapshot>, ApiError> {
    Ok(Json(state.roster.overrides(tenant_id).await?))
}

pub async fn set_source(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
    Json(snapshot): Json<RosterSnapshot>,
) -> Result<StatusCode, ApiError> {
    state.roster.set_source(tenant_id, snapshot).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_override(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
    Json(snapshot): Json<RosterSnapshot>,
) -> Result<StatusCode, ApiError> {
    state.roster.set_override(tenant_id, snapshot).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_cell(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
    Actor(actor): Actor,
    Json(body): Json<UpdateCellRequest>,
) -> Result<Json<UpdateCellResponse>, ApiError> {
    body.validate()?;
    let modification = match (body.date_index, body.date.as_deref()) {
        (Some(index), _) => {
            state
                .roster
                .update_cell(tenant_id, &body.employee_id, index, &body.new_shift, &actor)
                .await?
        }
        (None, Some(date)) => {
            state
                .roster
                .update_cell_by_date(tenant_id, &body.employee_id, date, &body.new_shift, &actor)
                .await?
        }
        (None, None) => {
            return Err(ApiError::Validation(
                "either date_index or date is required".to_string(),
            ));
        }
    };
    Ok(Json(UpdateCellResponse { modification }))
}

pub async fn reset(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
) -> Result<StatusCode, ApiError> {
    state.roster.reset_to_source(tenant_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn hard_reset(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
) -> Result<StatusCode, ApiError> {
    state.roster.hard_reset(tenant_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn modifications(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
    Query(query): Query<ModificationQuery>,
) -> Result<Json<ModificationResponse>, ApiError> {
    let modifications = state
        .roster
        .modifications_matching(
            tenant_id,
            query.month.as_deref(),
            query.employee_id.as_deref(),
        )
        .await?;
    let stats = match &query.month {
        Some(month) => state.roster.monthly_stats(tenant_id, month).await?,
        None => None,
    };
    Ok(Json(ModificationResponse {
        modifications,
        stats,
    }))
}

pub async fn add_employee(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
    Json(body): Json<AddEmployeeRequest>,
) -> Result<Json<Employee>, ApiError> {
    body.validate()?;
    let employee = state
        .roster
        .add_employee(tenant_id, &body.employee_id, &body.name, &body.team)
        .await?;
    Ok(Json(employee))
}

pub async fn update_employee(
    State(state): State<AppState>,
    Path((tenant_id, employee_id)): Path<(Uuid, String)>,
    Json(body): Json<UpdateEmployeeRequest>,
) -> Result<Json<Employee>, ApiError> {
    body.validate()?;
    let employee = state
        .roster
        .update_employee(
            tenant_id,
            &employee_id,
            body.name.as_deref(),
            body.team.as_deref(),
        )
        .await?;
    Ok(Json(employee))
}

pub async fn deactivate_employee(
    State(state): State<AppState>,
    Path((tenant_id, employee_id)): Path<(Uuid, String)>,
) -> Result<StatusCode, ApiError> {
    state
        .roster
        .deactivate_employee(tenant_id, &employee_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reactivate_employee(
    State(state): State<AppState>,
    Path((tenant_id, employee_id)): Path<(Uuid, String)>,
    Json(body): Json<ReactivateEmployeeRequest>,
) -> Result<StatusCode, ApiError> {
    body.validate()?;
    state
        .roster
        .reactivate_employee(tenant_id, &employee_id, &body.team)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_team(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
    Json(body): Json<TeamRequest>,
) -> Result<StatusCode, ApiError> {
    body.validate()?;
    state.roster.add_team(tenant_id, &body.name).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn rename_team(
    State(state): State<AppState>,
    Path((tenant_id, team)): Path<(Uuid, String)>,
    Json(body): Json<TeamRequest>,
) -> Result<StatusCode, ApiError> {
    body.validate()?;
    state.roster.rename_team(tenant_id, &team, &body.name).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_team(
    State(state): State<AppState>,
    Path((tenant_id, team)): Path<(Uuid, String)>,
) -> Result<Json<DeleteTeamResponse>, ApiError> {
    let moved = state.roster.delete_team(tenant_id, &team).await?;
    Ok(Json(DeleteTeamResponse { moved }))
}
