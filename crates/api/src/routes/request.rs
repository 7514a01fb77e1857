use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use shiftboard_db::models::{
    Decision, RequestCounts, ScheduleRequest, ScheduleRequestChange, ScheduleRequestSwap,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::ApiError,
    extractors::{actor::Actor, tenant::TenantId},
    state::AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct ChangeRequestBody {
    #[validate(length(min = 1))]
    pub employee_id: String,
    #[validate(length(min = 1))]
    pub date: String,
    #[validate(length(min = 1, max = 16))]
    pub requested_shift: String,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub reason: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SwapRequestBody {
    #[validate(length(min = 1))]
    pub requester_id: String,
    #[validate(length(min = 1))]
    pub target_id: String,
    #[validate(length(min = 1))]
    pub date: String,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub reason: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DecideBody {
    pub decision: Decision,
    #[validate(length(max = 1000))]
    pub admin_message: Option<String>,
}

pub async fn list_all(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
) -> Result<Json<Vec<ScheduleRequest>>, ApiError> {
    Ok(Json(state.requests.list_all(tenant_id).await?))
}

pub async fn list_pending(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
) -> Result<Json<Vec<ScheduleRequest>>, ApiError> {
    Ok(Json(state.requests.list_pending(tenant_id).await?))
}

pub async fn list_approved(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
) -> Result<Json<Vec<ScheduleRequest>>, ApiError> {
    Ok(Json(state.requests.list_approved(tenant_id).await?))
}

pub async fn list_for_employee(
    State(state): State<AppState>,
    Path((tenant_id, employee_id)): Path<(Uuid, String)>,
) -> Result<Json<Vec<ScheduleRequest>>, ApiError> {
    Ok(Json(
        state
            .requests
            .list_for_employee(tenant_id, &employee_id)
            .await?,
    ))
}

pub async fn counts(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
) -> Result<Json<RequestCounts>, ApiError> {
    Ok(Json(state.requests.counts(tenant_id).await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path((tenant_id, request_id)): Path<(Uuid, String)>,
) -> Result<Json<ScheduleRequest>, ApiError> {
    Ok(Json(state.requests.get(tenant_id, &request_id).await?))
}

pub async fn submit_change(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
    Json(body): Json<ChangeRequestBody>,
) -> Result<Json<ScheduleRequestChange>, ApiError> {
    body.validate()?;
    let request = state
        .requests
        .submit_change_request(
            tenant_id,
            &body.employee_id,
            &body.date,
            &body.requested_shift,
            &body.reason,
        )
        .await?;
    Ok(Json(request))
}

pub async fn submit_swap(
    State(state): State<AppState>,
    TenantId(tenant_id): TenantId,
    Json(body): Json<SwapRequestBody>,
) -> Result<Json<ScheduleRequestSwap>, ApiError> {
    body.validate()?;
    let request = state
        .requests
        .submit_swap_request(
            tenant_id,
            &body.requester_id,
            &body.target_id,
            &body.date,
            &body.reason,
        )
        .await?;
    Ok(Json(request))
}

pub async fn decide(
    State(state): State<AppState>,
    Path((tenant_id, request_id)): Path<(Uuid, String)>,
    Actor(actor): Actor,
    Json(body): Json<DecideBody>,
) -> Result<Json<ScheduleRequest>, ApiError> {
    body.validate()?;
    let decided = state
        .requests
        .decide(tenant_id, &request_id, body.decision, &actor, body.admin_message)
        .await?;
    Ok(Json(decided))
}
